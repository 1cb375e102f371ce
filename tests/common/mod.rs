#![allow(dead_code)]

use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

use phyctl::directory::default_matchers;
use phyctl::error::TransportError;
use phyctl::transport::Transport;
use phyctl::wire::{RemoteCall, RemoteOp};
use phyctl::PhyController;

pub const BASE_URL: &str = "http://flowgraph.test/api/fg/0/";

/// One POST seen by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub url: String,
    pub call: RemoteCall,
    pub body: Value,
}

/// Answers discovery with a fixed document and records every call
#[derive(Clone)]
pub struct RecordingTransport {
    document: Value,
    fail_on: Option<RemoteOp>,
    pub log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingTransport {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            fail_on: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reject every call to `op` with HTTP 500
    pub fn failing_on(mut self, op: RemoteOp) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<RemoteOp> {
        self.recorded().iter().map(|r| r.call.op).collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

impl Transport for RecordingTransport {
    fn get_json(&mut self, url: &str) -> Result<Value, TransportError> {
        assert_eq!(url, BASE_URL);
        Ok(self.document.clone())
    }

    fn call(&mut self, url: &str, call: &RemoteCall) -> Result<(), TransportError> {
        if self.fail_on == Some(call.op) {
            return Err(TransportError::Status {
                status: 500,
                url: url.to_string(),
            });
        }
        self.log.lock().unwrap().push(Recorded {
            url: url.to_string(),
            call: *call,
            body: serde_json::to_value(call.payload).unwrap(),
        });
        Ok(())
    }
}

/// Block list of the stock multi-PHY flowgraph, minus `skip`
pub fn flowgraph_without(skip: &[&str]) -> Value {
    let blocks: Vec<Value> = [
        (0, "SoapySource_0"),
        (3, "Selector<2, 1>_0"),
        (7, "Selector<1, 2>_0"),
        (9, "MessageSelector_0"),
        (12, "SoapySink_0"),
        (15, "Decoder_0"),
    ]
    .into_iter()
    .filter(|(_, name)| !skip.contains(name))
    .map(|(id, name)| json!({"id": id, "type_name": "Block", "instance_name": name}))
    .collect();
    json!({"blocks": blocks, "stream_edges": [], "message_edges": []})
}

pub fn stock_flowgraph() -> Value {
    flowgraph_without(&[])
}

pub fn connect(transport: RecordingTransport) -> PhyController<RecordingTransport> {
    let (controller, _) = PhyController::connect(transport, BASE_URL, &default_matchers())
        .expect("discovery should succeed");
    controller
}
