//! Control-plane transports
//!
//! The controller only needs two primitives from the flowgraph's HTTP API:
//! fetching the flowgraph description and posting a value to a block handler.

pub mod http;

pub use http::HttpTransport;

use crate::error::TransportError;
use crate::wire::RemoteCall;

pub trait Transport {
    /// GET `url` and decode the body as JSON
    fn get_json(&mut self, url: &str) -> Result<serde_json::Value, TransportError>;

    /// Write `call.payload` to the handler at `url`. Blocks until the
    /// flowgraph answered; a non-success status is an error.
    fn call(&mut self, url: &str, call: &RemoteCall) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get_json(&mut self, url: &str) -> Result<serde_json::Value, TransportError> {
        (**self).get_json(url)
    }

    fn call(&mut self, url: &str, call: &RemoteCall) -> Result<(), TransportError> {
        (**self).call(url, call)
    }
}
