use reqwest::blocking::{Client, Response};
use std::time::Duration;
use tracing::debug;

use super::Transport;
use crate::error::TransportError;
use crate::wire::RemoteCall;

/// Blocking HTTP client for the flowgraph REST API
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn check_status(response: Response, url: &str) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(TransportError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn get_json(&mut self, url: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let response = check_status(response, url)?;
        response
            .json::<serde_json::Value>()
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn call(&mut self, url: &str, call: &RemoteCall) -> Result<(), TransportError> {
        debug!("POST {} <- {}", url, call.payload);
        let response = self
            .client
            .post(url)
            .json(&call.payload)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        check_status(response, url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::PhyController;
    use crate::directory::default_matchers;
    use crate::error::ControllerError;
    use crate::phy::PhyIndex;
    use crate::wire::{CallPayload, RemoteOp};
    use crossbeam_channel::Receiver;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    const FLOWGRAPH: &str = r#"{"blocks": [
        {"id": 0, "instance_name": "SoapySource_0"},
        {"id": 3, "instance_name": "Selector<2, 1>_0"},
        {"id": 7, "instance_name": "Selector<1, 2>_0"},
        {"id": 9, "instance_name": "MessageSelector_0"},
        {"id": 12, "instance_name": "SoapySink_0"}
    ]}"#;

    #[derive(Debug)]
    struct Served {
        request_line: String,
        body: String,
    }

    /// Answer one connection per `(status, body)` pair, then stop
    fn serve(replies: Vec<(u16, &'static str)>) -> (String, Receiver<Served>, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/api/fg/0/", listener.local_addr().unwrap());
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = thread::spawn(move || {
            for (status, body) in replies {
                let (stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream);

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut content_length = 0;
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = header.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }
                let mut request_body = vec![0; content_length];
                reader.read_exact(&mut request_body).unwrap();
                tx.send(Served {
                    request_line: request_line.trim_end().to_string(),
                    body: String::from_utf8(request_body).unwrap(),
                })
                .unwrap();

                let response = match status {
                    204 => "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string(),
                    _ => format!(
                        "HTTP/1.1 {} Reply\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    ),
                };
                let mut stream = reader.into_inner();
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        (base, rx, handle)
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_call_status_handling() {
        let (base, served, server) = serve(vec![(200, ""), (204, ""), (500, "")]);
        let mut http = transport();
        let call = RemoteCall::new(RemoteOp::SourceSelectorIndex, CallPayload::u32(1));
        let url = format!("{}block/3/call/0/", base);

        assert_eq!(http.call(&url, &call), Ok(()));
        assert_eq!(http.call(&url, &call), Ok(()));
        assert_eq!(
            http.call(&url, &call),
            Err(TransportError::Status {
                status: 500,
                url: url.clone()
            })
        );
        server.join().unwrap();

        let requests: Vec<Served> = served.try_iter().collect();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert_eq!(request.request_line, "POST /api/fg/0/block/3/call/0/ HTTP/1.1");
            assert_eq!(request.body, r#"{"U32":1}"#);
        }
    }

    #[test]
    fn test_select_stops_at_rejected_call() {
        let (base, served, server) = serve(vec![(200, FLOWGRAPH), (200, ""), (204, ""), (500, "")]);
        let (mut controller, description) =
            PhyController::connect(transport(), &base, &default_matchers()).unwrap();
        assert_eq!(description.blocks.len(), 5);
        assert!(controller.missing_roles().is_empty());

        match controller.select(1) {
            Err(ControllerError::TransportFailure { op, source }) => {
                assert_eq!(op, RemoteOp::MessageSelectorIndex);
                assert_eq!(
                    source,
                    TransportError::Status {
                        status: 500,
                        url: format!("{}block/9/call/1/", base)
                    }
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(controller.active_phy(), PhyIndex::Phy0);
        server.join().unwrap();

        let requests: Vec<Served> = served.try_iter().collect();
        let lines: Vec<&str> = requests.iter().map(|r| r.request_line.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "GET /api/fg/0/ HTTP/1.1",
                "POST /api/fg/0/block/3/call/0/ HTTP/1.1",
                "POST /api/fg/0/block/7/call/1/ HTTP/1.1",
                "POST /api/fg/0/block/9/call/1/ HTTP/1.1",
            ]
        );
        assert!(requests[1..].iter().all(|r| r.body == r#"{"U32":1}"#));
    }

    #[test]
    fn test_get_json_errors() {
        let (base, _served, server) = serve(vec![(200, "not json"), (404, "")]);
        let mut http = transport();
        assert!(matches!(http.get_json(&base), Err(TransportError::Decode(_))));
        assert!(matches!(
            http.get_json(&base),
            Err(TransportError::Status { status: 404, .. })
        ));
        server.join().unwrap();

        // nothing listening any more
        assert!(matches!(http.get_json(&base), Err(TransportError::Request(_))));
    }
}
