//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned HTTP response served by the mock store.
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Handle used to change what the mock store answers and inspect requests.
#[derive(Clone, Default)]
pub struct MockEtcd {
    response: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockEtcd {
    pub fn respond(&self, response: MockResponse) {
        *self.response.lock().unwrap() = Some(response);
    }

    /// Serve an etcd v2 recursive listing of `keys` under `prefix`.
    pub fn serve_keys(&self, prefix: &str, keys: &[(&str, &str)]) {
        self.respond(MockResponse::ok(keys_body(prefix, keys)));
    }

    /// Request lines received so far (`GET /v2/keys/... HTTP/1.1`).
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Build a v2 keys response with one directory level per service.
pub fn keys_body(prefix: &str, keys: &[(&str, &str)]) -> String {
    let leaves: Vec<serde_json::Value> = keys
        .iter()
        .map(|(k, v)| serde_json::json!({"key": k, "value": v, "modifiedIndex": 1, "createdIndex": 1}))
        .collect();

    serde_json::json!({
        "action": "get",
        "node": {
            "key": prefix,
            "dir": true,
            "nodes": [{"key": format!("{}/svc", prefix), "dir": true, "nodes": leaves}],
        }
    })
    .to_string()
}

/// Start a mock etcd HTTP endpoint on an ephemeral port.
pub async fn start_mock_etcd() -> (SocketAddr, MockEtcd) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mock = MockEtcd::default();
    let handle = mock.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let mock = handle.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }

                        let request = String::from_utf8_lossy(&buf);
                        if let Some(line) = request.lines().next() {
                            mock.requests.lock().unwrap().push(line.to_string());
                        }

                        let response = mock.response.lock().unwrap().clone().unwrap_or(MockResponse {
                            status: 404,
                            body: r#"{"errorCode":100,"message":"Key not found","cause":"/backends","index":1}"#.into(),
                        });
                        let status_text = match response.status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "503 Service Unavailable",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            response.body.len(),
                            response.body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, mock)
}
