//! In-crate HTTP stub server for tool tests.
//!
//! A minimal `TcpListener` loop that serves canned JSON responses and
//! counts how many requests it received, so tests can assert both on the
//! normalized result and on how many outbound calls were actually made
//! (in particular: zero, for requests rejected before the network).

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rmcp::model::JsonObject;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::core::config::HttpClientConfig;
use crate::domains::tools::client::ProviderClient;

/// Build a `JsonObject` from a `json!` literal.
pub fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("test arguments must be a JSON object, got {other}"),
    }
}

/// A `ProviderClient` with default settings.
pub fn test_client() -> ProviderClient {
    ProviderClient::new(&HttpClientConfig::default())
}

/// One canned response, selected by request-path prefix.
#[derive(Debug, Clone)]
struct StubRoute {
    prefix: String,
    status: u16,
    body: String,
}

/// Stub HTTP server bound to an ephemeral local port.
pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    requests: Arc<std::sync::Mutex<Vec<(String, String)>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Start a stub returning the same response for every request.
    pub async fn start(status: u16, body: &str) -> Self {
        Self::start_with(&[("", status, body)]).await
    }

    /// Start a stub with path-prefix routing; the first matching prefix
    /// wins, and an empty prefix acts as a catch-all.
    pub async fn start_with(routes: &[(&str, u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let hits = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(std::sync::Mutex::new(Vec::new()));

        let routes: Vec<StubRoute> = routes
            .iter()
            .map(|(prefix, status, body)| StubRoute {
                prefix: prefix.to_string(),
                status: *status,
                body: body.to_string(),
            })
            .collect();

        let task_hits = hits.clone();
        let task_requests = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                handle_connection(stream, &routes, &task_hits, &task_requests).await;
            }
        });

        Self {
            addr,
            hits,
            requests,
            handle,
        }
    }

    /// Full URL for the given path on this stub.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Base URL (no path) for pointing a tool at this stub.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Paths (with query strings) and bodies of the requests served so
    /// far, in arrival order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: &[StubRoute],
    hits: &AtomicUsize,
    requests: &std::sync::Mutex<Vec<(String, String)>>,
) {
    let Some((path, request_body)) = read_request(&mut stream).await else {
        return;
    };

    hits.fetch_add(1, Ordering::SeqCst);
    requests
        .lock()
        .unwrap()
        .push((path.clone(), request_body));

    let (status, body) = routes
        .iter()
        .find(|route| path.starts_with(&route.prefix))
        .map(|route| (route.status, route.body.as_str()))
        .unwrap_or((404, "{}"));

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason_phrase(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Read one request, returning its path (with query string) and body.
async fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = [0u8; 1024];
    let mut data = Vec::new();

    let header_end = loop {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = find_subsequence(&data, b"\r\n\r\n") {
            break pos + 4;
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    while data.len() - header_end < content_length {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }

    let body = String::from_utf8_lossy(&data[header_end..]).to_string();
    Some((path, body))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        _ => "Status",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_counts_requests() {
        let stub = StubServer::start(200, r#"{"ok": true}"#).await;
        assert_eq!(stub.hits(), 0);

        let body = reqwest::get(stub.url("/anything")).await.unwrap();
        assert_eq!(body.status().as_u16(), 200);
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_stub_routes_by_prefix() {
        let stub = StubServer::start_with(&[
            ("/token", 200, r#"{"access_token": "t"}"#),
            ("", 200, r#"{"data": []}"#),
        ])
        .await;

        let token: serde_json::Value = reqwest::get(stub.url("/token"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(token["access_token"], "t");

        let data: serde_json::Value = reqwest::get(stub.url("/other"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(data["data"], serde_json::json!([]));
        assert_eq!(stub.hits(), 2);
    }

    #[tokio::test]
    async fn test_stub_captures_request_bodies() {
        let stub = StubServer::start(200, r#"{"ok": true}"#).await;

        let client = reqwest::Client::new();
        client
            .post(stub.url("/submit"))
            .json(&serde_json::json!({"k": "v"}))
            .send()
            .await
            .unwrap();

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "/submit");
        let body: serde_json::Value = serde_json::from_str(&requests[0].1).unwrap();
        assert_eq!(body, serde_json::json!({"k": "v"}));
    }
}
