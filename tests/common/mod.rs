//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use panel_sync::config::NodeConfig;

/// One canned panel response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub etag: Option<&'static str>,
    pub body: String,
}

impl MockResponse {
    pub fn ok(etag: Option<&'static str>, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            etag,
            body: body.into(),
        }
    }
}

/// Handle to a running mock panel.
#[allow(dead_code)]
pub struct MockPanel {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
    pub request_lines: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockPanel {
    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            api_host: format!("http://{}", self.addr),
            api_key: "test-key".to_string(),
            node_id: 1,
            node_type: "vmess".to_string(),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Start a mock panel. `respond` receives the zero-based request index.
pub async fn start_panel<F>(respond: F) -> MockPanel
where
    F: Fn(usize) -> MockResponse + Send + Sync + 'static,
{
    // Keep loopback requests away from any proxy configured in the environment.
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let request_lines = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let counter = hits.clone();
    let lines = request_lines.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let respond = respond.clone();
                    let counter = counter.clone();
                    let lines = lines.clone();
                    tokio::spawn(async move {
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&buf);
                        if let Some(line) = head.lines().next() {
                            lines.lock().unwrap().push(line.to_string());
                        }

                        let index = counter.fetch_add(1, Ordering::SeqCst);
                        let response = respond(index);
                        let status_text = match response.status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let etag = response
                            .etag
                            .map(|t| format!("ETag: {}\r\n", t))
                            .unwrap_or_default();
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            etag,
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

    MockPanel {
        addr,
        hits,
        request_lines,
    }
}

/// A node info body with the given routes JSON and intervals.
#[allow(dead_code)]
pub fn node_body(routes: &str, push: &str, pull: &str) -> String {
    format!(
        r#"{{"host":"node.example.com","server_port":443,"server_name":"","network":"tcp","networkSettings":null,"cipher":"","server_key":"","tls":0,"routes":{routes},"base_config":{{"push_interval":{push},"pull_interval":{pull}}}}}"#
    )
}
