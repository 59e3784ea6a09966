//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A mock Nagios web server returning a fixed response.
pub struct MockNagios {
    pub addr: SocketAddr,
    /// Request lines received, e.g. `GET /nagios/... HTTP/1.1`.
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Start a mock Nagios server answering every request with `status` and `body`.
pub async fn start_mock_nagios(status: u16, body: String) -> MockNagios {
    start_mock_nagios_bytes(status, body.into_bytes()).await
}

/// Like [`start_mock_nagios`], for bodies that are not valid UTF-8.
pub async fn start_mock_nagios_bytes(status: u16, body: Vec<u8>) -> MockNagios {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let body = body.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]);
                        if let Some(line) = request.lines().next() {
                            seen.lock().unwrap().push(line.to_string());
                        }

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let head = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            status_text,
                            body.len()
                        );
                        let mut response = head.into_bytes();
                        response.extend_from_slice(&body);
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNagios { addr, requests }
}

/// Start a backend that accepts connections and never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            match listener.accept().await {
                Ok((socket, _)) => held.push(socket),
                Err(_) => break,
            }
        }
    });

    addr
}

/// Cell holding a name link nested the way status.cgi renders it.
fn name_cell(name: &str) -> String {
    format!(
        "<td class='statusEven'><table border=0 width='100%' cellpadding=0 cellspacing=0><tbody><tr>\
         <td align='left'><table border=0 cellpadding=0 cellspacing=0><tbody><tr>\
         <td align=left valign=center class='statusEven'><a href='extinfo.cgi?type=1&host={name}'>{name}</a></td>\
         </tr></tbody></table></td>\
         <td align=right valign=center><table border=0 cellpadding=0 cellspacing=0><tbody><tr>\
         <td><a href='status.cgi?host={name}'><img src='/nagios/images/status2.gif' border=0></a></td>\
         </tr></tbody></table></td>\
         </tr></tbody></table></td>"
    )
}

/// One service row; `None` renders an empty cell.
pub fn status_row(host: Option<&str>, service: Option<&str>, status: &str) -> String {
    let host = host.map(name_cell).unwrap_or_else(|| "<td></td>".to_string());
    let service = service.map(name_cell).unwrap_or_else(|| "<td></td>".to_string());
    format!(
        "<tr>{}{}<td class='status{}'>{}</td><td>01-01-2024 00:00:00</td><td>0d 1h 2m 3s</td></tr>",
        host, service, status, status
    )
}

/// Spacer row Nagios emits between host blocks.
pub fn spacer_row() -> String {
    "<tr><td colspan=6></td></tr>".to_string()
}

/// Full status page around the given rows.
pub fn status_page(rows: &[String]) -> String {
    format!(
        "<html><head><title>Current Network Status</title></head><body>\
         <p><div align='center' class='statusTitle'>Service Status Details For All Hosts</div></p>\
         <table border=0 width=100% class='status'><tbody>\
         <tr><th class='status'>Host</th><th class='status'>Service</th><th class='status'>Status</th>\
         <th class='status'>Last Check</th><th class='status'>Duration</th></tr>\
         {}\
         </tbody></table></body></html>",
        rows.concat()
    )
}
