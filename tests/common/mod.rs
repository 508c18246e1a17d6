//! Shared mock endpoints for probe integration tests.
//!
//! Every mock binds 127.0.0.1:0 and reads the full request before
//! responding, so the client never sees a reset mid-write. Responses carry
//! `Connection: close`, which keeps one connection per probe and makes
//! concurrency observable at accept time.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use apiswitch::probe::types::EndpointDescriptor;

/// Descriptor pointing at a local mock.
pub fn descriptor(name: &str, addr: SocketAddr) -> EndpointDescriptor {
    EndpointDescriptor {
        name: name.to_string(),
        base_url: format!("http://{}", addr),
        token: "test-token".to_string(),
        timeout_override: None,
    }
}

/// An address that refuses connections (bound once, then released).
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Mock endpoint returning a fixed status after an optional delay.
pub async fn start_endpoint(status: u16, delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                respond(&mut socket, status).await;
            });
        }
    });

    addr
}

/// Mock that accepts connections and never responds.
pub async fn start_silent_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let _ = read_request(&mut socket).await;
                // Hold the connection open without answering.
                tokio::time::sleep(Duration::from_secs(3600)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// Mock that rejects streaming requests with 400 but accepts
/// non-streaming ones.
#[allow(dead_code)]
pub async fn start_stream_picky_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                let status = if request.contains("\"stream\":true") {
                    400
                } else {
                    200
                };
                respond(&mut socket, status).await;
            });
        }
    });

    addr
}

/// Mock that tracks the peak number of simultaneously handled requests.
#[allow(dead_code)]
pub async fn start_counting_endpoint(delay: Duration) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let current = Arc::new(AtomicUsize::new(0));
    let max = Arc::new(AtomicUsize::new(0));
    let max_handle = max.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let current = current.clone();
            let max = max.clone();
            tokio::spawn(async move {
                let in_flight = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(in_flight, Ordering::SeqCst);
                let _ = read_request(&mut socket).await;
                tokio::time::sleep(delay).await;
                // Decrement before the response bytes hit the wire so the
                // peak count never over-reports a finished probe.
                current.fetch_sub(1, Ordering::SeqCst);
                respond(&mut socket, 200).await;
            });
        }
    });

    (addr, max_handle)
}

/// Read a complete HTTP request (headers plus content-length body).
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            break;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

async fn respond(socket: &mut TcpStream, status: u16) {
    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        409 => "409 Conflict",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let body = "{\"ok\":true}";
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
