//! Shared test utilities
//!
//! A canned HTTP server for exercising the embedder clients and the table
//! store without a real backend.
//!
//! ```toml
//! [dev-dependencies]
//! simsearch-test-utils = { path = "../test-utils" }
//! ```

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Content type for JSON bodies
pub const JSON: &str = "application/json";
/// Content type for CSV bodies
pub const CSV: &str = "text/csv";

/// Serve the same canned response to every connection
///
/// The full request is read before answering. Returns the base URL of the
/// listener, e.g. `http://127.0.0.1:41234`.
pub async fn serve_canned(
    status: u16,
    content_type: &'static str,
    body: &'static str,
) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    content_type,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Ok(format!("http://{}", addr))
}

/// Drain one HTTP request (headers plus Content-Length body)
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            return;
        }
        data.extend_from_slice(&buf[..n]);

        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..pos]).to_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= pos + 4 + body_len {
                return;
            }
        }
    }
}
