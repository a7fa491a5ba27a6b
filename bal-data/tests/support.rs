//! Canned HTTP server answering one scripted response per connection.

use std::future::Future;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Request as received by the canned server.
#[derive(Debug, Clone, Default)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response returned by the canned server.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Serve `responses` to successive connections, one each, in order.
pub fn serve_sequence<F, Fut, T>(
    responses: Vec<CannedResponse>,
    client: F,
) -> (T, Vec<CapturedRequest>)
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = T>,
{
    runtime().block_on(async move {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|err| panic!("failed to bind canned server: {err}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|err| panic!("failed to read canned server address: {err}"));
        let server = async move {
            let mut captured = Vec::with_capacity(responses.len());
            for response in &responses {
                let (stream, _) = listener
                    .accept()
                    .await
                    .unwrap_or_else(|err| panic!("canned server failed to accept: {err}"));
                captured.push(handle(stream, response).await);
            }
            captured
        };
        let (result, captured) = tokio::join!(client(base_url(addr)), server);
        (result, captured)
    })
}

/// Run `client` against an address with nothing listening.
pub fn with_closed_port<F, Fut, T>(client: F) -> T
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = T>,
{
    runtime().block_on(async move {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .unwrap_or_else(|err| panic!("failed to bind probe listener: {err}"));
            listener
                .local_addr()
                .unwrap_or_else(|err| panic!("failed to read probe address: {err}"))
        };
        client(base_url(addr)).await
    })
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}/v1")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|err| panic!("failed to build test runtime: {err}"))
}

async fn handle(mut stream: TcpStream, response: &CannedResponse) -> CapturedRequest {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];
    let header_end = loop {
        let read = stream
            .read(&mut chunk)
            .await
            .unwrap_or_else(|err| panic!("canned server failed to read: {err}"));
        assert!(read > 0, "client closed the connection before sending headers");
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let path = parts.next().unwrap_or_default().to_owned();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let body_start = header_end + 4;
    while buffer.len() < body_start + content_length {
        let read = stream
            .read(&mut chunk)
            .await
            .unwrap_or_else(|err| panic!("canned server failed to read body: {err}"));
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }
    let body_end = buffer.len().min(body_start + content_length);
    let body = String::from_utf8_lossy(&buffer[body_start..body_end]).into_owned();

    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason(response.status),
        response.body.len(),
        response.body
    );
    stream
        .write_all(reply.as_bytes())
        .await
        .unwrap_or_else(|err| panic!("canned server failed to write: {err}"));
    stream
        .shutdown()
        .await
        .unwrap_or_else(|err| panic!("canned server failed to shut down: {err}"));

    CapturedRequest {
        method,
        path,
        headers,
        body,
    }
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|window| window == b"\r\n\r\n")
}

const fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
