// src/checker/http.rs
// =============================================================================
// This module checks if remote URLs are alive by making HTTP requests.
//
// Key functionality:
// - HEAD request first (lightweight, no body download)
// - A one-shot GET retry for a small set of status codes and for timeouts /
//   connection errors; many sites answer HEAD from bots with 404/405/503
// - Only an exact 200 from HEAD counts as success without a retry
//
// The network sits behind the `Transport` trait so the decision logic can be
// tested without sockets. `HttpTransport` is the reqwest implementation.
// =============================================================================

use futures::StreamExt; // StreamExt gives us .next() on the body stream
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::reference::{CheckResult, Detail, Reference};
use crate::error::Result;

/// Per-request timeout for HEAD and for the retry GET
pub const TIMEOUT: Duration = Duration::from_secs(10);

pub const MAX_REDIRECTS: usize = 5;

/// HEAD status codes that get a second chance through a GET
pub const RETRY_CODES: [u16; 4] = [400, 404, 405, 503];

/// The retry reads at most this many body lines
const RETRY_MAX_LINES: usize = 80;

/// A body line must be longer than this for the retry to succeed
const RETRY_MIN_LINE_LEN: usize = 10;

/// Why a request produced no response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Read timeout or connection error; worth one retry
    Transient(String),
    /// Anything else (redirect loop, invalid URL, ...)
    Other(String),
}

impl TransportError {
    pub fn message(&self) -> &str {
        match self {
            TransportError::Transient(message) | TransportError::Other(message) => message,
        }
    }
}

/// The two requests the remote checker needs
pub trait Transport {
    /// HEAD request, redirects followed. Returns the final status code.
    async fn head(&self, url: &str) -> std::result::Result<u16, TransportError>;

    /// GET request, streaming. Returns at most `max_lines` lines of the body.
    async fn get_lines(
        &self,
        url: &str,
        max_lines: usize,
    ) -> std::result::Result<Vec<String>, TransportError>;
}

/// reqwest-backed transport. One client (one connection pool) per run.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn head(&self, url: &str) -> std::result::Result<u16, TransportError> {
        debug!(url, "HEAD");
        let response = self.client.head(url).send().await.map_err(classify_error)?;
        Ok(response.status().as_u16())
    }

    async fn get_lines(
        &self,
        url: &str,
        max_lines: usize,
    ) -> std::result::Result<Vec<String>, TransportError> {
        debug!(url, "GET (retry)");
        let response = self.client.get(url).send().await.map_err(classify_error)?;

        // Read chunk by chunk and stop as soon as we have enough lines,
        // so a huge page is never downloaded completely
        let mut stream = response.bytes_stream();
        let mut lines = Vec::new();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(classify_error)?;
            pending.extend_from_slice(&chunk);

            while let Some(newline) = pending.iter().position(|byte| *byte == b'\n') {
                let line: Vec<u8> = pending.drain(..=newline).collect();
                lines.push(decode_line(&line));
                if lines.len() >= max_lines {
                    return Ok(lines);
                }
            }
        }

        if !pending.is_empty() {
            lines.push(decode_line(&pending));
        }
        Ok(lines)
    }
}

/// Checks one remote reference.
///
/// Decision table for the HEAD outcome:
///   200                      -> ok
///   400 / 404 / 405 / 503    -> ok if the retry succeeds, else fail(status)
///   any other status         -> fail(status), no retry
///   timeout / connect error  -> ok if the retry succeeds, else fail(error)
///   any other error          -> fail(error)
pub async fn check_remote<T: Transport>(transport: &T, reference: &Reference) -> CheckResult {
    let url = reference.text.as_str();

    match transport.head(url).await {
        Ok(status) if RETRY_CODES.contains(&status) => {
            if retry(transport, url).await {
                CheckResult::ok(reference)
            } else {
                CheckResult::fail(reference, Some(Detail::Status(status)))
            }
        }
        Ok(200) => CheckResult::ok(reference),
        Ok(status) => CheckResult::fail(reference, Some(Detail::Status(status))),
        Err(TransportError::Transient(message)) => {
            if retry(transport, url).await {
                CheckResult::ok(reference)
            } else {
                CheckResult::fail(reference, Some(Detail::Error(message)))
            }
        }
        Err(TransportError::Other(message)) => {
            CheckResult::fail(reference, Some(Detail::Error(message)))
        }
    }
}

/// One-shot GET retry.
///
/// Anti-bot setups often reject HEAD but serve a page to GET. The status code
/// of the GET is not looked at: a body with real content is what counts.
async fn retry<T: Transport>(transport: &T, url: &str) -> bool {
    match transport.get_lines(url, RETRY_MAX_LINES).await {
        Ok(lines) => lines.iter().any(|line| line.len() > RETRY_MIN_LINE_LEN),
        Err(e) => {
            debug!(url, error = e.message(), "retry failed");
            false
        }
    }
}

// Splits reqwest errors into "retry once" and "give up"
fn classify_error(error: reqwest::Error) -> TransportError {
    let message = error.to_string();
    if error.is_timeout() || error.is_connect() {
        TransportError::Transient(message)
    } else {
        TransportError::Other(message)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is `async fn` inside a trait?
//    - Since Rust 1.75 traits can declare async methods directly
//    - Each implementation returns its own future type
//    - We only use the trait through generics (`T: Transport`), never as
//      `dyn Transport`, so no boxing crate is needed
//
// 2. What does bytes_stream() give us?
//    - A Stream of body chunks as they arrive from the network
//    - Returning early from the loop drops the response, which closes the
//      connection without downloading the rest
//
// 3. Why `drain(..=newline)`?
//    - It removes the bytes of one line (including '\n') from the front of
//      the buffer and hands them to us, keeping the rest for the next round
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::reference::{CheckStatus, ScanTarget};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Fake transport with canned answers per URL
    #[derive(Default)]
    struct ScriptedTransport {
        heads: HashMap<String, std::result::Result<u16, TransportError>>,
        bodies: HashMap<String, std::result::Result<Vec<String>, TransportError>>,
        gets: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        fn on_head(mut self, url: &str, outcome: std::result::Result<u16, TransportError>) -> Self {
            self.heads.insert(url.to_string(), outcome);
            self
        }

        fn on_body(mut self, url: &str, lines: &[&str]) -> Self {
            let lines = lines.iter().map(|l| l.to_string()).collect();
            self.bodies.insert(url.to_string(), Ok(lines));
            self
        }

        fn on_body_error(mut self, url: &str, error: TransportError) -> Self {
            self.bodies.insert(url.to_string(), Err(error));
            self
        }
    }

    impl Transport for ScriptedTransport {
        async fn head(&self, url: &str) -> std::result::Result<u16, TransportError> {
            self.heads
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("unscripted".into())))
        }

        async fn get_lines(
            &self,
            url: &str,
            max_lines: usize,
        ) -> std::result::Result<Vec<String>, TransportError> {
            self.gets.borrow_mut().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
                .map(|lines| lines.into_iter().take(max_lines).collect())
        }
    }

    fn remote(url: &str) -> Reference {
        Reference::remote(url, &ScanTarget::new("a.md", "."))
    }

    const URL: &str = "https://good.example.com";

    #[tokio::test]
    async fn test_200_is_ok_without_retry() {
        let transport = ScriptedTransport::default().on_head(URL, Ok(200));
        let result = check_remote(&transport, &remote(URL)).await;

        assert!(result.is_ok());
        assert!(transport.gets.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_without_retry() {
        for status in [201, 301, 401, 410, 500] {
            let transport = ScriptedTransport::default()
                .on_head(URL, Ok(status))
                .on_body(URL, &["<html><body>long enough</body></html>"]);
            let result = check_remote(&transport, &remote(URL)).await;

            assert_eq!(result.status, CheckStatus::Fail);
            assert_eq!(result.detail, Some(Detail::Status(status)));
            assert!(transport.gets.borrow().is_empty());
        }
    }

    #[tokio::test]
    async fn test_retryable_status_recovered_by_body() {
        let transport = ScriptedTransport::default()
            .on_head(URL, Ok(503))
            .on_body(URL, &["", "<!DOCTYPE html><html>"]);
        let result = check_remote(&transport, &remote(URL)).await;

        assert!(result.is_ok());
        assert_eq!(transport.gets.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_retryable_status_with_short_body_fails() {
        let transport = ScriptedTransport::default()
            .on_head(URL, Ok(404))
            .on_body(URL, &["not found", "", "0123456789"]);
        let result = check_remote(&transport, &remote(URL)).await;

        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.detail, Some(Detail::Status(404)));
    }

    #[tokio::test]
    async fn test_timeout_recovered_by_retry() {
        let transport = ScriptedTransport::default()
            .on_head(URL, Err(TransportError::Transient("timed out".into())))
            .on_body(URL, &["<html lang=\"en\"><head>"]);
        let result = check_remote(&transport, &remote(URL)).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_with_failing_retry_reports_error_text() {
        let transport = ScriptedTransport::default()
            .on_head(URL, Err(TransportError::Transient("operation timed out".into())))
            .on_body_error(URL, TransportError::Transient("operation timed out".into()));
        let result = check_remote(&transport, &remote(URL)).await;

        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(
            result.detail,
            Some(Detail::Error("operation timed out".to_string()))
        );
        // one-shot: exactly one GET
        assert_eq!(transport.gets.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let transport = ScriptedTransport::default()
            .on_head(URL, Err(TransportError::Other("too many redirects".into())))
            .on_body(URL, &["<html lang=\"en\"><head>"]);
        let result = check_remote(&transport, &remote(URL)).await;

        assert_eq!(result.status, CheckStatus::Fail);
        assert!(transport.gets.borrow().is_empty());
    }

    // ---- HttpTransport against a local socket --------------------------------

    // Serves one canned response per accepted connection
    async fn serve<S: Into<String>>(responses: Vec<S>) -> String {
        let responses: Vec<String> = responses.into_iter().map(Into::into).collect();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                // the client may hang up early once it has read enough
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/page", addr)
    }

    // Answers every request with a redirect back to itself
    async fn serve_redirect_loop() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 302 Found\r\nLocation: /again\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    )
                    .await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/page", addr)
    }

    fn local_transport() -> HttpTransport {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .no_proxy()
            .build()
            .unwrap();
        HttpTransport::with_client(client)
    }

    #[tokio::test]
    async fn test_http_head_reports_status() {
        let url = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ])
        .await;

        let status = local_transport().head(&url).await.unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn test_http_retry_reads_body_lines() {
        let url = serve(vec![
            "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            "HTTP/1.1 200 OK\r\nContent-Length: 34\r\nConnection: close\r\n\r\n<!DOCTYPE html>\r\n<html>\r\n</html>\r\n",
        ])
        .await;

        let result = check_remote(&local_transport(), &remote(&url)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_http_retry_ignores_lines_past_the_limit() {
        // 80 short lines, then the only line long enough to count
        let mut body = "x\n".repeat(RETRY_MAX_LINES);
        body.push_str("<!DOCTYPE html><html><body>content</body></html>\n");
        let get = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let url = serve(vec![
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
            get,
        ])
        .await;

        let result = check_remote(&local_transport(), &remote(&url)).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.detail, Some(Detail::Status(404)));
    }

    #[tokio::test]
    async fn test_http_redirect_loop_fails_with_error() {
        let url = serve_redirect_loop().await;

        let result = check_remote(&local_transport(), &remote(&url)).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(matches!(result.detail, Some(Detail::Error(_))));
    }

    #[tokio::test]
    async fn test_http_connection_refused_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = local_transport()
            .head(&format!("http://{}/", addr))
            .await
            .unwrap_err();
        assert!(matches!(error, TransportError::Transient(_)));
    }
}
