//! HTTP transports
//!
//! Every request [`crate::GraphApi`] makes, including the OAuth2 token
//! exchange, goes through a [`Transport`]. The default is [`HttpTransport`],
//! a thin wrapper over `reqwest::Client`. When HTTP debugging is enabled the
//! client wraps it in a [`DebugTransport`], which copies request and response
//! traffic to a [`DebugSink`] without changing what the caller sends or reads.
//!
//! Output format:
//!
//! ```text
//! [request]
//! GET https://graph.microsoft.com/contoso.com/v1.0/users/jane HTTP/1.1
//! authorization: [REDACTED]
//!
//! [/request]
//! [response]
//! HTTP/1.1 200 OK
//! content-type: application/json
//!
//! {"displayName":"Jane Doe"}
//! [/response]
//! ```

use std::fmt;
use std::io::{self, Write};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use http_body_util::BodyExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Body, Client, Request, Response};
use url::form_urlencoded;

/// Sends a fully built HTTP request and returns the response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Transport that sends requests with a `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        self.client.execute(request).await
    }
}

// ============================================================================
// DebugSink
// ============================================================================

/// Shared writer receiving HTTP debug output
///
/// Cloning a sink shares the underlying writer. Write failures are ignored:
/// tracing must never fail the request it is tracing.
#[derive(Clone)]
pub struct DebugSink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl DebugSink {
    /// Creates a sink writing to `writer`
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Creates a sink writing to standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    fn write(&self, bytes: &[u8]) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writer.write_all(bytes);
        let _ = writer.flush();
    }
}

impl Default for DebugSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink").finish_non_exhaustive()
    }
}

// ============================================================================
// DebugTransport
// ============================================================================

/// Transport that dumps requests and responses to a [`DebugSink`]
///
/// Buffered request bodies are inspected in place and sent unchanged;
/// streaming request bodies are echoed chunk by chunk as they are sent.
/// Response bodies are never collected: each chunk is echoed to the sink as
/// the caller reads it, and a closing marker is written at end of stream.
#[derive(Debug)]
pub struct DebugTransport<T> {
    inner: T,
    sink: DebugSink,
}

impl<T: Transport> DebugTransport<T> {
    pub fn new(inner: T, sink: DebugSink) -> Self {
        Self { inner, sink }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for DebugTransport<T> {
    async fn execute(&self, request: Request) -> reqwest::Result<Response> {
        let request = self.tee_request(request);

        let result = self.inner.execute(request).await;

        match result {
            Ok(response) => Ok(self.tee_response(response)),
            Err(err) => {
                self.sink
                    .write(format!("[response]\nERROR: {}\n", err).as_bytes());
                Err(err)
            }
        }
    }
}

impl<T> DebugTransport<T> {
    /// Writes the request dump; a streaming body is re-wrapped so each chunk
    /// is echoed as it is sent
    fn tee_request(&self, mut request: Request) -> Request {
        self.sink.write(&dump_request(&request));

        let streaming = request.body().is_some_and(|b| b.as_bytes().is_none());
        if streaming {
            if let Some(body) = request.body_mut().take() {
                let echo = EchoStream::new(body.into_data_stream(), self.sink.clone(), REQUEST_END);
                *request.body_mut() = Some(Body::wrap_stream(echo));
            }
        }
        request
    }

    /// Writes the response head and re-wraps the body in an echoing stream
    fn tee_response(&self, response: Response) -> Response {
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();

        let mut head = format!("[response]\n{:?} {}\r\n", version, status).into_bytes();
        write_headers(&mut head, &headers);
        head.extend_from_slice(b"\r\n");
        self.sink.write(&head);

        let body = EchoStream::new(response.bytes_stream(), self.sink.clone(), RESPONSE_END);

        let mut rebuilt = http::Response::new(Body::wrap_stream(body));
        *rebuilt.status_mut() = status;
        *rebuilt.version_mut() = version;
        *rebuilt.headers_mut() = headers;
        Response::from(rebuilt)
    }
}

fn dump_request(request: &Request) -> Vec<u8> {
    let mut out = format!(
        "\n[request]\n{} {} {:?}\r\n",
        request.method(),
        request.url(),
        request.version()
    )
    .into_bytes();
    write_headers(&mut out, request.headers());
    out.extend_from_slice(b"\r\n");

    if let Some(body) = request.body() {
        match body.as_bytes() {
            Some(bytes) if is_form(request.headers()) => {
                out.extend_from_slice(redact_form(bytes).as_bytes())
            }
            Some(bytes) => out.extend_from_slice(bytes),
            // Echoed chunk by chunk, closed by the stream
            None => return out,
        }
    }
    out.extend_from_slice(REQUEST_END);
    out
}

fn write_headers(out: &mut Vec<u8>, headers: &HeaderMap) {
    for (name, value) in headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        if value.is_sensitive() {
            out.extend_from_slice(b"[REDACTED]");
        } else {
            out.extend_from_slice(value.as_bytes());
        }
        out.extend_from_slice(b"\r\n");
    }
}

/// Form fields whose values never appear in a dump
const SENSITIVE_FORM_FIELDS: &[&str] = &["client_secret", "client_assertion", "password"];

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

fn redact_form(body: &[u8]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in form_urlencoded::parse(body) {
        if SENSITIVE_FORM_FIELDS.contains(&name.as_ref()) {
            serializer.append_pair(&name, "[REDACTED]");
        } else {
            serializer.append_pair(&name, &value);
        }
    }
    serializer.finish()
}

const REQUEST_END: &[u8] = b"\n[/request]\n";
const RESPONSE_END: &[u8] = b"\n[/response]\n";

/// Pass-through body stream that echoes every chunk to a sink
struct EchoStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    sink: DebugSink,
    /// Written once at end of stream
    closing: &'static [u8],
    finished: bool,
}

impl EchoStream {
    fn new<S>(inner: S, sink: DebugSink, closing: &'static [u8]) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(inner),
            sink,
            closing,
            finished: false,
        }
    }
}

impl Stream for EchoStream {
    type Item = reqwest::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sink.write(&chunk);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(None) => {
                if !this.finished {
                    this.finished = true;
                    this.sink.write(this.closing);
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }
}
