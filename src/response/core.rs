use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` since most of them (content-type, request id)
/// are repeated on every response.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

fn find_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

fn replace_header(headers: &mut HeaderVec, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value));
}

/// What a handler returns: status, headers and a serializable body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: T,
}

impl<T> Response<T> {
    #[must_use]
    pub fn new(status: u16, body: T) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    /// `200 OK`
    #[must_use]
    pub fn ok(body: T) -> Self {
        Self::new(200, body)
    }

    /// `201 Created`
    #[must_use]
    pub fn created(body: T) -> Self {
        Self::new(201, body)
    }

    /// Add or replace a header (names compare case-insensitively).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        replace_header(&mut self.headers, name, value.into());
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The write side of the HTTP runtime.
///
/// The dispatcher calls `set_status`, then `set_header` for each header, then
/// `send` exactly once, and only after the whole response has been encoded.
pub trait ResponseSink {
    /// Whether the client has gone away; a closed sink is never written to.
    fn is_closed(&self) -> bool {
        false
    }

    fn set_status(&mut self, status: u16);

    fn set_header(&mut self, name: &str, value: &str);

    fn send(&mut self, body: Vec<u8>);
}

/// A response serialized to bytes, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl EncodedResponse {
    /// Plain-text response with `content-type: text/plain; charset=utf-8`.
    #[must_use]
    pub fn plain_text(status: u16, text: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((
            Arc::from("content-type"),
            "text/plain; charset=utf-8".to_string(),
        ));
        Self {
            status,
            headers,
            body: text.as_bytes().to_vec(),
        }
    }

    /// JSON response with `content-type: application/json`.
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body: body.to_string().into_bytes(),
        }
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        replace_header(&mut self.headers, name, value.into());
    }

    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Write status, headers and body to `sink` in one go.
    pub fn write_to(self, sink: &mut dyn ResponseSink) {
        sink.set_status(self.status);
        for (name, value) in &self.headers {
            sink.set_header(name, value);
        }
        debug!(
            status = self.status,
            header_count = self.headers.len(),
            body_size_bytes = self.body.len(),
            "Response written"
        );
        sink.send(self.body);
    }
}

/// A handler response could not be encoded. Nothing has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The body failed to serialize
    Serialize(String),
    /// Not a valid HTTP status code
    InvalidStatus(u16),
    /// A header name or value is not valid HTTP
    InvalidHeader { name: String },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Serialize(msg) => write!(f, "failed to serialize response body: {msg}"),
            EncodeError::InvalidStatus(status) => write!(f, "invalid status code {status}"),
            EncodeError::InvalidHeader { name } => write!(f, "invalid response header `{name}`"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Serialize a handler response.
///
/// A body that serializes to a JSON string is sent as-is with
/// `text/plain; charset=utf-8`; anything else is sent as JSON with
/// `application/json`. A `content-type` set by the handler is kept. `204` and
/// `304` responses carry no body.
pub fn encode_response<T: Serialize>(response: Response<T>) -> Result<EncodedResponse, EncodeError> {
    let Response {
        status,
        mut headers,
        body,
    } = response;

    StatusCode::from_u16(status).map_err(|_| EncodeError::InvalidStatus(status))?;
    for (name, value) in &headers {
        let valid = HeaderName::from_bytes(name.as_bytes()).is_ok()
            && HeaderValue::from_str(value).is_ok();
        if !valid {
            return Err(EncodeError::InvalidHeader {
                name: name.to_string(),
            });
        }
    }

    if status == 204 || status == 304 {
        return Ok(EncodedResponse {
            status,
            headers,
            body: Vec::new(),
        });
    }

    let value = serde_json::to_value(&body).map_err(|e| EncodeError::Serialize(e.to_string()))?;
    let (default_type, bytes) = match value {
        Value::String(s) => ("text/plain; charset=utf-8", s.into_bytes()),
        other => (
            "application/json",
            serde_json::to_vec(&other).map_err(|e| EncodeError::Serialize(e.to_string()))?,
        ),
    };
    if find_header(&headers, "content-type").is_none() {
        headers.push((Arc::from("content-type"), default_type.to_string()));
    }

    Ok(EncodedResponse {
        status,
        headers,
        body: bytes,
    })
}

/// In-memory [`ResponseSink`], for tests and the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedSink {
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    closed: bool,
}

impl BufferedSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the client disconnecting.
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Nothing has been written yet.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.body.is_none()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_ref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

impl ResponseSink for BufferedSink {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn send(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }
}
