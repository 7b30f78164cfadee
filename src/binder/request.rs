use http::Method;
use std::collections::HashMap;

/// Raw request data as handed over by the HTTP runtime.
///
/// Header names are stored lower-cased. The body is kept as raw bytes; an
/// absent body is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Decoded query string parameters (last duplicate wins)
    pub query_params: HashMap<String, String>,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Raw payload, if the client sent one
    pub body: Option<Vec<u8>>,
}

impl RawRequest {
    /// Create a request for `path`. A query string on `path` is split off and parsed.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let (path_only, query_params) = split_url(path);
        Self {
            method,
            path: path_only.to_string(),
            query_params,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Set a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Set a header; the name is lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the raw payload.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a query parameter by name
    #[inline]
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.headers.get(name) {
            return Some(v.as_str());
        }
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Split a raw URL into its path and decoded query parameters.
fn split_url(raw_url: &str) -> (&str, HashMap<String, String>) {
    match raw_url.split_once('?') {
        Some((path, query)) => (path, parse_query_string(query)),
        None => (raw_url, HashMap::new()),
    }
}

/// Parse query string parameters
///
/// URL-decodes parameter names and values (`+` is a space). With duplicate
/// names the last occurrence wins.
///
/// # Arguments
///
/// * `query` - The query string without the leading `?` (e.g., `limit=10&offset=20`)
#[must_use]
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
