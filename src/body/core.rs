use crate::schema::{BodyKind, BodySchema};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Decoded request body.
///
/// Exactly one tag per request. `NoBody` covers both "the client sent
/// nothing" and "the endpoint declares no body".
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue<T> {
    Json(T),
    NoBody,
    Form(HashMap<String, String>),
    Text(String),
    Bytes(Vec<u8>),
}

impl<T> Default for BodyValue<T> {
    fn default() -> Self {
        BodyValue::NoBody
    }
}

impl<T> BodyValue<T> {
    /// Encoding of the body; `None` for `NoBody`.
    #[must_use]
    pub fn kind(&self) -> Option<BodyKind> {
        match self {
            BodyValue::Json(_) => Some(BodyKind::Json),
            BodyValue::NoBody => None,
            BodyValue::Form(_) => Some(BodyKind::Form),
            BodyValue::Text(_) => Some(BodyKind::Text),
            BodyValue::Bytes(_) => Some(BodyKind::Bytes),
        }
    }

    /// Short tag name used in logs and error messages.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.kind().map(|k| k.as_str()).unwrap_or("none")
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        !matches!(self, BodyValue::NoBody)
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&T> {
        match self {
            BodyValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Take the JSON payload; any other tag is reported as [`UnexpectedBody`].
    pub fn into_json(self) -> Result<T, UnexpectedBody> {
        match self {
            BodyValue::Json(v) => Ok(v),
            other => Err(UnexpectedBody {
                expected: "json",
                found: other.tag(),
            }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> BodyValue<U> {
        match self {
            BodyValue::Json(v) => BodyValue::Json(f(v)),
            BodyValue::NoBody => BodyValue::NoBody,
            BodyValue::Form(m) => BodyValue::Form(m),
            BodyValue::Text(s) => BodyValue::Text(s),
            BodyValue::Bytes(b) => BodyValue::Bytes(b),
        }
    }
}

/// A handler received a body tag it has no branch for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedBody {
    pub expected: &'static str,
    pub found: &'static str,
}

impl fmt::Display for UnexpectedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "internal error: handler expected a {} body but received {}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for UnexpectedBody {}

/// Why a body could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// The schema requires a body and none was sent
    Required,
    /// The payload exceeds the configured limit
    TooLarge { limit: usize, actual: usize },
    /// The content type is neither negotiable nor accepted as raw bytes
    UnsupportedContentType(String),
    /// The payload does not decode as its declared content type
    Decode { kind: BodyKind, message: String },
}

impl BodyError {
    /// HTTP status this error is answered with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            BodyError::TooLarge { .. } => 413,
            _ => 400,
        }
    }
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::Required => write!(f, "body required"),
            BodyError::TooLarge { limit, actual } => {
                write!(f, "body too large: {actual} bytes exceeds limit of {limit}")
            }
            BodyError::UnsupportedContentType(ct) => {
                write!(f, "unsupported content-type: `{ct}`")
            }
            BodyError::Decode { kind, message } => write!(f, "invalid {kind} body: {message}"),
        }
    }
}

impl std::error::Error for BodyError {}

/// Media type of a request payload, as far as negotiation cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Form,
    Text,
    /// Any other media type, lower-cased and without parameters
    Other(String),
}

impl ContentType {
    fn kind(&self) -> Option<BodyKind> {
        match self {
            ContentType::Json => Some(BodyKind::Json),
            ContentType::Form => Some(BodyKind::Form),
            ContentType::Text => Some(BodyKind::Text),
            ContentType::Other(_) => None,
        }
    }
}

/// Classify a `content-type` header value.
///
/// Parameters (`; charset=utf-8`) are ignored and the comparison is
/// case-insensitive. A missing or blank header means JSON.
#[must_use]
pub fn classify_content_type(header: Option<&str>) -> ContentType {
    let media = header
        .and_then(|h| h.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match media.as_str() {
        "" | "application/json" => ContentType::Json,
        "application/x-www-form-urlencoded" => ContentType::Form,
        "text/plain" => ContentType::Text,
        m if m.ends_with("+json") => ContentType::Json,
        _ => ContentType::Other(media),
    }
}

fn content_type_header(headers: &HashMap<String, String>) -> Option<&str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        .map(|(_, v)| v.as_str())
}

/// Decode `payload` according to `schema` and the request's `content-type`.
///
/// `limit` caps the payload size in bytes; `None` means unlimited. A
/// zero-length payload counts as absent.
pub fn decode_body<T: DeserializeOwned>(
    schema: &BodySchema,
    headers: &HashMap<String, String>,
    payload: Option<&[u8]>,
    limit: Option<usize>,
) -> Result<BodyValue<T>, BodyError> {
    if schema.is_none() {
        if payload.is_some_and(|p| !p.is_empty()) {
            debug!("Ignoring payload sent to an endpoint without a body");
        }
        return Ok(BodyValue::NoBody);
    }

    let payload = match payload {
        Some(p) if !p.is_empty() => p,
        _ if schema.required => return Err(BodyError::Required),
        _ => return Ok(BodyValue::NoBody),
    };

    if let Some(limit) = limit {
        if payload.len() > limit {
            return Err(BodyError::TooLarge {
                limit,
                actual: payload.len(),
            });
        }
    }

    let header = content_type_header(headers);
    let content_type = classify_content_type(header);

    let negotiated = content_type.kind().filter(|k| schema.accepts(*k));
    let body = match negotiated {
        Some(BodyKind::Json) => serde_json::from_slice(payload)
            .map(BodyValue::Json)
            .map_err(|e| BodyError::Decode {
                kind: BodyKind::Json,
                message: e.to_string(),
            })?,
        Some(BodyKind::Form) => BodyValue::Form(
            url::form_urlencoded::parse(payload)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        ),
        Some(BodyKind::Text) => String::from_utf8(payload.to_vec())
            .map(BodyValue::Text)
            .map_err(|e| BodyError::Decode {
                kind: BodyKind::Text,
                message: e.to_string(),
            })?,
        Some(BodyKind::Bytes) | None if schema.accepts(BodyKind::Bytes) => {
            BodyValue::Bytes(payload.to_vec())
        }
        Some(BodyKind::Bytes) | None => {
            let shown = header
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| "application/json".to_string());
            return Err(BodyError::UnsupportedContentType(shown));
        }
    };

    debug!(
        body_kind = body.tag(),
        body_size_bytes = payload.len(),
        "Request body decoded"
    );
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn headers(ct: &str) -> HashMap<String, String> {
        HashMap::from([("content-type".to_string(), ct.to_string())])
    }

    #[test]
    fn test_classify_content_type() {
        assert_eq!(classify_content_type(None), ContentType::Json);
        assert_eq!(classify_content_type(Some("  ")), ContentType::Json);
        assert_eq!(
            classify_content_type(Some("Application/JSON; charset=utf-8")),
            ContentType::Json
        );
        assert_eq!(
            classify_content_type(Some("application/problem+json")),
            ContentType::Json
        );
        assert_eq!(
            classify_content_type(Some("application/x-www-form-urlencoded")),
            ContentType::Form
        );
        assert_eq!(
            classify_content_type(Some("text/plain;charset=utf-8")),
            ContentType::Text
        );
        assert_eq!(
            classify_content_type(Some("image/PNG")),
            ContentType::Other("image/png".to_string())
        );
    }

    #[test]
    fn test_form_last_value_wins() {
        let body: BodyValue<Value> = decode_body(
            &BodySchema::json(),
            &headers("application/x-www-form-urlencoded"),
            Some(b"a=1&b=x+y&a=2"),
            None,
        )
        .unwrap();
        match body {
            BodyValue::Form(map) => {
                assert_eq!(map.get("a").map(String::as_str), Some("2"));
                assert_eq!(map.get("b").map(String::as_str), Some("x y"));
            }
            other => panic!("expected form body, got {}", other.tag()),
        }
    }

    #[test]
    fn test_empty_payload_counts_as_absent() {
        let body: BodyValue<Value> =
            decode_body(&BodySchema::json(), &HashMap::new(), Some(b""), None).unwrap();
        assert_eq!(body, BodyValue::NoBody);
        let err = decode_body::<Value>(&BodySchema::json().required(), &HashMap::new(), Some(b""), None)
            .unwrap_err();
        assert_eq!(err, BodyError::Required);
    }

    #[test]
    fn test_size_limit() {
        let err = decode_body::<Value>(&BodySchema::json(), &HashMap::new(), Some(b"[1,2,3]"), Some(4))
            .unwrap_err();
        assert_eq!(err, BodyError::TooLarge { limit: 4, actual: 7 });
        assert_eq!(err.status(), 413);
    }

    #[test]
    fn test_invalid_utf8_text() {
        let err = decode_body::<Value>(
            &BodySchema::json(),
            &headers("text/plain"),
            Some(&[0xff, 0xfe]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BodyError::Decode { kind: BodyKind::Text, .. }));
    }

    #[test]
    fn test_not_accepted_kind_is_unsupported() {
        let err = decode_body::<Value>(
            &BodySchema::only(BodyKind::Json),
            &headers("text/plain"),
            Some(b"hello"),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BodyError::UnsupportedContentType("text/plain".to_string())
        );
    }

    #[test]
    fn test_into_json_reports_unexpected_tag() {
        let body: BodyValue<Value> = BodyValue::Text("hi".to_string());
        let err = body.into_json().unwrap_err();
        assert_eq!(err.found, "text");
        assert!(err.to_string().starts_with("internal error"));
        assert_eq!(BodyValue::Json(json!(1)).into_json().unwrap(), json!(1));
    }
}
