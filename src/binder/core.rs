use super::request::RawRequest;
use crate::body::{decode_body, BodyError, BodyValue};
use crate::field::parse_scalar;
use crate::runtime_config::RuntimeConfig;
use crate::schema::{FieldSpec, RequestSchema, Section};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Bound query or header section: declared field name to decoded value.
///
/// Every declared field has an entry; absent optional fields are `null`.
pub type Record = Map<String, Value>;

/// A request validated against its endpoint's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundRequest<B> {
    pub query: Record,
    pub headers: Record,
    pub body: BodyValue<B>,
}

impl<B> BoundRequest<B> {
    /// Project the query record into a typed struct.
    ///
    /// Optional fields should be `Option<_>` in `Q`; they arrive as `null`.
    pub fn query_as<Q: DeserializeOwned>(&self) -> Result<Q, serde_json::Error> {
        serde_json::from_value(Value::Object(self.query.clone()))
    }

    /// Project the header record into a typed struct.
    pub fn headers_as<H: DeserializeOwned>(&self) -> Result<H, serde_json::Error> {
        serde_json::from_value(Value::Object(self.headers.clone()))
    }

    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&Value> {
        self.query.get(name)
    }

    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&Value> {
        self.headers.get(name)
    }
}

/// Every problem found while binding one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionErrors {
    /// Required fields that were absent
    pub missing: Vec<String>,
    /// Fields whose value did not decode as the declared type
    pub invalid: Vec<String>,
}

impl SectionErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

impl fmt::Display for SectionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .missing
            .iter()
            .map(|n| ("missing", n))
            .chain(self.invalid.iter().map(|n| ("invalid", n)));
        for (i, (kind, name)) in entries.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kind}:{name}")?;
        }
        Ok(())
    }
}

/// The request does not satisfy the endpoint schema.
///
/// Only the first failing section is reported (query, then headers, then
/// body), but within a query or header section every bad field is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    Query(SectionErrors),
    Headers(SectionErrors),
    Body(BodyError),
}

impl BindingError {
    #[must_use]
    pub fn section(&self) -> Section {
        match self {
            BindingError::Query(_) => Section::Query,
            BindingError::Headers(_) => Section::Headers,
            BindingError::Body(_) => Section::Body,
        }
    }

    /// HTTP status this error is answered with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            BindingError::Body(e) => e.status(),
            _ => 400,
        }
    }

    /// Diagnostic payload written to the client.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            BindingError::Query(errors) | BindingError::Headers(errors) => json!({
                "error": "Request binding failed",
                "section": self.section(),
                "missing": errors.missing,
                "invalid": errors.invalid,
            }),
            BindingError::Body(err) => json!({
                "error": "Request binding failed",
                "section": self.section(),
                "message": err.to_string(),
            }),
        }
    }
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::Query(errors) | BindingError::Headers(errors) => {
                write!(f, "{}: {}", self.section(), errors)
            }
            BindingError::Body(err) => write!(f, "body: {err}"),
        }
    }
}

impl std::error::Error for BindingError {}

/// Bind every declared field of one section.
///
/// `lookup` returns the raw value for a field name. All fields are checked
/// before returning, so the error lists every missing and invalid field.
/// An optional field that is present but does not decode is invalid; it is
/// never silently treated as absent.
pub fn bind_section<'a>(
    fields: &[FieldSpec],
    lookup: impl Fn(&str) -> Option<&'a str>,
) -> Result<Record, SectionErrors> {
    let mut record = Record::new();
    let mut errors = SectionErrors::default();

    for field in fields {
        match lookup(&field.name) {
            None if field.required => errors.missing.push(field.name.clone()),
            None => {
                record.insert(field.name.clone(), Value::Null);
            }
            Some(raw) => match parse_scalar(field.scalar, raw) {
                Ok(value) => {
                    record.insert(field.name.clone(), value);
                }
                Err(e) => {
                    debug!(field = %field.name, error = %e, "Field value rejected");
                    errors.invalid.push(field.name.clone());
                }
            },
        }
    }

    if errors.is_empty() {
        Ok(record)
    } else {
        Err(errors)
    }
}

/// Validates raw requests against endpoint schemas.
///
/// Holds no per-request state; one binder can be shared by any number of
/// concurrent requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestBinder {
    max_body_bytes: Option<usize>,
}

impl RequestBinder {
    /// A binder with no body size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Reject payloads larger than `limit` bytes.
    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    #[must_use]
    pub fn max_body_bytes(&self) -> Option<usize> {
        self.max_body_bytes
    }

    /// Bind `raw` against `schema`: query, then headers, then body.
    pub fn bind<B: DeserializeOwned>(
        &self,
        schema: &RequestSchema,
        raw: &RawRequest,
    ) -> Result<BoundRequest<B>, BindingError> {
        let result = self.bind_sections(schema, raw);
        match &result {
            Ok(bound) => debug!(
                path = %raw.path,
                query_fields = bound.query.len(),
                header_fields = bound.headers.len(),
                body_kind = bound.body.tag(),
                "Request bound"
            ),
            Err(err) => match err {
                BindingError::Query(e) | BindingError::Headers(e) => warn!(
                    path = %raw.path,
                    section = %err.section(),
                    missing = ?e.missing,
                    invalid = ?e.invalid,
                    "Request binding failed"
                ),
                BindingError::Body(e) => warn!(
                    path = %raw.path,
                    section = "body",
                    error = %e,
                    "Request binding failed"
                ),
            },
        }
        result
    }

    fn bind_sections<B: DeserializeOwned>(
        &self,
        schema: &RequestSchema,
        raw: &RawRequest,
    ) -> Result<BoundRequest<B>, BindingError> {
        let query = bind_section(&schema.query, |name| raw.query_param(name))
            .map_err(BindingError::Query)?;
        let headers =
            bind_section(&schema.headers, |name| raw.header(name)).map_err(BindingError::Headers)?;
        let body = decode_body(
            &schema.body,
            &raw.headers,
            raw.body.as_deref(),
            self.max_body_bytes,
        )
        .map_err(BindingError::Body)?;

        Ok(BoundRequest {
            query,
            headers,
            body,
        })
    }
}

/// Bind with a default [`RequestBinder`] (no body size limit).
pub fn bind_request<B: DeserializeOwned>(
    schema: &RequestSchema,
    raw: &RawRequest,
) -> Result<BoundRequest<B>, BindingError> {
    RequestBinder::new().bind(schema, raw)
}
