use crate::field::ScalarType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One of the request parts a schema can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Query,
    Headers,
    Body,
}

impl Section {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Query => "query",
            Section::Headers => "headers",
            Section::Body => "body",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_required() -> bool {
    true
}

/// Declaration of a single query parameter or header.
///
/// Fields are required unless declared otherwise. In YAML:
///
/// ```yaml
/// - { name: page, type: integer }
/// - { name: limit, type: integer, required: false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub scalar: ScalarType,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be present and valid.
    #[must_use]
    pub fn required(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            required: true,
        }
    }

    /// A field that binds to `null` when absent.
    #[must_use]
    pub fn optional(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self {
            name: name.into(),
            scalar,
            required: false,
        }
    }
}

/// Physical encoding a request body may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Json,
    Form,
    Text,
    Bytes,
}

impl BodyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Json => "json",
            BodyKind::Form => "form",
            BodyKind::Text => "text",
            BodyKind::Bytes => "bytes",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body declaration of an endpoint.
///
/// An empty `accept` list is the "no body" declaration: any payload the client
/// sends is ignored. That is also the default when the section is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodySchema {
    #[serde(default)]
    pub accept: Vec<BodyKind>,
    #[serde(default)]
    pub required: bool,
}

impl BodySchema {
    /// No body: payloads are ignored.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// JSON body that may also arrive as a form or plain text.
    #[must_use]
    pub fn json() -> Self {
        Self {
            accept: vec![BodyKind::Json, BodyKind::Form, BodyKind::Text],
            required: false,
        }
    }

    /// Every encoding, with unrecognised content types kept as raw bytes.
    #[must_use]
    pub fn any() -> Self {
        Self {
            accept: vec![
                BodyKind::Json,
                BodyKind::Form,
                BodyKind::Text,
                BodyKind::Bytes,
            ],
            required: false,
        }
    }

    /// Accept exactly one encoding.
    #[must_use]
    pub fn only(kind: BodyKind) -> Self {
        Self {
            accept: vec![kind],
            required: false,
        }
    }

    /// Mark the body as required: an absent payload becomes a binding error.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Also accept `kind`.
    #[must_use]
    pub fn with(mut self, kind: BodyKind) -> Self {
        if !self.accept.contains(&kind) {
            self.accept.push(kind);
        }
        self
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.accept.is_empty()
    }

    #[must_use]
    pub fn accepts(&self, kind: BodyKind) -> bool {
        self.accept.contains(&kind)
    }
}

/// Static description of what an endpoint consumes.
///
/// Omitted sections are empty: no query fields, no header fields, no body.
/// Build one with [`RequestSchema::builder`] or deserialize it from a schema
/// file; either way call [`RequestSchema::validate`] before serving with it
/// (the builder and the loader both do).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSchema {
    #[serde(default)]
    pub query: Vec<FieldSpec>,
    #[serde(default)]
    pub headers: Vec<FieldSpec>,
    #[serde(default)]
    pub body: BodySchema,
}

impl RequestSchema {
    #[must_use]
    pub fn builder() -> RequestSchemaBuilder {
        RequestSchemaBuilder::default()
    }

    /// Check the schema invariants.
    ///
    /// Field names must be non-empty and unique within a section (header names
    /// compared case-insensitively), and a required body must accept at least
    /// one encoding.
    pub fn validate(&self) -> Result<(), SchemaError> {
        check_fields(Section::Query, &self.query, |n| n.to_string())?;
        check_fields(Section::Headers, &self.headers, |n| n.to_ascii_lowercase())?;
        if self.body.required && self.body.is_none() {
            return Err(SchemaError::RequiredBodyWithoutEncoding);
        }
        Ok(())
    }

    /// Fields declared for `section`; empty for [`Section::Body`].
    #[must_use]
    pub fn fields(&self, section: Section) -> &[FieldSpec] {
        match section {
            Section::Query => &self.query,
            Section::Headers => &self.headers,
            Section::Body => &[],
        }
    }
}

fn check_fields(
    section: Section,
    fields: &[FieldSpec],
    key: impl Fn(&str) -> String,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(SchemaError::EmptyFieldName { section });
        }
        if !seen.insert(key(&field.name)) {
            return Err(SchemaError::DuplicateField {
                section,
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}

/// Builder for [`RequestSchema`].
#[derive(Debug, Default)]
pub struct RequestSchemaBuilder {
    schema: RequestSchema,
}

impl RequestSchemaBuilder {
    #[must_use]
    pub fn query(mut self, field: FieldSpec) -> Self {
        self.schema.query.push(field);
        self
    }

    #[must_use]
    pub fn header(mut self, field: FieldSpec) -> Self {
        self.schema.headers.push(field);
        self
    }

    #[must_use]
    pub fn body(mut self, body: BodySchema) -> Self {
        self.schema.body = body;
        self
    }

    pub fn build(self) -> Result<RequestSchema, SchemaError> {
        self.schema.validate()?;
        Ok(self.schema)
    }
}

/// A schema violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields in one section share a name
    DuplicateField { section: Section, name: String },
    /// A field was declared with an empty name
    EmptyFieldName { section: Section },
    /// The body is required but no encoding is accepted
    RequiredBodyWithoutEncoding,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateField { section, name } => {
                write!(f, "duplicate {section} field `{name}`")
            }
            SchemaError::EmptyFieldName { section } => {
                write!(f, "{section} field with an empty name")
            }
            SchemaError::RequiredBodyWithoutEncoding => {
                write!(f, "body is required but accepts no encoding")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
