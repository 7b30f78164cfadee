use super::types::RequestSchema;
use crate::router::{PathTemplate, TemplateError};
use crate::validator::{fail_if_issues, ValidationIssue};
use anyhow::Context;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Methods an endpoint definition may name.
pub const METHODS: [&str; 8] = [
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
];

/// One endpoint as written in an endpoint file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointDef {
    pub name: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub schema: RequestSchema,
}

impl EndpointDef {
    /// The declared method, if it is one of [`METHODS`] (case-insensitive).
    #[must_use]
    pub fn http_method(&self) -> Option<Method> {
        let upper = self.method.trim().to_ascii_uppercase();
        if !METHODS.contains(&upper.as_str()) {
            return None;
        }
        Method::from_bytes(upper.as_bytes()).ok()
    }

    pub fn path_template(&self) -> Result<PathTemplate, TemplateError> {
        PathTemplate::new(&self.path)
    }
}

/// Top level of an endpoint file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointFile {
    pub endpoints: Vec<EndpointDef>,
}

/// Parse endpoint definitions from YAML (a superset of JSON) without linting.
pub fn parse_endpoints(content: &str) -> anyhow::Result<Vec<EndpointDef>> {
    let file: EndpointFile = serde_yaml::from_str(content)?;
    Ok(file.endpoints)
}

/// Load and lint an endpoint file (`.yaml`, `.yml` or `.json`).
///
/// Fails if the file cannot be read or parsed, or if linting finds any
/// issue; the error then lists every issue.
pub fn load_endpoints(path: &Path) -> anyhow::Result<Vec<EndpointDef>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read endpoint file {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let endpoints = if is_yaml {
        parse_endpoints(&content)
    } else {
        serde_json::from_str::<EndpointFile>(&content)
            .map(|f| f.endpoints)
            .map_err(anyhow::Error::from)
    }
    .with_context(|| format!("failed to parse endpoint file {}", path.display()))?;

    fail_if_issues(&lint_endpoints(&endpoints))?;
    info!(
        file = %path.display(),
        endpoint_count = endpoints.len(),
        "Endpoint file loaded"
    );
    Ok(endpoints)
}

/// Check endpoint definitions and collect every problem found.
///
/// Reports empty or duplicate names, unknown methods, path templates that do
/// not compile, and schemas that break their invariants.
#[must_use]
pub fn lint_endpoints(endpoints: &[EndpointDef]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut names = HashSet::with_capacity(endpoints.len());

    for (i, def) in endpoints.iter().enumerate() {
        let at = |field: &str| format!("endpoints[{i}].{field}");

        if def.name.trim().is_empty() {
            issues.push(ValidationIssue::new(at("name"), "empty_name", "endpoint name is empty"));
        } else if !names.insert(def.name.as_str()) {
            issues.push(ValidationIssue::new(
                at("name"),
                "duplicate_name",
                format!("`{}` is already defined", def.name),
            ));
        }

        if def.http_method().is_none() {
            issues.push(ValidationIssue::new(
                at("method"),
                "unknown_method",
                format!("`{}` is not one of {}", def.method, METHODS.join(", ")),
            ));
        }

        if let Err(e) = def.path_template() {
            issues.push(ValidationIssue::new(at("path"), "bad_path", e.to_string()));
        }

        if let Err(e) = def.schema.validate() {
            issues.push(ValidationIssue::new(at("schema"), "bad_schema", e.to_string()));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ScalarType;
    use crate::schema::BodyKind;

    const SAMPLE: &str = r#"
endpoints:
  - name: list_items
    method: get
    path: /items
    schema:
      query:
        - { name: page, type: integer }
        - { name: verbose, type: boolean, required: false }
  - name: create_item
    method: POST
    path: /items
    schema:
      body: { accept: [json], required: true }
"#;

    #[test]
    fn test_parse_sample() {
        let defs = parse_endpoints(SAMPLE).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].http_method(), Some(Method::GET));
        assert_eq!(defs[0].schema.query[0].scalar, ScalarType::Integer);
        assert!(defs[0].schema.query[0].required);
        assert!(!defs[0].schema.query[1].required);
        assert!(defs[0].schema.body.is_none());
        assert!(defs[1].schema.body.accepts(BodyKind::Json));
        assert!(lint_endpoints(&defs).is_empty());
    }

    #[test]
    fn test_lint_collects_all_issues() {
        let defs = parse_endpoints(
            r#"
endpoints:
  - { name: a, method: FETCH, path: /a }
  - { name: a, method: GET, path: "a/{}" }
  - name: ""
    method: GET
    path: /c
    schema:
      query: [{ name: x, type: string }, { name: x, type: string }]
"#,
        )
        .unwrap();
        let issues = lint_endpoints(&defs);
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["unknown_method", "duplicate_name", "bad_path", "empty_name", "bad_schema"]
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = parse_endpoints("endpoints:\n  - { name: a, method: GET, path: /a, verb: GET }\n");
        assert!(err.is_err());
    }
}
