//! Tests for loading endpoint files from disk
//!
//! # Test Coverage
//!
//! - YAML and JSON endpoint files
//! - Lint failures listing every issue
//! - Unreadable and unparseable files
//! - Dispatching against endpoints loaded from a file

use brrtbind::binder::RawRequest;
use brrtbind::cli::echo_dispatcher;
use brrtbind::dispatcher::DispatchOutcome;
use brrtbind::response::BufferedSink;
use brrtbind::runtime_config::RuntimeConfig;
use brrtbind::schema::{load_endpoints, BodyKind};
use http::Method;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

const YAML: &str = r#"
endpoints:
  - name: search
    method: GET
    path: /search
    schema:
      query:
        - { name: q, type: string }
        - { name: page, type: integer, required: false }
  - name: upload
    method: PUT
    path: /files/{name}
    schema:
      body: { accept: [bytes], required: true }
"#;

#[test]
fn test_load_yaml() {
    let file = write_file(".yaml", YAML);
    let endpoints = load_endpoints(file.path()).unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].name, "search");
    assert_eq!(endpoints[0].schema.query.len(), 2);
    assert!(endpoints[1].schema.body.required);
    assert!(endpoints[1].schema.body.accepts(BodyKind::Bytes));
}

#[test]
fn test_load_json() {
    let file = write_file(
        ".json",
        r#"{"endpoints":[{"name":"health","method":"GET","path":"/health"}]}"#,
    );
    let endpoints = load_endpoints(file.path()).unwrap();
    assert_eq!(endpoints.len(), 1);
    assert!(endpoints[0].schema.query.is_empty());
    assert!(endpoints[0].schema.body.is_none());
}

#[test]
fn test_lint_failure_lists_every_issue() {
    let file = write_file(
        ".yaml",
        r#"
endpoints:
  - { name: a, method: GET, path: /a }
  - { name: a, method: GET, path: /b }
  - { name: c, method: YEET, path: c }
"#,
    );
    let message = format!("{:#}", load_endpoints(file.path()).unwrap_err());
    assert!(message.contains("3 issue(s)"));
    assert!(message.contains("duplicate_name"));
    assert!(message.contains("unknown_method"));
    assert!(message.contains("bad_path"));
}

#[test]
fn test_missing_file() {
    let err = load_endpoints(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read endpoint file"));
}

#[test]
fn test_malformed_file() {
    let file = write_file(".json", "{ not json");
    let err = load_endpoints(file.path()).unwrap_err();
    assert!(err.to_string().contains("failed to parse endpoint file"));
}

#[test]
fn test_loaded_endpoints_dispatch() {
    let file = write_file(".yaml", YAML);
    let endpoints = load_endpoints(file.path()).unwrap();
    let dispatcher = echo_dispatcher(&endpoints, RuntimeConfig::default()).unwrap();
    assert_eq!(dispatcher.len(), 2);

    let mut sink = BufferedSink::new();
    let outcome = dispatcher
        .dispatch(&RawRequest::new(Method::GET, "/search?q=rust"), &mut sink)
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Responded { status: 200 });
    let body = sink.body_json().unwrap();
    assert_eq!(body["query"], json!({"q": "rust", "page": null}));

    let mut sink = BufferedSink::new();
    let raw = RawRequest::new(Method::PUT, "/files/a%20b.bin")
        .with_header("content-type", "application/octet-stream")
        .with_body(vec![1, 2, 3]);
    dispatcher.dispatch(&raw, &mut sink).unwrap();
    let body = sink.body_json().unwrap();
    assert_eq!(body["path_params"], json!({"name": "a b.bin"}));
    assert_eq!(body["body"], json!({"kind": "bytes", "value": "AQID"}));
}
