//! Tests for binding raw requests against request schemas
//!
//! # Test Coverage
//!
//! - Required and optional query fields, including the documented policy for
//!   optional fields whose value does not parse
//! - Accumulation of every missing and invalid field in a section
//! - Section order: query errors are reported before header errors
//! - Body negotiation: JSON, absent payloads, no-body endpoints
//! - Defaulting of omitted schema sections

use brrtbind::binder::{bind_request, BindingError, RawRequest, RequestBinder, SectionErrors};
use brrtbind::body::{BodyError, BodyValue};
use brrtbind::field::ScalarType;
use brrtbind::schema::{BodyKind, BodySchema, FieldSpec, RequestSchema, Section};
use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    name: String,
    email: String,
}

fn page_schema() -> RequestSchema {
    RequestSchema::builder()
        .query(FieldSpec::required("page", ScalarType::Integer))
        .query(FieldSpec::optional("limit", ScalarType::Integer))
        .build()
        .unwrap()
}

#[test]
fn test_missing_required_query_field() {
    let schema = RequestSchema::builder()
        .query(FieldSpec::required("page", ScalarType::Integer))
        .build()
        .unwrap();
    let err = bind_request::<()>(&schema, &RawRequest::new(Method::GET, "/items")).unwrap_err();
    assert_eq!(
        err,
        BindingError::Query(SectionErrors {
            missing: vec!["page".to_string()],
            invalid: vec![],
        })
    );
    assert_eq!(err.to_string(), "query: missing:page");
}

#[test]
fn test_optional_absent_is_null() {
    let bound = bind_request::<()>(&page_schema(), &RawRequest::new(Method::GET, "/items?page=2"))
        .unwrap();
    assert_eq!(bound.query_value("page"), Some(&json!(2)));
    assert_eq!(bound.query_value("limit"), Some(&Value::Null));

    #[derive(Deserialize)]
    struct Paging {
        page: i64,
        limit: Option<i64>,
    }
    let paging: Paging = bound.query_as().unwrap();
    assert_eq!(paging.page, 2);
    assert_eq!(paging.limit, None);
}

#[test]
fn test_optional_present_but_invalid_is_an_error() {
    let err = bind_request::<()>(
        &page_schema(),
        &RawRequest::new(Method::GET, "/items?page=2&limit=ten"),
    )
    .unwrap_err();
    match err {
        BindingError::Query(e) => {
            assert!(e.missing.is_empty());
            assert_eq!(e.invalid, vec!["limit"]);
        }
        other => panic!("expected query error, got {other}"),
    }
}

#[test]
fn test_all_problems_in_a_section_are_reported() {
    let schema = RequestSchema::builder()
        .header(FieldSpec::required("x-api-key", ScalarType::String))
        .header(FieldSpec::required("x-tenant", ScalarType::Integer))
        .header(FieldSpec::required("x-dry-run", ScalarType::Boolean))
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::GET, "/")
        .with_header("X-Tenant", "acme")
        .with_header("X-Dry-Run", "yes");
    let err = bind_request::<()>(&schema, &raw).unwrap_err();
    assert_eq!(err.section(), Section::Headers);
    assert_eq!(
        err.to_json(),
        json!({
            "error": "Request binding failed",
            "section": "headers",
            "missing": ["x-api-key"],
            "invalid": ["x-tenant", "x-dry-run"],
        })
    );
}

#[test]
fn test_query_errors_come_before_header_errors() {
    let schema = RequestSchema::builder()
        .query(FieldSpec::required("q", ScalarType::String))
        .header(FieldSpec::required("x-api-key", ScalarType::String))
        .build()
        .unwrap();
    let err = bind_request::<()>(&schema, &RawRequest::new(Method::GET, "/search")).unwrap_err();
    assert_eq!(err.section(), Section::Query);
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let schema = RequestSchema::builder()
        .header(FieldSpec::required("X-Request-Count", ScalarType::Integer))
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::GET, "/").with_header("x-request-count", "3");
    let bound = bind_request::<()>(&schema, &raw).unwrap();
    assert_eq!(bound.header_value("X-Request-Count"), Some(&json!(3)));
}

#[test]
fn test_json_body_is_decoded() {
    let schema = RequestSchema::builder()
        .body(BodySchema::json())
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/users")
        .with_header("content-type", "application/json")
        .with_body(r#"{"name":"Al","email":"a@b.com"}"#);
    let bound = bind_request::<User>(&schema, &raw).unwrap();
    assert_eq!(
        bound.body,
        BodyValue::Json(User {
            name: "Al".to_string(),
            email: "a@b.com".to_string(),
        })
    );
}

#[test]
fn test_absent_optional_body_is_no_body() {
    let schema = RequestSchema::builder()
        .body(BodySchema::json())
        .build()
        .unwrap();
    let bound = bind_request::<User>(&schema, &RawRequest::new(Method::POST, "/users")).unwrap();
    assert_eq!(bound.body, BodyValue::NoBody);
    assert!(bound.body.into_json().is_err());
}

#[test]
fn test_required_body_missing() {
    let schema = RequestSchema::builder()
        .body(BodySchema::json().required())
        .build()
        .unwrap();
    let err = bind_request::<User>(&schema, &RawRequest::new(Method::POST, "/users")).unwrap_err();
    assert_eq!(err, BindingError::Body(BodyError::Required));
    assert_eq!(err.status(), 400);
}

#[test]
fn test_malformed_json_body() {
    let schema = RequestSchema::builder()
        .body(BodySchema::only(BodyKind::Json))
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/users").with_body("{not json");
    let err = bind_request::<Value>(&schema, &raw).unwrap_err();
    assert!(matches!(
        err,
        BindingError::Body(BodyError::Decode {
            kind: BodyKind::Json,
            ..
        })
    ));
    assert!(err.to_json()["message"].as_str().unwrap().starts_with("invalid json body"));
}

#[test]
fn test_unsupported_content_type() {
    let schema = RequestSchema::builder()
        .body(BodySchema::json())
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/upload")
        .with_header("content-type", "image/png")
        .with_body(vec![0x89, 0x50]);
    let err = bind_request::<Value>(&schema, &raw).unwrap_err();
    assert_eq!(
        err,
        BindingError::Body(BodyError::UnsupportedContentType("image/png".to_string()))
    );
}

#[test]
fn test_unrecognised_content_type_falls_back_to_bytes() {
    let schema = RequestSchema::builder()
        .body(BodySchema::any())
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/upload")
        .with_header("content-type", "image/png")
        .with_body(vec![0x89, 0x50]);
    let bound = bind_request::<Value>(&schema, &raw).unwrap();
    assert_eq!(bound.body, BodyValue::Bytes(vec![0x89, 0x50]));
}

#[test]
fn test_no_body_endpoint_ignores_payload() {
    let raw = RawRequest::new(Method::POST, "/ping").with_body("ignored");
    let bound = bind_request::<Value>(&RequestSchema::default(), &raw).unwrap();
    assert_eq!(bound.body, BodyValue::NoBody);
}

#[test]
fn test_body_only_schema_defaults_other_sections() {
    let schema = RequestSchema::builder()
        .body(BodySchema::only(BodyKind::Text))
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/notes?unused=1")
        .with_header("content-type", "text/plain")
        .with_header("x-extra", "whatever")
        .with_body("hello");
    let bound = bind_request::<Value>(&schema, &raw).unwrap();
    assert!(bound.query.is_empty());
    assert!(bound.headers.is_empty());
    assert_eq!(bound.body, BodyValue::Text("hello".to_string()));
}

#[test]
fn test_binder_body_limit() {
    let schema = RequestSchema::builder()
        .body(BodySchema::json())
        .build()
        .unwrap();
    let raw = RawRequest::new(Method::POST, "/users").with_body(r#"{"name":"x"}"#);
    let err = RequestBinder::new()
        .with_max_body_bytes(8)
        .bind::<Value>(&schema, &raw)
        .unwrap_err();
    assert_eq!(err.status(), 413);
    assert!(RequestBinder::new()
        .with_max_body_bytes(64)
        .bind::<Value>(&schema, &raw)
        .is_ok());
}
