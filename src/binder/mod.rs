//! # Binder Module
//!
//! Validates a [`RawRequest`] against an endpoint's
//! [`RequestSchema`](crate::schema::RequestSchema) and produces a
//! [`BoundRequest`].
//!
//! ## Algorithm
//!
//! Sections are bound in a fixed order: query, headers, body. For every
//! declared query or header field:
//!
//! - **required, absent** → recorded as missing
//! - **present, does not decode** → recorded as invalid (required or optional)
//! - **optional, absent** → bound as `null`
//! - otherwise the decoded value is bound
//!
//! Errors inside a section are accumulated so the client sees every problem
//! in one round trip. The first section that fails stops the binding; errors
//! from different sections are never merged.
//!
//! ```rust
//! use brrtbind::binder::{bind_request, BindingError, RawRequest};
//! use brrtbind::field::ScalarType;
//! use brrtbind::schema::{FieldSpec, RequestSchema};
//! use http::Method;
//!
//! let schema = RequestSchema::builder()
//!     .query(FieldSpec::required("page", ScalarType::Integer))
//!     .query(FieldSpec::optional("limit", ScalarType::Integer))
//!     .build()
//!     .unwrap();
//!
//! let bound = bind_request::<()>(&schema, &RawRequest::new(Method::GET, "/users?page=2")).unwrap();
//! assert_eq!(bound.query["page"], 2);
//! assert!(bound.query["limit"].is_null());
//!
//! let err = bind_request::<()>(&schema, &RawRequest::new(Method::GET, "/users")).unwrap_err();
//! assert!(matches!(err, BindingError::Query(ref e) if e.missing == ["page"]));
//! ```

mod core;
mod request;

pub use self::core::{
    bind_request, bind_section, BindingError, BoundRequest, Record, RequestBinder, SectionErrors,
};
pub use self::request::{parse_query_string, RawRequest};
