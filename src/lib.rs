//! # brrtbind
//!
//! **brrtbind** is a schema-driven request binding and dispatch pipeline. It
//! sits between an HTTP runtime and endpoint business logic: the runtime hands
//! it a raw request and a response sink, and handlers receive typed, already
//! validated input.
//!
//! ## Overview
//!
//! Each endpoint declares what it consumes in a [`schema::RequestSchema`]:
//! query parameters and headers (each a name, a scalar type and a required
//! flag) plus the body encodings it accepts. The pipeline then:
//!
//! 1. matches the path with a [`router::RouteMatcher`] (no match: `404`)
//! 2. binds query, headers and body against the schema, collecting every
//!    missing or invalid field in a section (failure: `400` with a JSON
//!    diagnostic, handler not called)
//! 3. calls the [`dispatcher::Handler`] with the typed route and bound request
//! 4. encodes the handler's [`response::Response`] and writes it, unless the
//!    client has gone away
//!
//! ## Architecture
//!
//! - **[`field`]** - Scalar types and decoding of raw strings into them
//! - **[`schema`]** - Request schemas and endpoint files
//! - **[`router`]** - Bidirectional route matching (`parse` and `print`)
//! - **[`body`]** - Content-type classification and body decoding
//! - **[`binder`]** - Raw requests and binding them against a schema
//! - **[`response`]** - Response encoding and the runtime's write interface
//! - **[`dispatcher`]** - Endpoints and the request pipeline
//! - **[`echo`]** - Handler that answers with the bound request
//! - **[`runtime_config`]** - Environment-driven pipeline settings
//! - **[`logging`]** - Structured logging setup
//! - **[`validator`]** - Issues found in endpoint files
//! - **[`cli`]** - The `brrtbind` command
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtbind::binder::{BoundRequest, RawRequest};
//! use brrtbind::dispatcher::{handler_fn, DispatchOutcome, Endpoint};
//! use brrtbind::field::ScalarType;
//! use brrtbind::response::{BufferedSink, Response};
//! use brrtbind::router::{PathParams, PathTemplate};
//! use brrtbind::schema::{BodySchema, FieldSpec, RequestSchema};
//! use http::Method;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct NewUser {
//!     name: String,
//! }
//!
//! let schema = RequestSchema::builder()
//!     .header(FieldSpec::required("x-api-key", ScalarType::String))
//!     .body(BodySchema::json().required())
//!     .build()
//!     .unwrap();
//!
//! let endpoint = Endpoint::new(
//!     "create_user",
//!     PathTemplate::new("/users").unwrap(),
//!     schema,
//!     handler_fn(|_: PathParams, req: BoundRequest<NewUser>| {
//!         let user = req.body.into_json()?;
//!         Ok(Response::created(json!({ "name": user.name })))
//!     }),
//! )
//! .with_method(Method::POST);
//!
//! let raw = RawRequest::new(Method::POST, "/users")
//!     .with_header("X-Api-Key", "secret")
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"name":"ada"}"#);
//!
//! let mut sink = BufferedSink::new();
//! let outcome = endpoint.dispatch(&raw, &mut sink).unwrap();
//! assert_eq!(outcome, DispatchOutcome::Responded { status: 201 });
//! assert_eq!(sink.body_json().unwrap(), json!({ "name": "ada" }));
//! ```
//!
//! ## Configuration
//!
//! Runtime behaviour is configured through `BRRTB_*` environment variables;
//! see [`runtime_config`] and [`logging`].

pub mod binder;
pub mod body;
pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod field;
pub mod ids;
pub mod logging;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod validator;

pub use binder::{bind_request, BindingError, BoundRequest, RawRequest, RequestBinder};
pub use body::BodyValue;
pub use dispatcher::{handler_fn, DispatchError, DispatchOutcome, Dispatcher, Endpoint, Handler};
pub use response::{Response, ResponseSink};
pub use router::{PathParams, PathTemplate, RouteMatcher};
pub use schema::{load_endpoints, BodyKind, BodySchema, FieldSpec, RequestSchema};
