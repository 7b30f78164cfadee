//! # Dispatcher Module
//!
//! The dispatcher runs the request pipeline: route matching, binding, the
//! handler, and response encoding, in that order.
//!
//! ## Overview
//!
//! An [`Endpoint`] ties together one [`RouteMatcher`](crate::router::RouteMatcher),
//! one [`RequestSchema`](crate::schema::RequestSchema) and one [`Handler`].
//! A [`Dispatcher`] holds many endpoints and tries them in registration order.
//!
//! ## Request Flow
//!
//! 1. Method filter and route matcher are checked; no match gives `404 Not Found`
//! 2. The binder validates query, headers and body against the schema; a
//!    failure gives `400 Bad Request` (or `413` for an oversized payload) with
//!    a JSON diagnostic, and the handler is never called
//! 3. The handler runs with the typed route and the bound request
//! 4. If the client is still connected the response is encoded and written
//!
//! ## Error Handling
//!
//! Handler errors are not turned into responses. They are returned to the
//! caller as [`DispatchError::Handler`] so the HTTP runtime decides what a
//! failure looks like. Encoding failures come back as [`DispatchError::Encode`]
//! with nothing written to the sink.
//!
//! ## Example
//!
//! ```rust
//! use brrtbind::binder::{BoundRequest, RawRequest};
//! use brrtbind::dispatcher::{handler_fn, DispatchOutcome, Dispatcher, Endpoint};
//! use brrtbind::field::ScalarType;
//! use brrtbind::response::{BufferedSink, Response};
//! use brrtbind::router::{PathParams, PathTemplate};
//! use brrtbind::schema::{FieldSpec, RequestSchema};
//! use http::Method;
//! use serde_json::json;
//!
//! let schema = RequestSchema::builder()
//!     .query(FieldSpec::required("verbose", ScalarType::Boolean))
//!     .build()
//!     .unwrap();
//! let handler = handler_fn(|route: PathParams, req: BoundRequest<()>| {
//!     Ok(Response::ok(json!({
//!         "id": route.get("id"),
//!         "verbose": req.query_value("verbose"),
//!     })))
//! });
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.register(
//!     Endpoint::new("get_user", PathTemplate::new("/users/{id}").unwrap(), schema, handler)
//!         .with_method(Method::GET),
//! );
//!
//! let mut sink = BufferedSink::new();
//! let raw = RawRequest::new(Method::GET, "/users/42?verbose=true");
//! let outcome = dispatcher.dispatch(&raw, &mut sink).unwrap();
//! assert_eq!(outcome, DispatchOutcome::Responded { status: 200 });
//! assert_eq!(sink.body_json().unwrap(), json!({"id": "42", "verbose": true}));
//! ```

mod core;

pub use self::core::{
    handler_fn, DispatchError, DispatchOutcome, Dispatcher, Endpoint, EndpointService, Handler,
    HandlerFn,
};
