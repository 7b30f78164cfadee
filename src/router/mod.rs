//! # Router Module
//!
//! Route matching for the dispatch pipeline.
//!
//! ## Overview
//!
//! The dispatcher never looks at path strings itself. It asks a
//! [`RouteMatcher`] to turn the incoming path into a route value, and treats a
//! [`RouteError`] as "this endpoint does not serve this path" (404 when no
//! endpoint does). Matchers are bidirectional: `print` renders a route back
//! into a path, which is handy for building links and `Location` headers.
//!
//! ## Path Templates
//!
//! [`PathTemplate`] is the bundled matcher. Templates such as `/users/{id}`
//! are compiled once into anchored regex patterns:
//!
//! ```rust
//! use brrtbind::router::{PathTemplate, RouteMatcher};
//!
//! let template = PathTemplate::new("/users/{id}/posts/{post_id}").unwrap();
//! let route = template.parse("/users/7/posts/abc").unwrap();
//! assert_eq!(route.get("id"), Some("7"));
//! assert_eq!(template.print(&route), "/users/7/posts/abc");
//! ```
//!
//! Applications with richer route types (enums, typed ids) implement
//! [`RouteMatcher`] themselves.

mod core;

pub use self::core::{
    ParamVec, PathParams, PathTemplate, RouteError, RouteMatcher, TemplateError,
    MAX_INLINE_PARAMS,
};
