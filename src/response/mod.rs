//! # Response Module
//!
//! Turns a handler's [`Response`] into bytes and writes it to the runtime's
//! [`ResponseSink`].
//!
//! Encoding happens completely before the first sink call. If serialization
//! fails, or the status or a header is not valid HTTP, nothing is written and
//! the caller gets an [`EncodeError`]. A half-written response is therefore
//! never observable.
//!
//! ```rust
//! use brrtbind::response::{encode_response, BufferedSink, Response};
//! use serde_json::json;
//!
//! let mut sink = BufferedSink::new();
//! encode_response(Response::created(json!({"id": 7})).with_header("location", "/users/7"))
//!     .unwrap()
//!     .write_to(&mut sink);
//! assert_eq!(sink.status, Some(201));
//! assert_eq!(sink.header("location"), Some("/users/7"));
//! ```

mod core;

pub use self::core::{
    encode_response, BufferedSink, EncodeError, EncodedResponse, HeaderVec, Response,
    ResponseSink, MAX_INLINE_HEADERS,
};
