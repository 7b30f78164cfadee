//! # Body Module
//!
//! Content negotiation for request payloads.
//!
//! ## Overview
//!
//! One endpoint can accept several physical encodings of the same logical
//! resource. [`decode_body`] looks at the `content-type` header and the
//! endpoint's [`BodySchema`](crate::schema::BodySchema) and produces a tagged
//! [`BodyValue`]:
//!
//! | content-type                          | result                         |
//! |---------------------------------------|--------------------------------|
//! | missing, `application/json`, `*+json` | `Json(T)` via `serde_json`     |
//! | `application/x-www-form-urlencoded`   | `Form(HashMap<String,String>)` |
//! | `text/plain`                          | `Text(String)`                 |
//! | anything else                         | `Bytes(Vec<u8>)` if accepted   |
//!
//! An absent payload is `NoBody` (or [`BodyError::Required`] when the schema
//! requires a body). An endpoint declared without a body ignores whatever the
//! client sent.
//!
//! Handlers match on the tag. Where only JSON makes sense,
//! [`BodyValue::into_json`] is the catch-all arm: any other tag comes back as
//! an [`UnexpectedBody`] error, which is an internal defect rather than a
//! client error since the schema should not have accepted it.

mod core;

pub use self::core::{
    classify_content_type, decode_body, BodyError, BodyValue, ContentType, UnexpectedBody,
};
