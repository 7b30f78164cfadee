//! # Schema Module
//!
//! Static declarations of what an endpoint consumes, and loading them from
//! endpoint files.
//!
//! A [`RequestSchema`] has three sections. `query` and `headers` are lists of
//! [`FieldSpec`]s (name, scalar type, required flag); `body` is a
//! [`BodySchema`] listing the encodings the endpoint accepts. Omitting a
//! section is the same as declaring it empty.
//!
//! ## Endpoint Files
//!
//! Endpoints can be described in YAML or JSON:
//!
//! ```yaml
//! endpoints:
//!   - name: search
//!     method: GET
//!     path: /search
//!     schema:
//!       query:
//!         - { name: q, type: string }
//!         - { name: page, type: integer, required: false }
//!       headers:
//!         - { name: x-api-key, type: string }
//!   - name: create_user
//!     method: POST
//!     path: /users
//!     schema:
//!       body: { accept: [json, form], required: true }
//! ```
//!
//! [`load_endpoints`] reads such a file and runs [`lint_endpoints`] over it,
//! failing with every issue found rather than stopping at the first one.

mod load;
mod types;

pub use self::load::{
    lint_endpoints, load_endpoints, parse_endpoints, EndpointDef, EndpointFile, METHODS,
};
pub use self::types::{
    BodyKind, BodySchema, FieldSpec, RequestSchema, RequestSchemaBuilder, SchemaError, Section,
};
