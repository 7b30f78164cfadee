//! Echo handler: answers with the request as the pipeline bound it.
//!
//! Useful for trying out a schema (the CLI `bind` command wires every
//! endpoint to it) and as a stand-in handler in tests.

use crate::binder::BoundRequest;
use crate::body::BodyValue;
use crate::response::Response;
use crate::router::PathParams;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Map, Value};

/// JSON rendering of a decoded body: `{"kind": <tag>, "value": <payload>}`.
///
/// Byte payloads are base64-encoded; `NoBody` renders as `{"kind": "none"}`.
#[must_use]
pub fn body_to_json(body: &BodyValue<Value>) -> Value {
    let value = match body {
        BodyValue::Json(v) => v.clone(),
        BodyValue::NoBody => return json!({ "kind": "none" }),
        BodyValue::Form(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<Map<_, _>>(),
        ),
        BodyValue::Text(s) => Value::String(s.clone()),
        BodyValue::Bytes(b) => Value::String(STANDARD.encode(b)),
    };
    json!({ "kind": body.tag(), "value": value })
}

/// Return path parameters, bound query, headers and body as JSON.
pub fn echo_handler(
    route: PathParams,
    request: BoundRequest<Value>,
) -> anyhow::Result<Response<Value>> {
    let path_params: Map<String, Value> = route
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    Ok(Response::ok(json!({
        "path_params": path_params,
        "query": request.query,
        "headers": request.headers,
        "body": body_to_json(&request.body),
    })))
}
