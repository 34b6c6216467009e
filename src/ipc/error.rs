use crate::error::EngineError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Details carried alongside an engine error's code and message.
pub fn engine_details(e: &EngineError) -> Option<serde_json::Value> {
    match e {
        EngineError::Validation { errors } => Some(json!({ "errors": errors })),
        EngineError::NotFound { entity, key } => Some(json!({ "entity": entity, "key": key })),
        EngineError::Conflict { .. } | EngineError::Storage(_) => None,
    }
}
