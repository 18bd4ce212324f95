use crate::TargetError;
use serde_json::{Value, json};

/// Stable failure codes carried in every failure envelope.
pub mod codes {
    pub const INVALID_IDENTIFIER: &str = "INVALID_IDENTIFIER";
    pub const NO_MATCH: &str = "NO_MATCH";
    pub const NO_CONFIDENT_MATCH: &str = "NO_CONFIDENT_MATCH";
    pub const AUTOMATION_UNAVAILABLE: &str = "AUTOMATION_UNAVAILABLE";
    pub const CATALOG_ERROR: &str = "CATALOG_ERROR";
    pub const INVALID_PARAMS: &str = "INVALID_PARAMS";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Success envelope. Every tool in this crate emits either this shape or
/// [`failure`]'s; callers branch on the `success` flag alone.
pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data,
    })
}

/// Success envelope with a short human-readable summary line.
pub fn success_with_summary(data: Value, summary: &str) -> Value {
    json!({
        "success": true,
        "data": data,
        "summary": summary,
    })
}

pub fn failure(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "error": {
            "code": code,
            "message": message,
        }
    })
}

pub fn failure_with_details(code: &str, message: &str, details: Value) -> Value {
    json!({
        "success": false,
        "error": {
            "code": code,
            "message": message,
            "details": details,
        }
    })
}

/// Maps a crate error onto its envelope, attaching the diagnostic payload
/// each kind calls for: `NoMatch` echoes the filters back, and
/// `NoConfidentMatch` reports the best score achieved.
pub fn from_error(error: &TargetError) -> Value {
    match error {
        TargetError::InvalidIdentifier(id) => failure_with_details(
            codes::INVALID_IDENTIFIER,
            &error.to_string(),
            json!({ "device_id": id }),
        ),
        TargetError::NoMatch { name, runtime } => failure_with_details(
            codes::NO_MATCH,
            &error.to_string(),
            json!({ "name": name, "runtime": runtime }),
        ),
        TargetError::NoConfidentMatch { best_score } => failure_with_details(
            codes::NO_CONFIDENT_MATCH,
            &error.to_string(),
            json!({ "best_score": best_score }),
        ),
        TargetError::AutomationUnavailable(_) => {
            failure(codes::AUTOMATION_UNAVAILABLE, &error.to_string())
        }
        TargetError::Catalog(_) => failure(codes::CATALOG_ERROR, &error.to_string()),
        _ => failure(codes::INTERNAL_ERROR, &error.to_string()),
    }
}
