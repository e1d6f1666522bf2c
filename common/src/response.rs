//! JSON envelopes handed back to the surrounding application.
//!
//! Success: `{"success": true, "data": ...}`.
//! Validation failure:
//! `{"success": false, "error": "Validation error", "details": {"<field>": ["<message>"]}, "error_code": "VALIDATION_ERROR"}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const VALIDATION_ERROR_CODE: &str = "VALIDATION_ERROR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

pub fn success_response<T: Serialize>(data: T) -> SuccessResponse<T> {
    SuccessResponse {
        success: true,
        data,
    }
}

pub fn validation_error_response(err: &ValidationError) -> ErrorResponse {
    let mut details = BTreeMap::new();
    details.insert(err.field.to_string(), vec![err.message.clone()]);

    ErrorResponse {
        success: false,
        error: "Validation error".to_string(),
        details: Some(details),
        error_code: Some(VALIDATION_ERROR_CODE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Field;
    use serde_json::json;

    #[test]
    fn validation_envelope() {
        let err = ValidationError::new(Field::Targets, "Provide at least one IP/hostname or range");
        assert_eq!(
            serde_json::to_value(validation_error_response(&err)).unwrap(),
            json!({
                "success": false,
                "error": "Validation error",
                "details": { "targets": ["Provide at least one IP/hostname or range"] },
                "error_code": "VALIDATION_ERROR"
            })
        );
    }

    #[test]
    fn success_envelope_wraps_data() {
        let value = serde_json::to_value(success_response(json!({ "k": 1 }))).unwrap();
        assert_eq!(value, json!({ "success": true, "data": { "k": 1 } }));
    }
}
