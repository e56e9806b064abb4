use chrono::DateTime;
use serde_json::Value;

use super::type_mismatch;
use crate::isdef::IsDef;
use crate::path::Path;
use crate::results::{simple_result, valid_result};

/// An RFC 3339 timestamp string, e.g. `2024-05-01T12:00:00Z`.
pub fn is_timestamp() -> IsDef {
    IsDef::new("is timestamp", |path: &Path, value: &Value| {
        let Some(s) = value.as_str() else {
            return type_mismatch(path, "RFC 3339 timestamp string", value);
        };
        match DateTime::parse_from_rfc3339(s) {
            Ok(_) => valid_result(path.clone()),
            Err(e) => {
                let msg = format!("'{s}' is not an RFC 3339 timestamp: {e}");
                simple_result(path.clone(), false, msg)
            }
        }
    })
}
