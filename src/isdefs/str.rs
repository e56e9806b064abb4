use regex::Regex;
use serde_json::Value;

use super::type_mismatch;
use crate::error::Result;
use crate::isdef::IsDef;
use crate::path::Path;
use crate::results::{simple_result, valid_result, Results};

fn check_str(path: &Path, value: &Value, f: impl FnOnce(&str) -> Results) -> Results {
    match value.as_str() {
        Some(s) => f(s),
        None => type_mismatch(path, "string", value),
    }
}

pub fn is_string() -> IsDef {
    IsDef::new("is string", |path: &Path, value: &Value| {
        check_str(path, value, |_| valid_result(path.clone()))
    })
}

pub fn is_non_empty_string() -> IsDef {
    IsDef::new("is non-empty string", |path: &Path, value: &Value| {
        check_str(path, value, |s| {
            if s.is_empty() {
                simple_result(path.clone(), false, "string should not be empty")
            } else {
                valid_result(path.clone())
            }
        })
    })
}

pub fn is_string_containing(needle: impl Into<String>) -> IsDef {
    let needle = needle.into();
    IsDef::new("is string containing", move |path: &Path, value: &Value| {
        check_str(path, value, |s| {
            if s.contains(needle.as_str()) {
                valid_result(path.clone())
            } else {
                let msg = format!("string '{s}' does not contain '{needle}'");
                simple_result(path.clone(), false, msg)
            }
        })
    })
}

pub fn is_string_with_prefix(prefix: impl Into<String>) -> IsDef {
    let prefix = prefix.into();
    IsDef::new("is string with prefix", move |path: &Path, value: &Value| {
        check_str(path, value, |s| {
            if s.starts_with(prefix.as_str()) {
                valid_result(path.clone())
            } else {
                let msg = format!("string '{s}' does not start with '{prefix}'");
                simple_result(path.clone(), false, msg)
            }
        })
    })
}

pub fn is_string_matching(regex: Regex) -> IsDef {
    IsDef::new("is string matching", move |path: &Path, value: &Value| {
        check_str(path, value, |s| {
            if regex.is_match(s) {
                valid_result(path.clone())
            } else {
                let msg = format!("string '{s}' did not match regex /{regex}/");
                simple_result(path.clone(), false, msg)
            }
        })
    })
}

/// Like [`is_string_matching`], compiling the pattern first.
pub fn is_string_matching_pattern(pattern: &str) -> Result<IsDef> {
    Ok(is_string_matching(Regex::new(pattern)?))
}
