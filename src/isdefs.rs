//! Built-in leaf definitions.
//!
//! Each constructor returns an [`IsDef`] ready to be dropped into a schema.
//! Type-specific families live in submodules and are re-exported here.
pub mod arr;
pub mod num;
pub mod str;
pub mod time;

use serde_json::{Number, Value};

use crate::isdef::IsDef;
use crate::path::Path;
use crate::results::{simple_result, valid_result, Results};

pub use arr::{is_array_len, is_array_of};
pub use num::{is_float, is_int, is_int_gt, is_int_lt, is_number, is_number_between};
pub use str::{
    is_non_empty_string, is_string, is_string_containing, is_string_matching,
    is_string_matching_pattern, is_string_with_prefix,
};
pub use time::is_timestamp;

// ------------------------------ Presence --------------------------------- //

/// The key must exist; its value may be anything, `null` included.
pub fn key_present() -> IsDef {
    IsDef::presence("check key present")
}

/// The key must not exist.
pub fn key_missing() -> IsDef {
    IsDef {
        check_key_missing: true,
        ..IsDef::presence("check key not present")
    }
}

/// Same check, but a missing key is not an error.
pub fn optional(def: IsDef) -> IsDef {
    def.optional()
}

pub fn is_any() -> IsDef {
    IsDef::presence("any value")
}

// ------------------------------- Generic --------------------------------- //

/// Wrap an arbitrary checker under a diagnostic name.
pub fn is<F>(name: &'static str, checker: F) -> IsDef
where
    F: Fn(&Path, &Value) -> Results + Send + Sync + 'static,
{
    IsDef::new(name, checker)
}

/// Deep equality. Numbers compare by numeric value, so `1` equals `1.0`.
pub fn is_equal(expected: Value) -> IsDef {
    IsDef::new("is equal", move |path: &Path, actual: &Value| {
        if values_equal(actual, &expected) {
            valid_result(path.clone())
        } else {
            simple_result(
                path.clone(),
                false,
                format!("objects not equal: actual({actual}) != expected({expected})"),
            )
        }
    })
}

pub fn is_null() -> IsDef {
    type_check("is null", "null", Value::is_null)
}

pub fn is_bool() -> IsDef {
    type_check("is bool", "bool", Value::is_boolean)
}

pub fn is_object() -> IsDef {
    type_check("is object", "object", Value::is_object)
}

/// Passes when any alternative passes. On failure, every alternative's
/// messages are listed in a single outcome at this path.
pub fn is_any_of(alternatives: Vec<IsDef>) -> IsDef {
    IsDef::new("is any of", move |path: &Path, value: &Value| {
        let mut reasons = Vec::with_capacity(alternatives.len());
        for alt in &alternatives {
            let r = alt.check(path, value, true);
            if r.is_valid() {
                return r;
            }
            let msgs: Vec<&str> = r
                .iter()
                .filter(|(_, vr)| !vr.is_valid())
                .map(|(_, vr)| vr.message())
                .collect();
            reasons.push(format!("{}: {}", alt.name, msgs.join(", ")));
        }
        simple_result(
            path.clone(),
            false,
            format!("did not match any alternative [{}]", reasons.join("; ")),
        )
    })
}

// ------------------------------- Helpers --------------------------------- //

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn type_mismatch(path: &Path, expected: &str, actual: &Value) -> Results {
    simple_result(
        path.clone(),
        false,
        format!("expected {expected}, got {} ({actual})", type_name(actual)),
    )
}

fn type_check(name: &'static str, expected: &'static str, pred: fn(&Value) -> bool) -> IsDef {
    IsDef::new(name, move |path: &Path, value: &Value| {
        if pred(value) {
            valid_result(path.clone())
        } else {
            type_mismatch(path, expected, value)
        }
    })
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm.iter().all(|(k, x)| ym.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// ------------------------------- Tests ------------------------------------ //
