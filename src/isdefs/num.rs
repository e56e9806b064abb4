use serde_json::Value;

use super::type_mismatch;
use crate::isdef::IsDef;
use crate::path::Path;
use crate::results::{simple_result, valid_result, Results};

fn as_int(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

fn check_int(path: &Path, value: &Value, f: impl FnOnce(i128) -> Results) -> Results {
    match as_int(value) {
        Some(n) => f(n),
        None => type_mismatch(path, "integer", value),
    }
}

pub fn is_number() -> IsDef {
    IsDef::new("is number", |path: &Path, value: &Value| {
        if value.is_number() {
            valid_result(path.clone())
        } else {
            type_mismatch(path, "number", value)
        }
    })
}

pub fn is_int() -> IsDef {
    IsDef::new("is int", |path: &Path, value: &Value| {
        check_int(path, value, |_| valid_result(path.clone()))
    })
}

/// A number that was written with a fraction or exponent (`1.0`, `2e3`).
pub fn is_float() -> IsDef {
    IsDef::new("is float", |path: &Path, value: &Value| {
        if value.is_f64() {
            valid_result(path.clone())
        } else {
            type_mismatch(path, "float", value)
        }
    })
}

pub fn is_int_gt(bound: i64) -> IsDef {
    IsDef::new("is int greater than", move |path: &Path, value: &Value| {
        check_int(path, value, |n| {
            if n > i128::from(bound) {
                valid_result(path.clone())
            } else {
                simple_result(path.clone(), false, format!("{n} is not greater than {bound}"))
            }
        })
    })
}

pub fn is_int_lt(bound: i64) -> IsDef {
    IsDef::new("is int less than", move |path: &Path, value: &Value| {
        check_int(path, value, |n| {
            if n < i128::from(bound) {
                valid_result(path.clone())
            } else {
                simple_result(path.clone(), false, format!("{n} is not less than {bound}"))
            }
        })
    })
}

/// Inclusive on both ends.
pub fn is_number_between(min: f64, max: f64) -> IsDef {
    IsDef::new("is number between", move |path: &Path, value: &Value| {
        match value.as_f64() {
            Some(n) if min <= n && n <= max => valid_result(path.clone()),
            Some(n) => {
                simple_result(path.clone(), false, format!("{n} is not within [{min}, {max}]"))
            }
            None => type_mismatch(path, "number", value),
        }
    })
}
