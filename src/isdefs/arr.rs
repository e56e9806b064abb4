use serde_json::Value;

use super::type_mismatch;
use crate::isdef::IsDef;
use crate::path::Path;
use crate::results::{simple_result, valid_result, Results};
use crate::schema::Validator;

/// Every element must pass `validator`; element results land under `[i]`.
pub fn is_array_of(validator: Validator) -> IsDef {
    IsDef::new("is array of", move |path: &Path, value: &Value| {
        let Some(xs) = value.as_array() else {
            return type_mismatch(path, "array", value);
        };
        if xs.is_empty() {
            return valid_result(path.clone());
        }
        let mut out = Results::new();
        for (i, x) in xs.iter().enumerate() {
            out.merge_under_prefix(&path.extend_index(i), validator.check(x));
        }
        out
    })
}

pub fn is_array_len(len: usize) -> IsDef {
    IsDef::new("is array of length", move |path: &Path, value: &Value| {
        match value.as_array() {
            Some(xs) if xs.len() == len => valid_result(path.clone()),
            Some(xs) => simple_result(
                path.clone(),
                false,
                format!("expected {len} elements, got {}", xs.len()),
            ),
            None => type_mismatch(path, "array", value),
        }
    })
}
