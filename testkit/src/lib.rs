//! Test assertions on top of `json-lookslike`.
//!
//! ```
//! use json_lookslike::isdefs::*;
//! use json_lookslike_testkit::assert_lookslike;
//! use serde_json::json;
//!
//! assert_lookslike!(
//!     json_lookslike::map([("id", is_int_gt(0)), ("name", is_string())]),
//!     json!({"id": 7, "name": "x", "extra": true})
//! );
//! ```
use json_lookslike::{render, RenderOptions, Results, Validator};
use serde_json::Value;

pub use json_lookslike;

/// Run `validator` on `actual` and panic with a rendered report listing
/// every failing path if it does not match. Returns the results otherwise.
#[track_caller]
pub fn test(validator: &Validator, actual: &Value) -> Results {
    let results = validator.check(actual);
    if !results.is_valid() {
        let report = render(&results, &RenderOptions { only_failures: true, color: false });
        panic!("value does not look like the expected shape:\n{report}actual: {actual:#}");
    }
    results
}

/// Compile `$expected` (anything convertible into `Expected`) and assert that
/// `$actual` matches it. Extra fields in `$actual` are ignored.
#[macro_export]
macro_rules! assert_lookslike {
    ($expected:expr, $actual:expr $(,)?) => {{
        let validator = $crate::json_lookslike::compile($expected);
        $crate::test(&validator, &$actual)
    }};
}

/// Like [`assert_lookslike!`], but fields the schema does not mention fail.
#[macro_export]
macro_rules! assert_lookslike_strict {
    ($expected:expr, $actual:expr $(,)?) => {{
        let validator = $crate::json_lookslike::strict($crate::json_lookslike::compile($expected));
        $crate::test(&validator, &$actual)
    }};
}
