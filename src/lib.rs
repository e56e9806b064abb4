//! Declarative structural matching for nested JSON-like values.
//!
//! Build an expected shape (a schema) whose leaves are literal values or
//! [`IsDef`] nodes, compile it, and match it against actual values. Every
//! mismatch is reported with its [`Path`]; matching never stops at the first
//! failure and never returns an error.
//!
//! - [`isdef`]: the leaf check protocol.
//! - [`results`]: `ValueResult`, `Results` and the result constructors.
//! - [`schema`]: schema trees and the walker (`compile`, `strict`, `compose`).
//! - [`isdefs`]: built-in leaf definitions.
//! - [`report`]: error values and rendered reports.
pub mod error;
pub mod isdef;
pub mod isdefs;
pub mod path;
pub mod report;
pub mod results;
pub mod schema;

pub use error::{Error, Result};
pub use isdef::{IsDef, ValueValidator};
pub use path::{Path, PathComponent};
pub use report::{render, RenderOptions, ValueResultError};
pub use results::{
    key_missing_result, simple_result, single_result, strict_failure_result, valid_result,
    Results, ValueResult, KEY_MISSING_VR, STRICT_FAILURE_VR, VALID_VR,
};
pub use schema::{compile, compose, map, seq, strict, Expected, Validator};
