//! Construction-time errors.
//!
//! Matching itself never fails: every mismatch is recorded as data inside a
//! [`Results`][crate::Results]. Only building things up front can go wrong,
//! e.g. parsing a rendered path or compiling a regex for a validator.
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// A rendered path string could not be parsed back into a [`Path`][crate::Path].
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A string pattern handed to a validator constructor is not a valid regex.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
