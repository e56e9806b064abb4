//! The leaf check protocol.
//!
//! An [`IsDef`] decides whether a single `(path, value, key presence)` triple
//! is acceptable. Generally only `name` and `checker` are set; `optional` and
//! `check_key_missing` are for checks about key presence itself.
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::path::Path;
use crate::results::{key_missing_result, simple_result, valid_result, Results};

/// Checks the value found at `path`.
pub trait ValueValidator: Send + Sync {
    fn validate(&self, path: &Path, value: &Value) -> Results;
}

impl<F> ValueValidator for F
where
    F: Fn(&Path, &Value) -> Results + Send + Sync,
{
    fn validate(&self, path: &Path, value: &Value) -> Results {
        self(path, value)
    }
}

#[derive(Clone, Default)]
pub struct IsDef {
    pub name: Cow<'static, str>,
    pub checker: Option<Arc<dyn ValueValidator>>,
    pub optional: bool,
    pub check_key_missing: bool,
}

impl IsDef {
    pub fn new(name: impl Into<Cow<'static, str>>, checker: impl ValueValidator + 'static) -> Self {
        Self {
            name: name.into(),
            checker: Some(Arc::new(checker)),
            ..Self::default()
        }
    }

    /// A definition with no value constraint; presence alone decides.
    pub fn presence(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Run this definition against the value at `path`. `value` is ignored
    /// when `key_exists` is false.
    pub fn check(&self, path: &Path, value: &Value, key_exists: bool) -> Results {
        if self.check_key_missing {
            if !key_exists {
                return valid_result(path.clone());
            }
            return simple_result(path.clone(), false, "this key should not exist");
        }

        if !self.optional && !key_exists {
            return key_missing_result(path.clone());
        }

        if let Some(checker) = &self.checker {
            return checker.validate(path, value);
        }

        valid_result(path.clone())
    }
}

impl fmt::Debug for IsDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IsDef")
            .field("name", &self.name)
            .field("checker", &self.checker.as_ref().map(|_| "<fn>"))
            .field("optional", &self.optional)
            .field("check_key_missing", &self.check_key_missing)
            .finish()
    }
}

// ------------------------------- Tests ------------------------------------ //
