//! Outcome aggregation.
//!
//! A [`ValueResult`] is the outcome of one leaf check. A [`Results`] is the
//! multiset of `(Path, ValueResult)` pairs collected over a whole comparison.
//! Merging keeps every pair, including repeated paths, so the aggregate does
//! not depend on the order in which sibling checks ran.
use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Serialize;

use crate::path::Path;

// ----------------------------- ValueResult ------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ValueResult {
    valid: bool,
    message: Cow<'static, str>,
}

/// Emitted for any passing check without anything more specific to say.
pub const VALID_VR: ValueResult = ValueResult {
    valid: true,
    message: Cow::Borrowed("is valid"),
};

/// Emitted when a key was expected, but was not present.
pub const KEY_MISSING_VR: ValueResult = ValueResult {
    valid: false,
    message: Cow::Borrowed("expected this key to be present"),
};

/// Emitted by strict matching when the actual value has a field the schema lacks.
pub const STRICT_FAILURE_VR: ValueResult = ValueResult {
    valid: false,
    message: Cow::Borrowed("unexpected field encountered during strict validation"),
};

impl ValueResult {
    /// An empty message is replaced by a generic one; messages are never blank.
    pub fn new(valid: bool, message: impl Into<Cow<'static, str>>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            Cow::Borrowed(if valid { "is valid" } else { "is invalid" })
        } else {
            message
        };
        Self { valid, message }
    }

    pub fn is_valid(&self) -> bool { self.valid }
    pub fn message(&self) -> &str { &self.message }
}

// ------------------------------- Results --------------------------------- //

#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Results {
    fields: IndexMap<Path, Vec<ValueResult>>,
    #[serde(skip)]
    valid: bool,
}

impl Default for Results {
    fn default() -> Self {
        Self { fields: IndexMap::new(), valid: true }
    }
}

impl Results {
    pub fn new() -> Self { Self::default() }

    pub fn record(&mut self, path: Path, result: ValueResult) {
        if !result.valid {
            self.valid = false;
        }
        self.fields.entry(path).or_default().push(result);
    }

    pub fn merge(&mut self, other: Results) {
        for (path, results) in other.fields {
            for result in results {
                self.record(path.clone(), result);
            }
        }
    }

    /// Merge `other`, re-rooting each of its paths under `prefix`.
    pub fn merge_under_prefix(&mut self, prefix: &Path, other: Results) {
        for (path, results) in other.fields {
            let full = prefix.concat(&path);
            for result in results {
                self.record(full.clone(), result);
            }
        }
    }

    /// True iff every contained outcome is valid. An empty report is valid.
    pub fn is_valid(&self) -> bool { self.valid }

    pub fn len(&self) -> usize { self.fields.values().map(Vec::len).sum() }
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Every outcome recorded at `path`, in recording order.
    pub fn fields(&self, path: &Path) -> &[ValueResult] {
        self.fields.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> { self.fields.keys() }

    pub fn contains_path(&self, path: &Path) -> bool { self.fields.contains_key(path) }

    /// Every pair, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &ValueResult)> {
        self.fields
            .iter()
            .flat_map(|(path, results)| results.iter().map(move |r| (path, r)))
    }

    /// Every pair, ordered by path; stable output for diagnostics.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&Path, &ValueResult)> {
        let mut paths: Vec<&Path> = self.fields.keys().collect();
        paths.sort();
        paths
            .into_iter()
            .flat_map(move |path| self.fields[path].iter().map(move |r| (path, r)))
    }

    /// Only the failing pairs.
    pub fn detailed_errors(&self) -> Results {
        let mut out = Results::new();
        for (path, result) in self.iter() {
            if !result.valid {
                out.record(path.clone(), result.clone());
            }
        }
        out
    }
}

// Multiset equality: recording order within or across paths is irrelevant.
impl PartialEq for Results {
    fn eq(&self, other: &Self) -> bool {
        if self.valid != other.valid || self.fields.len() != other.fields.len() {
            return false;
        }
        self.fields.iter().all(|(path, ours)| {
            let Some(theirs) = other.fields.get(path) else { return false };
            let mut a = ours.clone();
            let mut b = theirs.clone();
            a.sort();
            b.sort();
            a == b
        })
    }
}

impl Eq for Results {}

// ----------------------------- Constructors ------------------------------ //

pub fn simple_result(path: Path, valid: bool, message: impl Into<Cow<'static, str>>) -> Results {
    single_result(path, ValueResult::new(valid, message))
}

pub fn single_result(path: Path, result: ValueResult) -> Results {
    let mut out = Results::new();
    out.record(path, result);
    out
}

pub fn valid_result(path: Path) -> Results { single_result(path, VALID_VR) }

pub fn key_missing_result(path: Path) -> Results { single_result(path, KEY_MISSING_VR) }

pub fn strict_failure_result(path: Path) -> Results { single_result(path, STRICT_FAILURE_VR) }

// ------------------------------- Tests ------------------------------------ //
