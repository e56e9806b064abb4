//! Schemas and the walker that applies them.
//!
//! An [`Expected`] tree mirrors the shape of the value it should match. Its
//! leaves are literals, [`IsDef`]s or nested [`Validator`]s. [`compile`]
//! flattens the tree into `(Path, leaf)` checks once; the resulting
//! [`Validator`] can be run against any number of actual values.
//!
//! ```
//! use json_lookslike::{compile, map, isdefs::*};
//! use serde_json::json;
//!
//! let v = compile(map([
//!     ("name", is_non_empty_string()),
//!     ("age", is_int_gt(0)),
//!     ("nickname", optional(is_string())),
//! ]));
//! assert!(v.check(&json!({"name": "Ada", "age": 36})).is_valid());
//! assert!(!v.check(&json!({"name": "", "age": 36})).is_valid());
//! ```
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::isdef::IsDef;
use crate::isdefs::is_equal;
use crate::path::Path;
use crate::results::{key_missing_result, strict_failure_result, Results};

// ------------------------------- Types ----------------------------------- //

/// A compiled matcher for whole values.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&Value) -> Results + Send + Sync>);

impl Validator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Results + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn check(&self, actual: &Value) -> Results {
        (self.0)(actual)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(<fn>)")
    }
}

#[derive(Clone, Debug)]
pub enum Expected {
    /// Compared with [`is_equal`]. Non-empty collections built through
    /// `From<Value>` are split into `Map`/`Seq` instead.
    Literal(Value),
    Def(IsDef),
    /// Run against the sub-value; its results are re-rooted at this position.
    Validator(Validator),
    Map(IndexMap<String, Expected>),
    Seq(Vec<Expected>),
}

// ---------------------------- Conversions -------------------------------- //

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(m) if !m.is_empty() => {
                Expected::Map(m.into_iter().map(|(k, v)| (k, Expected::from(v))).collect())
            }
            Value::Array(xs) if !xs.is_empty() => {
                Expected::Seq(xs.into_iter().map(Expected::from).collect())
            }
            other => Expected::Literal(other),
        }
    }
}

impl From<IsDef> for Expected {
    fn from(def: IsDef) -> Self { Expected::Def(def) }
}

impl From<Validator> for Expected {
    fn from(v: Validator) -> Self { Expected::Validator(v) }
}

impl From<&str> for Expected {
    fn from(s: &str) -> Self { Expected::Literal(Value::from(s)) }
}

impl From<String> for Expected {
    fn from(s: String) -> Self { Expected::Literal(Value::from(s)) }
}

impl From<bool> for Expected {
    fn from(b: bool) -> Self { Expected::Literal(Value::from(b)) }
}

impl From<i64> for Expected {
    fn from(n: i64) -> Self { Expected::Literal(Value::from(n)) }
}

impl From<f64> for Expected {
    fn from(n: f64) -> Self { Expected::Literal(Value::from(n)) }
}

/// Build a map schema. An empty map only matches an empty object.
pub fn map<K, E, I>(entries: I) -> Expected
where
    K: Into<String>,
    E: Into<Expected>,
    I: IntoIterator<Item = (K, E)>,
{
    let m: IndexMap<String, Expected> = entries
        .into_iter()
        .map(|(k, e)| (k.into(), e.into()))
        .collect();
    if m.is_empty() {
        Expected::Literal(Value::Object(Default::default()))
    } else {
        Expected::Map(m)
    }
}

/// Build a positional sequence schema. An empty one only matches `[]`.
pub fn seq<E, I>(items: I) -> Expected
where
    E: Into<Expected>,
    I: IntoIterator<Item = E>,
{
    let xs: Vec<Expected> = items.into_iter().map(Into::into).collect();
    if xs.is_empty() {
        Expected::Literal(Value::Array(Vec::new()))
    } else {
        Expected::Seq(xs)
    }
}

// ------------------------------- Compile --------------------------------- //

#[derive(Debug)]
enum Leaf {
    Def(IsDef),
    Nested(Validator),
}

#[derive(Debug)]
struct FlatCheck {
    path: Path,
    leaf: Leaf,
}

fn flatten(path: Path, expected: &Expected, out: &mut Vec<FlatCheck>) {
    match expected {
        Expected::Map(m) if m.is_empty() => out.push(FlatCheck {
            path,
            leaf: Leaf::Def(is_equal(Value::Object(Default::default()))),
        }),
        Expected::Seq(xs) if xs.is_empty() => out.push(FlatCheck {
            path,
            leaf: Leaf::Def(is_equal(Value::Array(Vec::new()))),
        }),
        Expected::Map(m) => {
            // lexical order keeps diagnostics reproducible
            let mut keys: Vec<&String> = m.keys().collect();
            keys.sort();
            for k in keys {
                flatten(path.extend_key(k.as_str()), &m[k], out);
            }
        }
        Expected::Seq(xs) => {
            for (i, x) in xs.iter().enumerate() {
                flatten(path.extend_index(i), x, out);
            }
        }
        Expected::Literal(v) => out.push(FlatCheck { path, leaf: Leaf::Def(is_equal(v.clone())) }),
        Expected::Def(def) => out.push(FlatCheck { path, leaf: Leaf::Def(def.clone()) }),
        Expected::Validator(v) => out.push(FlatCheck { path, leaf: Leaf::Nested(v.clone()) }),
    }
}

fn run_checks(checks: &[FlatCheck], actual: &Value) -> Results {
    static NULL: Value = Value::Null;
    let mut results = Results::new();
    for check in checks {
        let found = check.path.get_from(actual);
        tracing::trace!(path = %check.path, exists = found.is_some(), "checking leaf");
        match &check.leaf {
            Leaf::Def(def) => {
                // absent optional keys produce no outcome at all
                if def.optional && !def.check_key_missing && found.is_none() {
                    continue;
                }
                results.merge(def.check(&check.path, found.unwrap_or(&NULL), found.is_some()));
            }
            Leaf::Nested(validator) => match found {
                Some(sub) => results.merge_under_prefix(&check.path, validator.check(sub)),
                None => results.merge(key_missing_result(check.path.clone())),
            },
        }
    }
    results
}

/// Flatten `expected` into a reusable [`Validator`].
pub fn compile(expected: impl Into<Expected>) -> Validator {
    let expected = expected.into();
    let mut checks = Vec::new();
    flatten(Path::root(), &expected, &mut checks);
    tracing::debug!(leaves = checks.len(), "compiled schema");
    Validator::new(move |actual| run_checks(&checks, actual))
}

// ------------------------------- Strict ---------------------------------- //

/// Wrap `lax` so that any field of the actual value that no check covered
/// fails with [`strict_failure_result`]. A null actual value is left to `lax`.
pub fn strict(lax: Validator) -> Validator {
    Validator::new(move |actual| {
        let mut results = lax.check(actual);
        if actual.is_null() {
            return results;
        }
        let validated: Vec<Path> = results.paths().cloned().collect();
        let mut unexpected = Results::new();
        walk_unvalidated(&Path::root(), actual, &validated, &mut unexpected);
        tracing::debug!(unexpected = unexpected.len(), "strict walk finished");
        results.merge(unexpected);
        results
    })
}

fn walk_unvalidated(path: &Path, value: &Value, validated: &[Path], out: &mut Results) {
    let children: Vec<(Path, &Value)> = match value {
        Value::Object(m) => {
            let mut keys: Vec<&String> = m.keys().collect();
            keys.sort();
            keys.into_iter().map(|k| (path.extend_key(k.as_str()), &m[k])).collect()
        }
        Value::Array(xs) => xs.iter().enumerate().map(|(i, x)| (path.extend_index(i), x)).collect(),
        _ => return,
    };
    for (child, v) in children {
        if validated.iter().any(|p| child.is_prefix_of(p)) {
            walk_unvalidated(&child, v, validated, out);
        } else {
            out.merge(strict_failure_result(child));
        }
    }
}

// ------------------------------- Compose --------------------------------- //

/// Run every validator against the same value and merge what they report.
pub fn compose(validators: impl IntoIterator<Item = Validator>) -> Validator {
    let validators: Vec<Validator> = validators.into_iter().collect();
    Validator::new(move |actual| {
        let mut results = Results::new();
        for v in &validators {
            results.merge(v.check(actual));
        }
        results
    })
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isdefs::*;
    use serde_json::json;

    fn p(s: &str) -> Path { Path::parse(s).unwrap() }

    fn messages(r: &Results, path: &str) -> Vec<String> {
        r.fields(&p(path)).iter().map(|vr| vr.message().to_string()).collect()
    }

    #[test]
    fn missing_required_key() {
        let r = compile(map([("name", is_string())])).check(&json!({}));
        assert!(!r.is_valid());
        assert_eq!(messages(&r, "name"), ["expected this key to be present"]);
    }

    #[test]
    fn missing_optional_key() {
        let r = compile(map([("name", optional(is_string()))])).check(&json!({}));
        assert!(r.is_valid());
        assert!(r.is_empty());
    }

    #[test]
    fn present_optional_key_is_still_checked() {
        let r = compile(map([("name", optional(is_string()))])).check(&json!({"name": 1}));
        assert!(!r.is_valid());
    }

    #[test]
    fn key_that_should_not_exist() {
        let r = compile(map([("secret", key_missing())])).check(&json!({"secret": 1}));
        assert!(!r.is_valid());
        assert_eq!(messages(&r, "secret"), ["this key should not exist"]);

        let r = compile(map([("secret", key_missing())])).check(&json!({}));
        assert!(r.is_valid());
    }

    #[test]
    fn literals_from_json() {
        let v = compile(json!({"a": 1, "b": {"c": [true, "x"]}}));
        assert!(v.check(&json!({"a": 1.0, "b": {"c": [true, "x"]}, "extra": 0})).is_valid());

        let r = v.check(&json!({"a": 2, "b": {"c": [true]}}));
        assert!(!r.is_valid());
        assert!(!r.fields(&p("a"))[0].is_valid());
        assert!(r.fields(&p("b.c.[0]"))[0].is_valid());
        assert_eq!(messages(&r, "b.c.[1]"), ["expected this key to be present"]);
    }

    #[test]
    fn every_mismatch_is_reported() {
        let v = compile(map([
            ("a", Expected::from(is_int())),
            ("b", Expected::from(is_string())),
            ("c", Expected::from(json!(3))),
        ]));
        let r = v.check(&json!({"a": "x", "b": 1}));
        assert_eq!(r.detailed_errors().len(), 3);
    }

    #[test]
    fn empty_collections_match_exactly() {
        let v = compile(json!({"tags": [], "meta": {}}));
        assert!(v.check(&json!({"tags": [], "meta": {}})).is_valid());
        assert!(!v.check(&json!({"tags": [1], "meta": {}})).is_valid());
        assert!(!compile(map::<&str, Expected, _>([])).check(&json!({"a": 1})).is_valid());
        assert!(compile(seq::<Expected, _>([])).check(&json!([])).is_valid());
    }

    #[test]
    fn nested_validator_is_rerooted() {
        let inner = compile(map([("id", is_int())]));
        let v = compile(map([("owner", inner.clone())]));
        let r = v.check(&json!({"owner": {"id": "nope"}}));
        assert!(!r.fields(&p("owner.id"))[0].is_valid());

        let r = v.check(&json!({}));
        assert_eq!(messages(&r, "owner"), ["expected this key to be present"]);
    }

    #[test]
    fn null_intermediate_counts_as_missing() {
        let r = compile(json!({"a": {"b": 1}})).check(&json!({"a": null}));
        assert_eq!(messages(&r, "a.b"), ["expected this key to be present"]);
    }

    #[test]
    fn keys_are_checked_in_lexical_order() {
        let v = compile(map([("b", is_any()), ("a", is_any()), ("c", is_any())]));
        let r = v.check(&json!({"a": 1, "b": 1, "c": 1}));
        let order: Vec<String> = r.paths().map(|p| p.to_string()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn strict_flags_unexpected_fields() {
        let v = strict(compile(json!({"a": 1})));
        let r = v.check(&json!({"a": 1, "b": 2}));
        assert!(!r.is_valid());
        assert!(r.fields(&p("a"))[0].is_valid());
        assert_eq!(messages(&r, "b"), ["unexpected field encountered during strict validation"]);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn strict_reports_only_the_topmost_unexpected_node() {
        let v = strict(compile(json!({"a": 1})));
        let r = v.check(&json!({"a": 1, "b": {"c": {"d": 1}}}));
        assert_eq!(r.detailed_errors().len(), 1);
        assert!(r.contains_path(&p("b")));
    }

    #[test]
    fn strict_covers_extra_array_elements() {
        let v = strict(compile(json!({"xs": [1, 2]})));
        let r = v.check(&json!({"xs": [1, 2, 3]}));
        assert_eq!(
            messages(&r, "xs.[2]"),
            ["unexpected field encountered during strict validation"]
        );
    }

    #[test]
    fn strict_uses_component_prefixes() {
        // "a" must not vouch for "ab"
        let v = strict(compile(json!({"a": 1})));
        let r = v.check(&json!({"a": 1, "ab": 1}));
        assert!(!r.is_valid());
        assert!(r.contains_path(&p("ab")));
    }

    #[test]
    fn strict_accepts_nested_validator_coverage() {
        let v = strict(compile(map([("items", is_array_of(compile(map([("id", is_int())]))))])));
        assert!(v.check(&json!({"items": [{"id": 1}, {"id": 2}]})).is_valid());
        let r = v.check(&json!({"items": [{"id": 1, "x": 0}]}));
        assert!(r.contains_path(&p("items.[0].x")));
    }

    #[test]
    fn strict_on_null_defers_to_lax() {
        let lax = compile(json!({"a": 1}));
        assert_eq!(strict(lax.clone()).check(&Value::Null), lax.check(&Value::Null));
    }

    #[test]
    fn compose_merges_all() {
        let v = compose([
            compile(map([("a", is_int())])),
            compile(map([("a", is_int_gt(10))])),
        ]);
        let r = v.check(&json!({"a": 5}));
        assert_eq!(r.fields(&p("a")).len(), 2);
        assert!(!r.is_valid());
    }

    #[test]
    fn validators_are_shareable_across_threads() {
        let v = compile(map([("n", is_int())]));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let v = v.clone();
                std::thread::spawn(move || v.check(&json!({"n": i})).is_valid())
            })
            .collect();
        assert!(handles.into_iter().all(|h| h.join().unwrap()));
    }
}
