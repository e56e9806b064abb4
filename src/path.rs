//! Hierarchical locations inside a nested value.
//!
//! A [`Path`] is an ordered list of map keys and sequence indexes. It renders
//! as `a.b.[0].c` (the root renders as the empty string) and parses back from
//! that form. Keys that are empty or contain `.`, `[`, `]`, `"` or `\` render
//! as a quoted segment, e.g. `a.["b.c"]`, so distinct paths never render alike.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

static INDEX_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+)\]$").expect("static index segment regex")
});

// ------------------------------- Types ----------------------------------- //

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathComponent {
    Key(String),
    Index(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    components: Vec<PathComponent>,
}

// ---------------------------- Construction ------------------------------- //

impl Path {
    pub fn root() -> Self { Self::default() }

    pub fn from_components(components: Vec<PathComponent>) -> Self {
        Self { components }
    }

    /// Parse a rendered path (`a.b.[0].c`, with awkward keys quoted as
    /// `["a.b"]`). The empty string is the root.
    pub fn parse(src: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidPath { path: src.to_string(), reason };
        let mut components = Vec::new();
        let mut rest = src;
        while !rest.is_empty() {
            if rest.starts_with("[\"") {
                let body = &rest[1..];
                let end = quoted_end(body)
                    .ok_or_else(|| invalid("unterminated quoted key".into()))?;
                let key = serde_json::from_str::<String>(&body[..end])
                    .map_err(|e| invalid(format!("bad quoted key: {e}")))?;
                rest = body[end..]
                    .strip_prefix(']')
                    .ok_or_else(|| invalid("expected `]` after quoted key".into()))?;
                components.push(PathComponent::Key(key));
            } else {
                let end = rest.find('.').unwrap_or(rest.len());
                let segment = &rest[..end];
                if segment.is_empty() {
                    return Err(invalid("empty segment".into()));
                }
                match INDEX_SEGMENT.captures(segment) {
                    Some(caps) => {
                        let index = caps[1]
                            .parse::<usize>()
                            .map_err(|e| invalid(format!("bad index `{segment}`: {e}")))?;
                        components.push(PathComponent::Index(index));
                    }
                    None => components.push(PathComponent::Key(segment.to_string())),
                }
                rest = &rest[end..];
            }
            if rest.is_empty() {
                break;
            }
            rest = rest
                .strip_prefix('.')
                .ok_or_else(|| invalid("expected `.` between segments".into()))?;
            if rest.is_empty() {
                return Err(invalid("empty segment".into()));
            }
        }
        Ok(Self { components })
    }

    pub fn extend_key(&self, key: impl Into<String>) -> Self {
        let mut components = self.components.clone();
        components.push(PathComponent::Key(key.into()));
        Self { components }
    }

    pub fn extend_index(&self, index: usize) -> Self {
        let mut components = self.components.clone();
        components.push(PathComponent::Index(index));
        Self { components }
    }

    /// `self` followed by every component of `other`.
    pub fn concat(&self, other: &Path) -> Self {
        let mut components = Vec::with_capacity(self.len() + other.len());
        components.extend(self.components.iter().cloned());
        components.extend(other.components.iter().cloned());
        Self { components }
    }
}

// ------------------------------- Queries --------------------------------- //

impl Path {
    pub fn components(&self) -> &[PathComponent] { &self.components }
    pub fn len(&self) -> usize { self.components.len() }
    pub fn is_root(&self) -> bool { self.components.is_empty() }
    pub fn last(&self) -> Option<&PathComponent> { self.components.last() }

    /// Component-wise prefix test; `a` is a prefix of `a.b` but not of `ab`.
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.components.starts_with(&self.components)
    }

    /// Follow this path into `value`. `None` means the key or index is absent,
    /// including when an intermediate node has the wrong shape.
    pub fn get_from<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for component in &self.components {
            current = match (component, current) {
                (PathComponent::Key(k), Value::Object(map)) => map.get(k)?,
                (PathComponent::Index(i), Value::Array(xs)) => xs.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Visit every node of `value` in pre-order, the root included. Object keys
/// are visited in lexical order.
pub fn walk<'a>(value: &'a Value, f: &mut impl FnMut(&Path, &'a Value)) {
    walk_from(&Path::root(), value, f);
}

fn walk_from<'a>(path: &Path, value: &'a Value, f: &mut impl FnMut(&Path, &'a Value)) {
    f(path, value);
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for k in keys {
                walk_from(&path.extend_key(k.as_str()), &map[k], f);
            }
        }
        Value::Array(xs) => {
            for (i, x) in xs.iter().enumerate() {
                walk_from(&path.extend_index(i), x, f);
            }
        }
        _ => {}
    }
}

// ------------------------------ Rendering -------------------------------- //

/// Byte offset just past the closing quote of the JSON string opening `body`.
fn quoted_end(body: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

// Keys that would read back as something else (empty, dotted, index-like).
fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"', '\\'])
}

impl fmt::Display for PathComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathComponent::Key(k) if needs_quoting(k) => {
                let quoted = serde_json::to_string(k).map_err(|_| fmt::Error)?;
                write!(f, "[{quoted}]")
            }
            PathComponent::Key(k) => f.write_str(k),
            PathComponent::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_keys_and_indexes() {
        let p = Path::root().extend_key("a").extend_key("b").extend_index(0).extend_key("c");
        assert_eq!(p.to_string(), "a.b.[0].c");
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn parse_inverts_display() {
        let p: Path = "items.[12].name".parse().unwrap();
        assert_eq!(p.components(), &[
            PathComponent::Key("items".into()),
            PathComponent::Index(12),
            PathComponent::Key("name".into()),
        ]);
        assert_eq!(p.to_string(), "items.[12].name");
        assert!(Path::parse("").unwrap().is_root());
    }

    #[test]
    fn dotted_keys_are_quoted_and_round_trip() {
        let dotted = Path::root().extend_key("a.b");
        let nested = Path::root().extend_key("a").extend_key("b");
        assert_eq!(dotted.to_string(), r#"["a.b"]"#);
        assert_ne!(dotted.to_string(), nested.to_string());
        assert_eq!(Path::parse(&dotted.to_string()).unwrap(), dotted);

        let awkward = Path::root()
            .extend_key("x")
            .extend_key("[0]")
            .extend_key(r#"say "hi"\now"#)
            .extend_index(2);
        assert_eq!(Path::parse(&awkward.to_string()).unwrap(), awkward);
    }

    #[test]
    fn empty_key_is_not_the_root() {
        let empty = Path::root().extend_key("");
        assert_eq!(empty.to_string(), r#"[""]"#);
        let parsed = Path::parse(&empty.to_string()).unwrap();
        assert_eq!(parsed.components(), &[PathComponent::Key(String::new())]);
        assert!(!parsed.is_root());
    }

    #[test]
    fn parse_rejects_malformed_quoted_keys() {
        assert!(Path::parse(r#"["a"#).is_err());
        assert!(Path::parse(r#"["a"x"#).is_err());
        assert!(Path::parse(r#"["a"]b"#).is_err());
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(matches!(Path::parse("a..b"), Err(Error::InvalidPath { .. })));
        assert!(Path::parse("a.").is_err());
    }

    #[test]
    fn prefix_is_component_wise() {
        let a = Path::parse("a").unwrap();
        let ab = Path::parse("a.b").unwrap();
        let abc = Path::parse("ab").unwrap();
        assert!(a.is_prefix_of(&ab));
        assert!(!a.is_prefix_of(&abc));
        assert!(Path::root().is_prefix_of(&a));
    }

    #[test]
    fn get_from_follows_maps_and_arrays() {
        let v = json!({"a": {"b": [10, {"c": "x"}]}});
        let hit = Path::parse("a.b.[1].c").unwrap().get_from(&v);
        assert_eq!(hit, Some(&json!("x")));
        assert_eq!(Path::parse("a.b.[5]").unwrap().get_from(&v), None);
        // wrong shape: indexing into an object
        assert_eq!(Path::parse("a.[0]").unwrap().get_from(&v), None);
        assert_eq!(Path::root().get_from(&v), Some(&v));
    }

    #[test]
    fn walk_visits_every_node_in_order() {
        let v = json!({"b": [1, {"c": null}], "a": true});
        let mut seen = Vec::new();
        walk(&v, &mut |p, _| seen.push(p.to_string()));
        assert_eq!(seen, ["", "a", "b", "b.[0]", "b.[1]", "b.[1].c"]);
    }

    #[test]
    fn concat_appends_components() {
        let p = Path::parse("a").unwrap().concat(&Path::parse("[0].b").unwrap());
        assert_eq!(p.to_string(), "a.[0].b");
        assert_eq!(p.last(), Some(&PathComponent::Key("b".into())));
    }
}
