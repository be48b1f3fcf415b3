//! Namespaced identifiers for logical resources.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A namespace-qualified resource name, written `namespace:path`.
///
/// Ordering is by namespace, then path, so maps keyed by `Identifier`
/// iterate in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    namespace: String,
    path: String,
}

/// Returned when a string is not of the form `namespace:path`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier '{input}': expected 'namespace:path'")]
pub struct ParseIdentifierError {
    pub input: String,
}

impl Identifier {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Derive the logical identifier of a physical resource by removing the
    /// `{prefix}/` directory and the file `suffix` from its path.
    ///
    /// Returns `None` if the path does not start with the prefix directory,
    /// does not end with the suffix, or nothing is left in between.
    pub fn strip_resource_path(&self, prefix: &str, suffix: &str) -> Option<Identifier> {
        let rest = self.path.strip_prefix(prefix)?.strip_prefix('/')?;
        let logical = rest.strip_suffix(suffix)?;
        if logical.is_empty() {
            return None;
        }
        Some(Identifier::new(self.namespace.clone(), logical))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = ParseIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((ns, path)) if !ns.is_empty() && !path.is_empty() => {
                Ok(Identifier::new(ns, path))
            }
            _ => Err(ParseIdentifierError {
                input: s.to_string(),
            }),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_with_colon() {
        let id = Identifier::new("origins", "powers/fire_immunity.json");
        assert_eq!(id.to_string(), "origins:powers/fire_immunity.json");
    }

    #[test]
    fn parse_splits_on_first_colon() {
        let id: Identifier = "ns:a:b".parse().unwrap();
        assert_eq!(id.namespace(), "ns");
        assert_eq!(id.path(), "a:b");
    }

    #[test]
    fn parse_rejects_missing_parts() {
        assert!("no_colon".parse::<Identifier>().is_err());
        assert!(":path".parse::<Identifier>().is_err());
        assert!("ns:".parse::<Identifier>().is_err());
    }

    #[test]
    fn strip_resource_path_removes_prefix_and_suffix() {
        let id = Identifier::new("ns", "powers/sub/foo.json");
        let logical = id.strip_resource_path("powers", ".json").unwrap();
        assert_eq!(logical, Identifier::new("ns", "sub/foo"));
    }

    #[test]
    fn strip_resource_path_requires_directory_boundary() {
        // "powersmith/x.json" starts with "powers" but not "powers/".
        let id = Identifier::new("ns", "powersmith/x.json");
        assert_eq!(id.strip_resource_path("powers", ".json"), None);
    }

    #[test]
    fn strip_resource_path_rejects_wrong_suffix_or_empty_name() {
        let id = Identifier::new("ns", "powers/foo.txt");
        assert_eq!(id.strip_resource_path("powers", ".json"), None);

        let id = Identifier::new("ns", "powers/.json");
        assert_eq!(id.strip_resource_path("powers", ".json"), None);
    }

    #[test]
    fn ordering_is_namespace_then_path() {
        let mut ids = vec![
            Identifier::new("b", "a"),
            Identifier::new("a", "z"),
            Identifier::new("a", "b"),
        ];
        ids.sort();
        assert_eq!(ids[0], Identifier::new("a", "b"));
        assert_eq!(ids[1], Identifier::new("a", "z"));
        assert_eq!(ids[2], Identifier::new("b", "a"));
    }

    #[test]
    fn serde_uses_string_form() {
        let id = Identifier::new("ns", "foo");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ns:foo\"");
        let back: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
