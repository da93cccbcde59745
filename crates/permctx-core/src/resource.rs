//! Namespaced identifiers.
//!
//! Host catalogs (game modes, dimension types, worlds) name their entries with
//! `namespace:value` keys. When such a key becomes a context value the default
//! namespace is elided so that the common case stays short (`creative`) while
//! third-party entries remain unambiguous (`mymod:custom`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{ContextError, Result};

/// Namespace elided when formatting context values.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A `namespace:value` identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    namespace: String,
    value: String,
}

impl ResourceKey {
    /// Build a key from its parts. Namespaces are case-insensitive and
    /// stored lower-cased.
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().to_lowercase(),
            value: value.into(),
        }
    }

    /// A key in the default namespace.
    pub fn default_namespace(value: impl Into<String>) -> Self {
        Self::new(DEFAULT_NAMESPACE, value)
    }

    /// Parse `namespace:value`, or a bare `value` in the default namespace.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || ContextError::InvalidResourceKey(s.to_owned());
        match s.split_once(':') {
            Some((namespace, value)) => {
                if namespace.is_empty() || value.is_empty() || value.contains(':') {
                    return Err(invalid());
                }
                Ok(Self::new(namespace, value))
            }
            None if !s.is_empty() => Ok(Self::default_namespace(s)),
            None => Err(invalid()),
        }
    }

    /// The namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The local name.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this key lives in [`DEFAULT_NAMESPACE`].
    pub fn is_default_namespace(&self) -> bool {
        self.namespace == DEFAULT_NAMESPACE
    }

    /// Always `namespace:value`.
    pub fn formatted(&self) -> String {
        format!("{}:{}", self.namespace, self.value)
    }

    /// The form used as a context value: bare local name in the default
    /// namespace, fully qualified otherwise.
    pub fn context_name(&self) -> String {
        if self.is_default_namespace() {
            self.value.clone()
        } else {
            self.formatted()
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.value)
    }
}

impl FromStr for ResourceKey {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace_formats_bare() {
        let key = ResourceKey::new("minecraft", "creative");
        assert_eq!(key.context_name(), "creative");
    }

    #[test]
    fn foreign_namespace_formats_qualified() {
        let key = ResourceKey::new("mymod", "custom");
        assert_eq!(key.context_name(), "mymod:custom");
    }

    #[test]
    fn parse_qualified_and_bare() {
        assert_eq!(
            ResourceKey::parse("mymod:custom").unwrap(),
            ResourceKey::new("mymod", "custom")
        );
        assert_eq!(
            ResourceKey::parse("the_nether").unwrap(),
            ResourceKey::default_namespace("the_nether")
        );
    }

    #[test]
    fn namespace_case_does_not_defeat_elision() {
        let key = ResourceKey::parse("MINECRAFT:creative").unwrap();
        assert!(key.is_default_namespace());
        assert_eq!(key.context_name(), "creative");
        assert_eq!(key, ResourceKey::default_namespace("creative"));
        assert_eq!(ResourceKey::new("MyMod", "custom").context_name(), "mymod:custom");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", ":x", "x:", "a:b:c"] {
            assert!(ResourceKey::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn display_is_always_qualified() {
        assert_eq!(
            ResourceKey::default_namespace("overworld").to_string(),
            "minecraft:overworld"
        );
    }

    #[test]
    fn serde_as_string() {
        let key = ResourceKey::new("mymod", "custom");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"mymod:custom\"");
        let back: ResourceKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
