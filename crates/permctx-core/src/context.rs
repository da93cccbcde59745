//! Context sets.
//!
//! A [`ContextSet`] is an immutable mapping from context key to one or more
//! values (`world=arena`, `gamemode=creative`). Sets are assembled through a
//! [`ContextSetBuilder`], which doubles as the [`ContextConsumer`] sink that
//! calculators write into. The builder enforces the validity predicate: a
//! contribution that fails it is dropped without error so one bad value never
//! aborts the merge of everything else.
//!
//! Keys and values are case-insensitive and stored trimmed and lower-cased.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::{ContextError, Result};

/// Longest accepted context value, in characters.
pub const MAX_VALUE_LENGTH: usize = 256;

/// Character reserved as the `key=value` separator in flattened contexts.
const SEPARATOR: char = '=';

/// A single validated key/value pair.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Context {
    key: String,
    value: String,
}

impl Context {
    /// Build a pair, normalising and validating both halves.
    pub fn new(key: &str, value: &str) -> Result<Self> {
        let key = normalize(key);
        if !Self::is_valid_key(&key) {
            return Err(ContextError::InvalidKey(key));
        }
        let value = normalize(value);
        if !Self::is_valid_value(&value) {
            return Err(ContextError::InvalidValue { key, value });
        }
        Ok(Self { key, value })
    }

    /// The context key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The context value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether `key` may be used as a context key.
    pub fn is_valid_key(key: &str) -> bool {
        let trimmed = key.trim();
        !trimmed.is_empty() && trimmed.chars().all(is_allowed_char)
    }

    /// Whether `value` may be used as a context value.
    pub fn is_valid_value(value: &str) -> bool {
        let trimmed = value.trim();
        !trimmed.is_empty()
            && trimmed.chars().count() <= MAX_VALUE_LENGTH
            && trimmed.chars().all(is_allowed_char)
    }
}

impl<'de> Deserialize<'de> for Context {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            key: String,
            value: String,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(&raw.key, &raw.value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.key, self.value)
    }
}

fn is_allowed_char(c: char) -> bool {
    !c.is_control() && c != SEPARATOR
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Sink that calculators push contributions into.
pub trait ContextConsumer {
    /// Offer one key/value pair. Implementations may drop it.
    fn accept(&mut self, key: &str, value: &str);

    /// Offer every pair of an existing set.
    fn accept_all(&mut self, set: &ContextSet) {
        for (key, value) in set.iter() {
            self.accept(key, value);
        }
    }
}

/// How [`ContextSet::is_satisfied_by`] treats keys carrying several values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfyMode {
    /// Each key needs at least one of its values present in the other set.
    #[default]
    AtLeastOneValuePerKey,
    /// Each key needs every one of its values present in the other set.
    AllValuesPerKey,
}

type ContextMap = BTreeMap<String, BTreeSet<String>>;

/// Immutable multi-valued mapping from context key to context values.
///
/// Cloning is cheap; the underlying map is shared. Equality is structural and
/// iteration is sorted by key, then value.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextSet {
    inner: Arc<ContextMap>,
}

impl ContextSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start a new builder.
    pub fn builder() -> ContextSetBuilder {
        ContextSetBuilder::new()
    }

    /// Build a set from pairs, dropping invalid ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut builder = ContextSetBuilder::new();
        for (key, value) in pairs {
            builder.add(key.as_ref(), value.as_ref());
        }
        builder.build()
    }

    /// Whether the pair is present.
    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.inner
            .get(&normalize(key))
            .is_some_and(|values| values.contains(&normalize(value)))
    }

    /// Whether at least one value exists for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(&normalize(key))
    }

    /// All values for `key`, sorted.
    pub fn values(&self, key: &str) -> impl Iterator<Item = &str> + '_ {
        self.inner
            .get(&normalize(key))
            .into_iter()
            .flat_map(|values| values.iter().map(String::as_str))
    }

    /// The first value for `key`, if any.
    pub fn any_value(&self, key: &str) -> Option<&str> {
        self.values(key).next()
    }

    /// Sorted keys present in the set.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys().map(String::as_str)
    }

    /// Every `(key, value)` pair, sorted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.inner.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Total number of pairs.
    pub fn len(&self) -> usize {
        self.inner.values().map(BTreeSet::len).sum()
    }

    /// Whether the set holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Structural union of two sets.
    #[must_use]
    pub fn union(&self, other: &ContextSet) -> ContextSet {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut builder = self.to_builder();
        builder.add_all(other);
        builder.build()
    }

    /// A builder seeded with this set's pairs.
    pub fn to_builder(&self) -> ContextSetBuilder {
        ContextSetBuilder {
            map: (*self.inner).clone(),
        }
    }

    /// Whether `other` satisfies every key of this set under `mode`.
    ///
    /// An empty set is satisfied by anything.
    pub fn is_satisfied_by(&self, other: &ContextSet, mode: SatisfyMode) -> bool {
        self.inner.iter().all(|(key, required)| {
            let Some(present) = other.inner.get(key) else {
                return false;
            };
            match mode {
                SatisfyMode::AtLeastOneValuePerKey => {
                    required.iter().any(|value| present.contains(value))
                }
                SatisfyMode::AllValuesPerKey => required.is_subset(present),
            }
        })
    }
}

impl fmt::Debug for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl fmt::Display for ContextSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}{SEPARATOR}{value}")?;
        }
        f.write_str("}")
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for ContextSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl Serialize for ContextSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.inner.iter())
    }
}

impl<'de> Deserialize<'de> for ContextSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        let mut builder = ContextSetBuilder::new();
        for (key, values) in &raw {
            for value in values {
                builder.add(key, value);
            }
        }
        Ok(builder.build())
    }
}

/// Mutable accumulator for a [`ContextSet`].
#[derive(Clone, Debug, Default)]
pub struct ContextSetBuilder {
    map: ContextMap,
}

impl ContextSetBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair if it passes validation; otherwise do nothing.
    pub fn add(&mut self, key: &str, value: &str) {
        if let Err(err) = self.try_add(key, value) {
            trace!(key, value, error = %err, "dropping invalid context");
        }
    }

    /// Add a pair, reporting why it was rejected.
    pub fn try_add(&mut self, key: &str, value: &str) -> Result<()> {
        let context = Context::new(key, value)?;
        let _ = self
            .map
            .entry(context.key)
            .or_default()
            .insert(context.value);
        Ok(())
    }

    /// Chaining form of [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.add(key, value);
        self
    }

    /// Add every pair from `other`.
    pub fn add_all(&mut self, other: &ContextSet) {
        for (key, values) in other.inner.iter() {
            self.map
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
    }

    /// Move every pair out of another builder into this one.
    pub fn merge(&mut self, other: ContextSetBuilder) {
        for (key, values) in other.map {
            self.map.entry(key).or_default().extend(values);
        }
    }

    /// Whether nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Freeze the current contents. The builder stays usable and later
    /// changes to it do not affect the returned set.
    pub fn build(&self) -> ContextSet {
        ContextSet {
            inner: Arc::new(self.map.clone()),
        }
    }
}

impl ContextConsumer for ContextSetBuilder {
    fn accept(&mut self, key: &str, value: &str) {
        self.add(key, value);
    }

    fn accept_all(&mut self, set: &ContextSet) {
        self.add_all(set);
    }
}
