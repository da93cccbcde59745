//! Rewrite tables.
//!
//! A [`RewriteTable`] maps a raw value (typically a world name) to an ordered
//! list of substitutes before it reaches a [`ContextConsumer`]. An explicitly
//! empty list suppresses the value entirely, which lets a deployment hide
//! world names it does not want exposed as contexts. Lookup is pure and
//! case-insensitive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::context::ContextConsumer;

/// What happens to raw values with no configured rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Forward the raw value unchanged.
    #[default]
    PassThrough,
    /// Forward nothing.
    Suppress,
}

/// Raw value → ordered substitute values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteTable {
    rules: HashMap<String, Vec<String>>,
    unmatched: UnmatchedPolicy,
}

impl RewriteTable {
    /// Build a table from `(raw, substitutes)` rules.
    ///
    /// Raw values are matched case-insensitively; a later rule for the same
    /// raw value replaces an earlier one.
    pub fn new<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let rules = rules
            .into_iter()
            .map(|(raw, subs)| {
                (
                    normalize(raw.as_ref()),
                    subs.into_iter().map(Into::into).collect(),
                )
            })
            .collect();
        Self {
            rules,
            unmatched: UnmatchedPolicy::PassThrough,
        }
    }

    /// Replace the unmatched-value policy.
    #[must_use]
    pub fn with_unmatched_policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    /// Current unmatched-value policy.
    pub fn unmatched_policy(&self) -> UnmatchedPolicy {
        self.unmatched
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Values that `raw` turns into, in configured order.
    pub fn rewrite<'a>(&'a self, raw: &'a str) -> Vec<&'a str> {
        match self.rules.get(&normalize(raw)) {
            Some(subs) => subs.iter().map(String::as_str).collect(),
            None => match self.unmatched {
                UnmatchedPolicy::PassThrough => vec![raw],
                UnmatchedPolicy::Suppress => Vec::new(),
            },
        }
    }

    /// Rewrite `raw` and submit every result under `key`.
    pub fn rewrite_and_submit(&self, key: &str, raw: &str, sink: &mut dyn ContextConsumer) {
        for value in self.rewrite(raw) {
            sink.accept(key, value);
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
