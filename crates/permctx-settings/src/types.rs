//! Settings types.

use std::collections::BTreeMap;

use permctx_core::{Context, ContextSet, RewriteTable, UnmatchedPolicy};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermctxSettings {
    /// Context calculation settings.
    pub contexts: ContextSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings consumed by the context calculators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextSettings {
    /// Raw world name → substitute world names. An empty list hides the world.
    pub world_rewrites: BTreeMap<String, Vec<String>>,
    /// Drop world names that have no rewrite rule instead of passing them on.
    pub suppress_unmatched_worlds: bool,
    /// Contexts applied to every subject (e.g. `server: ["lobby"]`).
    pub static_contexts: BTreeMap<String, Vec<String>>,
}

impl ContextSettings {
    /// Build the world rewrite table.
    pub fn rewrite_table(&self) -> RewriteTable {
        let policy = if self.suppress_unmatched_worlds {
            UnmatchedPolicy::Suppress
        } else {
            UnmatchedPolicy::PassThrough
        };
        RewriteTable::new(
            self.world_rewrites
                .iter()
                .map(|(raw, subs)| (raw.as_str(), subs.clone())),
        )
        .with_unmatched_policy(policy)
    }

    /// The configured static contexts. Invalid entries are dropped.
    pub fn static_context_set(&self) -> ContextSet {
        ContextSet::from_pairs(
            self.static_contexts
                .iter()
                .flat_map(|(key, values)| values.iter().map(move |value| (key, value))),
        )
    }

    /// Reject entries that could never become contexts.
    pub fn validate(&self) -> Result<()> {
        for (key, values) in &self.static_contexts {
            if !Context::is_valid_key(key) {
                return Err(SettingsError::InvalidValue(format!(
                    "static context key {key:?} is not a valid context key"
                )));
            }
            if let Some(bad) = values.iter().find(|v| !Context::is_valid_value(v)) {
                return Err(SettingsError::InvalidValue(format!(
                    "static context {key}={bad:?} is not a valid context value"
                )));
            }
        }
        if let Some(raw) = self.world_rewrites.keys().find(|raw| raw.trim().is_empty()) {
            return Err(SettingsError::InvalidValue(format!(
                "world rewrite source {raw:?} is blank"
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: permctx_core::logging::DEFAULT_LEVEL.to_string(),
        }
    }
}
