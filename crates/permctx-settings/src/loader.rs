//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PermctxSettings::default()`]
//! 2. If `~/.permctx/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::PermctxSettings;

/// Resolve the path to the settings file (`~/.permctx/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".permctx").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<PermctxSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. Invalid JSON or values that
/// fail validation are errors.
pub fn load_settings_from_path(path: &Path) -> Result<PermctxSettings> {
    let defaults = serde_json::to_value(PermctxSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: PermctxSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.contexts.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// Rewrite and static context maps are objects, so a user file only needs to
/// list the entries it adds.
pub fn deep_merge(target: Value, source: Value) -> Value {
    let (mut merged, overrides) = match (target, source) {
        (Value::Object(t), Value::Object(s)) => (t, s),
        (_, source) => return source,
    };
    for (key, value) in overrides.into_iter().filter(|(_, v)| !v.is_null()) {
        let value = match merged.remove(&key) {
            Some(existing) => deep_merge(existing, value),
            None => value,
        };
        let _ = merged.insert(key, value);
    }
    Value::Object(merged)
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut PermctxSettings) {
    if let Some(v) = read_env_string("PERMCTX_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("PERMCTX_SUPPRESS_UNMATCHED_WORLDS") {
        settings.contexts.suppress_unmatched_worlds = v;
    }
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn deep_merge_nested_objects() {
        let target = json!({"contexts": {"worldRewrites": {"a": ["x"]}, "suppressUnmatchedWorlds": false}});
        let source = json!({"contexts": {"worldRewrites": {"b": ["y"]}}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["contexts"]["worldRewrites"]["a"], json!(["x"]));
        assert_eq!(merged["contexts"]["worldRewrites"]["b"], json!(["y"]));
        assert_eq!(merged["contexts"]["suppressUnmatchedWorlds"], json!(false));
    }

    #[test]
    fn deep_merge_arrays_replace() {
        let merged = deep_merge(json!({"a": [1, 2]}), json!({"a": []}));
        assert_eq!(merged["a"], json!([]));
    }

    #[test]
    fn deep_merge_null_preserves_target() {
        let merged = deep_merge(json!({"level": "warn"}), json!({"level": null}));
        assert_eq!(merged["level"], "warn");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert!(settings.contexts.world_rewrites.is_empty());
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"contexts": {{"worldRewrites": {{"east_server": ["region:east"]}}}}}}"#
        )
        .unwrap();
        let settings = load_settings_from_path(file.path()).unwrap();
        assert_eq!(
            settings.contexts.world_rewrites["east_server"],
            vec!["region:east".to_string()]
        );
        assert_eq!(settings.logging.level, "warn");
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert_matches!(
            load_settings_from_path(file.path()),
            Err(SettingsError::Json(_))
        );
    }

    #[test]
    fn invalid_static_context_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"contexts": {{"staticContexts": {{"server": ["a=b"]}}}}}}"#).unwrap();
        assert_matches!(
            load_settings_from_path(file.path()),
            Err(SettingsError::InvalidValue(_))
        );
    }

    #[test]
    fn parse_bool_variants() {
        for t in ["true", "1", "YES", "on"] {
            assert_eq!(parse_bool(t), Some(true), "{t}");
        }
        for f in ["false", "0", "No", "off"] {
            assert_eq!(parse_bool(f), Some(false), "{f}");
        }
        assert_eq!(parse_bool("maybe"), None);
    }
}
