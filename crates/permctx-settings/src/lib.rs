//! # permctx-settings
//!
//! Configuration for the context subsystem.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`PermctxSettings::default()`]
//! 2. **User file**: `~/.permctx/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `PERMCTX_*` overrides (highest priority)
//!
//! The context subsystem only ever reads settings; rewrite rules and static
//! contexts are owned by whoever writes the file.
//!
//! # Usage
//!
//! ```no_run
//! use permctx_settings::get_settings;
//!
//! let settings = get_settings();
//! let table = settings.contexts.rewrite_table();
//! println!("{} world rewrites", table.len());
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
static SETTINGS: OnceLock<PermctxSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.permctx/settings.json` with env var
/// overrides. If loading fails, falls back to compiled defaults.
pub fn get_settings() -> &'static PermctxSettings {
    SETTINGS.get_or_init(|| match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "failed to load settings, using defaults");
            PermctxSettings::default()
        }
    })
}

/// Initialize the global settings with a specific value.
///
/// Returns `Err(settings)` if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: PermctxSettings) -> std::result::Result<(), PermctxSettings> {
    SETTINGS.set(settings)
}
