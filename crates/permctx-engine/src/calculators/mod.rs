//! Built-in context calculators.
//!
//! - [`WorldCalculator`]: `dimension-type` and (rewritten) `world`
//! - [`GameModeCalculator`]: `gamemode`
//! - [`StaticCalculator`]: fixed, configured contexts such as `server`

pub mod gamemode;
pub mod static_contexts;
pub mod world;

pub use gamemode::GameModeCalculator;
pub use static_contexts::StaticCalculator;
pub use world::{SharedRewrites, WorldCalculator, shared_rewrites};
