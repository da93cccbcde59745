//! Well-known context keys.

/// Name of the world the subject is currently in (after rewrites).
pub const WORLD_KEY: &str = "world";

/// Dimension type of the subject's current world.
pub const DIMENSION_TYPE_KEY: &str = "dimension-type";

/// The subject's current game mode.
pub const GAMEMODE_KEY: &str = "gamemode";
