//! Layout and palette constants.
//!
//! Insets and speeds are fractions of the surface dimension, so the default
//! 100×100 viewport-unit surface reproduces the familiar 5..95 bounce box.

/// Default surface width in viewport units.
pub const SURFACE_WIDTH: f64 = 100.0;

/// Default surface height in viewport units.
pub const SURFACE_HEIGHT: f64 = 100.0;

/// Travel rectangle horizontal inset (each side).
pub const TRAVEL_INSET_X: f64 = 0.05;

/// Travel rectangle top inset.
pub const TRAVEL_INSET_TOP: f64 = 0.05;

/// Travel rectangle bottom inset. Keeps bubbles clear of the submit button.
pub const TRAVEL_INSET_BOTTOM: f64 = 0.15;

/// Spawn rectangle horizontal inset (each side).
pub const SPAWN_INSET_X: f64 = 0.10;

/// Spawn rectangle top inset.
pub const SPAWN_INSET_TOP: f64 = 0.10;

/// Spawn rectangle bottom inset.
pub const SPAWN_INSET_BOTTOM: f64 = 0.30;

/// Width of the initial per-axis velocity range, per frame.
/// Components are drawn from [-SPEED_RANGE/2, SPEED_RANGE/2) of the dimension.
pub const SPEED_RANGE: f64 = 0.0016;

/// One-time damping applied to every fresh velocity.
pub const VELOCITY_DAMPING: f64 = 0.7;

/// Proximity threshold is the surface diagonal divided by this.
pub const PROXIMITY_DIVISOR: f64 = 3.0;

/// Upper bound on rendered bubbles after display selection.
pub const MAX_BUBBLES: usize = 10;

/// Floor applied to the set maximum before palette interpolation.
pub const PALETTE_MAX_FLOOR: u32 = 2;
