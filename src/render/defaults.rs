//! Default style values and interaction constants (device pixels unless noted)

use crate::types::Rgba;

pub const STROKE: Rgba = Rgba::BLACK;
pub const STROKE_WIDTH: f64 = 1.0;
pub const FONT: &str = "Verdana";
/// Zero means vertices of line-like drawables get no dots.
pub const POINT_RADIUS: f64 = 0.0;
pub const BACKGROUND: Rgba = Rgba::WHITE;

// Direction marker chevrons
pub const MARKER_LENGTH: f64 = 6.0;
pub const MARKER_SPREAD: f64 = 4.0;
/// Segments shorter than this get no chevrons.
pub const MARKER_MIN_LENGTH: f64 = 1e-12;

// Adaptive grid
pub const GRID_MINOR: Rgba = Rgba::rgb(0.9, 0.9, 1.0);
pub const GRID_MAJOR: Rgba = Rgba::rgb(0.5, 0.5, 1.0);
pub const GRID_AXIS: Rgba = Rgba::rgb(1.0, 0.7, 0.7);
/// Finest band spacing is roughly this many pixels.
pub const GRID_TARGET_SPACING: f64 = 5.0;
/// Lines closer together than this are not emitted.
pub const GRID_MIN_SPACING: f64 = 0.5;

// Viewport
pub const MIN_ZOOM: f64 = 1e-4;
pub const MAX_ZOOM: f64 = 1e4;
pub const WHEEL_DIVISOR: f64 = 300.0;

// Hover readouts
pub const READOUT_OFFSET: f64 = 3.0;
pub const READOUT_FONT_SIZE: f64 = 12.0;
pub const CROSSHAIR_HALF_LENGTH: f64 = 10.0;
