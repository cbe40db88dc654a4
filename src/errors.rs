//! Error types with diagnostic codes using miette
//!
//! Every failure in the plotter core is a programming-contract failure: the
//! caller handed in data that breaks an invariant. Nothing here is retried.

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// Contract Violations
// ============================================================================

/// A caller broke one of the core's invariants.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("parallel streams have mismatched lengths: column {column} has {found} values, expected {expected}")]
    #[diagnostic(
        code(svgplot::contract::length_mismatch),
        help("every coordinate stream of one drawable must hold the same number of values")
    )]
    LengthMismatch {
        column: usize,
        expected: usize,
        found: usize,
    },

    #[error("{len} interleaved values cannot be split into rows of {arity}")]
    #[diagnostic(code(svgplot::contract::ragged_interleaved))]
    RaggedInterleaved { len: usize, arity: usize },

    #[error("index {index} out of range for {len} rows")]
    #[diagnostic(code(svgplot::contract::index_out_of_range))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("transform scale must be finite and non-zero, got ({sx}, {sy})")]
    #[diagnostic(code(svgplot::contract::degenerate_scale))]
    DegenerateScale { sx: f64, sy: f64 },

    #[error("canvas size must be finite and positive, got {width}x{height}")]
    #[diagnostic(code(svgplot::contract::invalid_canvas))]
    InvalidCanvas { width: f64, height: f64 },

    #[error("zoom range must satisfy 0 < min <= max, got {min}..={max}")]
    #[diagnostic(code(svgplot::contract::invalid_zoom_range))]
    InvalidZoomRange { min: f64, max: f64 },

    #[error("wheel divisor must be finite and positive, got {divisor}")]
    #[diagnostic(code(svgplot::contract::invalid_wheel_divisor))]
    InvalidWheelDivisor { divisor: f64 },

    #[error("{list} list changed while an interaction was routed through it")]
    #[diagnostic(
        code(svgplot::contract::concurrent_modification),
        help("do not add or remove children or behaviors between pointer-down and pointer-up")
    )]
    ConcurrentModification { list: &'static str },

    #[error("claimed interaction no longer resolves to a node")]
    #[diagnostic(code(svgplot::contract::stale_claim))]
    StaleClaim,
}

// ============================================================================
// Composition Errors
// ============================================================================

/// A behavior was attached to a drawable it cannot drive.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("behavior `{behavior}` cannot be attached to a {drawable}")]
#[diagnostic(code(svgplot::composition::unsupported_behavior))]
pub struct CompositionError {
    pub behavior: &'static str,
    pub drawable: &'static str,
    #[help]
    pub help: Option<String>,
}

// ============================================================================
// Render Errors
// ============================================================================

/// Errors that abort a frame. The previous frame's markup stays in place.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("non-finite device coordinate while drawing {what}")]
    #[diagnostic(
        code(svgplot::render::non_finite),
        help("check the drawable's coordinates and the view transform for NaN or infinity")
    )]
    NonFinite { what: &'static str },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Contract(#[from] ContractViolation),
}

// ============================================================================
// Umbrella
// ============================================================================

/// Any error surfaced by the viewport controller.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}
