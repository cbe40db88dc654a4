//! Interactive 2-D vector plotting.
//!
//! A [`Scene`] is a tree of [`Node`]s, each holding one [`Drawable`] and a
//! list of [`Behavior`]s. Groups nest children under their own transform.
//! A [`Viewport`] puts the scene on a canvas: it owns the world -> device
//! view, turns host pointer and wheel events into pans, zooms and drags, and
//! renders frames to SVG markup.
//!
//! ```
//! use svgplot::{Circle, Node, Scene, render_scene};
//!
//! let mut scene = Scene::new();
//! scene.add_children([Node::new(Circle::new(5.0, &[10.0, 10.0]).unwrap())]);
//! let svg = render_scene(&scene, 100.0, 100.0).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```

pub mod behavior;
pub mod errors;
pub mod grid;
pub mod group;
mod log;
pub mod pointer;
pub mod render;
pub mod scene;
pub mod shapes;
pub mod streams;
pub mod types;
pub mod viewport;

pub use behavior::{Behavior, ClaimKind};
pub use errors::{CompositionError, ContractViolation, PlotError, RenderError};
pub use grid::GridLines;
pub use group::Group;
pub use pointer::{Chord, Modifiers, PointerEvent, PointerPhase, PointerSample, WheelEvent};
pub use render::{RenderOptions, StyleContext, render};
pub use scene::{Claim, Node, Scene};
pub use shapes::{
    Backdrop, Circle, CircleBatch, Drawable, Ellipse, EllipseBatch, LineBatch, LineStrip,
    PointBatch, Polygon, Rectangle, RectangleBatch, Shape, Text, TextAnchor,
};
pub use streams::Streams;
pub use types::{Bounds, Rgba, Transform};
pub use viewport::{InteractionState, Viewport, ViewportOptions, fit_transform};

/// Render `scene` once, fitted to a `width` x `height` canvas.
pub fn render_scene(scene: &Scene, width: f64, height: f64) -> Result<String, PlotError> {
    let viewport = Viewport::new(scene.clone(), width, height)?;
    Ok(viewport.render()?)
}
