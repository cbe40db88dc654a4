//! SVG rendering for scenes
//!
//! This module is organized into submodules:
//! - `defaults`: Default style values and interaction constants
//! - `context`: StyleContext and the per-node scope behaviors push into
//! - `svg`: Number formatting and SVG element writers
//!
//! A frame walks the tree once. Each node's transform is its parent's
//! composed with its own; behaviors adjust the style for the node's subtree
//! and the drawable writes elements in device space.

pub mod context;
pub mod defaults;
pub mod svg;

pub use context::{NodeScope, Restore, StyleContext};

use glam::{DVec2, dvec2};

use crate::errors::RenderError;
use crate::scene::Node;
use crate::shapes::Shape;
use crate::types::{Bounds, Rgba, Transform};

/// Frame-wide rendering options.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    /// Canvas background, written on the root element.
    pub background: Rgba,
    /// Style in effect at the root before any behavior runs.
    pub style: StyleContext,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background: defaults::BACKGROUND,
            style: StyleContext::default(),
        }
    }
}

/// Render target for one frame.
pub struct Renderer {
    pub(crate) out: String,
    pub(crate) canvas: DVec2,
    /// Current local -> device transform (device y up).
    pub(crate) transform: Transform,
    /// World -> device (y up) view of the frame.
    pub(crate) view: Transform,
    pub(crate) style: StyleContext,
    /// World bounds of the whole scene.
    pub(crate) content: Bounds,
}

impl Renderer {
    pub fn new(canvas: DVec2, view: Transform, style: StyleContext, content: Bounds) -> Self {
        Self {
            out: String::new(),
            canvas,
            transform: view,
            view,
            style,
            content,
        }
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[inline]
    pub fn style(&self) -> &StyleContext {
        &self.style
    }

    #[inline]
    pub fn style_mut(&mut self) -> &mut StyleContext {
        &mut self.style
    }

    #[inline]
    pub fn canvas(&self) -> DVec2 {
        self.canvas
    }

    /// Canvas rectangle in device units.
    pub fn device_bounds(&self) -> Bounds {
        Bounds::from_size(self.canvas.x, self.canvas.y)
    }

    /// World bounds of every visible node in the scene.
    pub fn content_bounds(&self) -> Bounds {
        self.content
    }

    /// Flip a device point (y up) into SVG space (y down).
    #[inline]
    pub fn flip(&self, p: DVec2) -> DVec2 {
        dvec2(p.x, self.canvas.y - p.y)
    }

    /// Map a local point all the way to SVG space.
    pub fn to_svg(&self, local: DVec2, what: &'static str) -> Result<DVec2, RenderError> {
        let p = self.flip(self.transform.apply(local));
        if p.is_finite() {
            Ok(p)
        } else {
            Err(RenderError::NonFinite { what })
        }
    }

    /// Map a world point to SVG space, ignoring the current node frame.
    pub fn world_to_svg(&self, world: DVec2, what: &'static str) -> Result<DVec2, RenderError> {
        let p = self.flip(self.view.apply(world));
        if p.is_finite() {
            Ok(p)
        } else {
            Err(RenderError::NonFinite { what })
        }
    }

    #[inline]
    pub fn view(&self) -> Transform {
        self.view
    }

    /// Draw `node` and its subtree under the current transform and style.
    pub fn draw_node(&mut self, node: &Node) -> Result<(), RenderError> {
        if !node.is_visible() {
            return Ok(());
        }
        let transform = self.transform.compose(&node.local_transform());
        let mut scope = NodeScope::enter(self, transform, node.behaviors());
        node.item().draw_to(&mut scope)
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Render `root` as a complete SVG document.
///
/// `view` maps world coordinates to device coordinates with y up; the flip
/// to SVG's y-down space happens as elements are written.
pub fn render(
    root: &Node,
    view: &Transform,
    canvas: DVec2,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let content = root.bounds_under(&Transform::IDENTITY);
    let mut renderer = Renderer::new(canvas, *view, options.style.clone(), content);
    renderer.open_document(&options.background);
    renderer.draw_node(root)?;
    renderer.close_document();
    crate::log::trace!(bytes = renderer.out.len(), "frame rendered");
    Ok(renderer.finish())
}
