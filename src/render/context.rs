//! Rendering context - the style state behaviors push and pop during a frame

use std::ops::{Deref, DerefMut};

use super::Renderer;
use super::defaults;
use crate::behavior::Behavior;
use crate::types::{Rgba, Transform};

/// Style in effect while a subtree is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleContext {
    /// Stroke color; also the fill of vertex dots.
    pub stroke: Rgba,
    /// `None` draws closed shapes unfilled.
    pub fill: Option<Rgba>,
    pub stroke_width: f64,
    pub font: String,
    /// Draw direction chevrons at segment ends.
    pub marker: bool,
    /// Vertex dot radius in pixels.
    pub point_radius: f64,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            stroke: defaults::STROKE,
            fill: None,
            stroke_width: defaults::STROKE_WIDTH,
            font: defaults::FONT.to_string(),
            marker: false,
            point_radius: defaults::POINT_RADIUS,
        }
    }
}

/// The value a behavior overwrote, handed back when its scope ends.
#[derive(Clone, Debug, PartialEq)]
pub enum Restore {
    Stroke(Rgba),
    Fill(Option<Rgba>),
    StrokeWidth(f64),
    Font(String),
    Marker(bool),
    PointRadius(f64),
    /// The behavior did not touch the style.
    Untouched,
}

impl StyleContext {
    pub fn set_stroke(&mut self, color: Rgba) -> Restore {
        Restore::Stroke(std::mem::replace(&mut self.stroke, color))
    }

    pub fn set_fill(&mut self, fill: Option<Rgba>) -> Restore {
        Restore::Fill(std::mem::replace(&mut self.fill, fill))
    }

    pub fn set_stroke_width(&mut self, width: f64) -> Restore {
        Restore::StrokeWidth(std::mem::replace(&mut self.stroke_width, width))
    }

    pub fn set_font(&mut self, font: &str) -> Restore {
        Restore::Font(std::mem::replace(&mut self.font, font.to_string()))
    }

    pub fn set_marker(&mut self, marker: bool) -> Restore {
        Restore::Marker(std::mem::replace(&mut self.marker, marker))
    }

    pub fn set_point_radius(&mut self, radius: f64) -> Restore {
        Restore::PointRadius(std::mem::replace(&mut self.point_radius, radius))
    }

    pub fn restore(&mut self, token: Restore) {
        match token {
            Restore::Stroke(v) => self.stroke = v,
            Restore::Fill(v) => self.fill = v,
            Restore::StrokeWidth(v) => self.stroke_width = v,
            Restore::Font(v) => self.font = v,
            Restore::Marker(v) => self.marker = v,
            Restore::PointRadius(v) => self.point_radius = v,
            Restore::Untouched => {}
        }
    }
}

/// Scope of one node during a frame.
///
/// Entering installs the node's transform and runs each behavior's style
/// hook in attachment order. Dropping the scope undoes both, behaviors in
/// reverse order, so an early `?` return inside a subtree still leaves the
/// renderer as the parent saw it.
pub struct NodeScope<'r> {
    renderer: &'r mut Renderer,
    parent_transform: Transform,
    tokens: Vec<Restore>,
}

impl<'r> NodeScope<'r> {
    pub fn enter(renderer: &'r mut Renderer, transform: Transform, behaviors: &[Behavior]) -> Self {
        let parent_transform = std::mem::replace(&mut renderer.transform, transform);
        let tokens = behaviors
            .iter()
            .map(|b| b.enter_style(&mut renderer.style))
            .collect();
        Self {
            renderer,
            parent_transform,
            tokens,
        }
    }
}

impl Deref for NodeScope<'_> {
    type Target = Renderer;

    fn deref(&self) -> &Renderer {
        self.renderer
    }
}

impl DerefMut for NodeScope<'_> {
    fn deref_mut(&mut self) -> &mut Renderer {
        self.renderer
    }
}

impl Drop for NodeScope<'_> {
    fn drop(&mut self) {
        while let Some(token) = self.tokens.pop() {
            self.renderer.style.restore(token);
        }
        self.renderer.transform = self.parent_transform;
    }
}
