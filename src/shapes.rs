//! Drawables
//!
//! Every drawable implements [`Shape`]; [`Drawable`] is the closed set the
//! scene stores, dispatched with `enum_dispatch`. Batch drawables keep their
//! per-item values in [`Streams`] so the columns cannot drift apart.

use enum_dispatch::enum_dispatch;
use glam::{DVec2, dvec2};

use crate::errors::{ContractViolation, RenderError};
use crate::grid::GridLines;
use crate::group::Group;
use crate::render::Renderer;
use crate::streams::Streams;
use crate::types::{Bounds, Transform};

/// Common interface of everything that can sit in a scene node.
#[enum_dispatch]
pub trait Shape {
    /// Short name used in diagnostics.
    fn kind(&self) -> &'static str;

    /// Values per item (2 for points, 3 for circles with radius, ...).
    fn component_arity(&self) -> usize;

    /// Bounds of the item in the frame `transform` maps to.
    /// Drawables with no world extent return [`Bounds::EMPTY`].
    fn bounds_under(&self, transform: &Transform) -> Bounds;

    /// Write this item's elements using the renderer's current transform
    /// and style.
    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError>;
}

/// Every drawable a node can hold.
#[enum_dispatch(Shape)]
#[derive(Clone, Debug, PartialEq)]
pub enum Drawable {
    Group,
    Circle,
    CircleBatch,
    Ellipse,
    EllipseBatch,
    LineStrip,
    LineBatch,
    PointBatch,
    Polygon,
    Rectangle,
    RectangleBatch,
    Text,
    GridLines,
    Backdrop,
}

impl Drawable {
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Drawable::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Drawable::Group(g) => Some(g),
            _ => None,
        }
    }
}

fn to_svg_all(
    renderer: &Renderer,
    points: impl IntoIterator<Item = DVec2>,
    what: &'static str,
) -> Result<Vec<DVec2>, RenderError> {
    points
        .into_iter()
        .map(|p| renderer.to_svg(p, what))
        .collect()
}

/// Device radii of a local radius pair under the current transform.
fn device_radii(renderer: &Renderer, radii: DVec2, what: &'static str) -> Result<DVec2, RenderError> {
    let r = (radii * renderer.transform().scale).abs();
    if r.is_finite() {
        Ok(r)
    } else {
        Err(RenderError::NonFinite { what })
    }
}

// ============================================================================
// Circles and ellipses
// ============================================================================

/// Circles of one shared radius.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circle {
    pub radius: f64,
    pub centers: Streams<2>,
}

impl Circle {
    pub fn new(radius: f64, centers: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            radius,
            centers: Streams::from_interleaved(centers)?,
        })
    }
}

impl Shape for Circle {
    fn kind(&self) -> &'static str {
        "circle"
    }

    fn component_arity(&self) -> usize {
        self.centers.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = Bounds::from_points(self.centers.points()).inflate(DVec2::splat(self.radius.abs()));
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let radii = device_radii(renderer, DVec2::splat(self.radius), "circle")?;
        for c in self.centers.points() {
            let c = renderer.to_svg(c, "circle")?;
            renderer.ellipse(c, radii);
        }
        Ok(())
    }
}

/// Circles with individual radii: rows of `(x, y, r)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CircleBatch {
    pub data: Streams<3>,
}

impl CircleBatch {
    pub fn new(values: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            data: Streams::from_interleaved(values)?,
        })
    }
}

impl Shape for CircleBatch {
    fn kind(&self) -> &'static str {
        "circle batch"
    }

    fn component_arity(&self) -> usize {
        self.data.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = self.data.rows().fold(Bounds::EMPTY, |acc, [x, y, r]| {
            acc.union(&Bounds::from_corners(dvec2(x, y), dvec2(x, y)).inflate(DVec2::splat(r.abs())))
        });
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for [x, y, r] in self.data.rows() {
            let c = renderer.to_svg(dvec2(x, y), "circle batch")?;
            let radii = device_radii(renderer, DVec2::splat(r), "circle batch")?;
            renderer.ellipse(c, radii);
        }
        Ok(())
    }
}

/// Ellipses sharing one pair of radii.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ellipse {
    pub radii: DVec2,
    pub centers: Streams<2>,
}

impl Ellipse {
    pub fn new(rx: f64, ry: f64, centers: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            radii: dvec2(rx, ry),
            centers: Streams::from_interleaved(centers)?,
        })
    }
}

impl Shape for Ellipse {
    fn kind(&self) -> &'static str {
        "ellipse"
    }

    fn component_arity(&self) -> usize {
        self.centers.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = Bounds::from_points(self.centers.points()).inflate(self.radii.abs());
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let radii = device_radii(renderer, self.radii, "ellipse")?;
        for c in self.centers.points() {
            let c = renderer.to_svg(c, "ellipse")?;
            renderer.ellipse(c, radii);
        }
        Ok(())
    }
}

/// Ellipses with individual radii: rows of `(x, y, rx, ry)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EllipseBatch {
    pub data: Streams<4>,
}

impl EllipseBatch {
    pub fn new(values: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            data: Streams::from_interleaved(values)?,
        })
    }
}

impl Shape for EllipseBatch {
    fn kind(&self) -> &'static str {
        "ellipse batch"
    }

    fn component_arity(&self) -> usize {
        self.data.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = self.data.rows().fold(Bounds::EMPTY, |acc, [x, y, rx, ry]| {
            acc.union(&Bounds::from_corners(dvec2(x, y), dvec2(x, y)).inflate(dvec2(rx, ry).abs()))
        });
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for [x, y, rx, ry] in self.data.rows() {
            let c = renderer.to_svg(dvec2(x, y), "ellipse batch")?;
            let radii = device_radii(renderer, dvec2(rx, ry), "ellipse batch")?;
            renderer.ellipse(c, radii);
        }
        Ok(())
    }
}

// ============================================================================
// Lines, points and polygons
// ============================================================================

/// One connected path through its points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineStrip {
    pub points: Streams<2>,
}

impl LineStrip {
    pub fn new(points: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            points: Streams::from_interleaved(points)?,
        })
    }
}

impl Shape for LineStrip {
    fn kind(&self) -> &'static str {
        "line strip"
    }

    fn component_arity(&self) -> usize {
        self.points.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        transform.map_bounds(&Bounds::from_points(self.points.points()))
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        if self.points.len() < 2 {
            return Ok(());
        }
        let pts = to_svg_all(renderer, self.points.points(), "line strip")?;
        renderer.polyline(&pts);
        for pair in pts.windows(2) {
            renderer.chevrons(pair[0], pair[1]);
        }
        renderer.vertex_dots(&pts);
        Ok(())
    }
}

/// Independent segments: rows of `(x1, y1, x2, y2)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineBatch {
    pub lines: Streams<4>,
}

impl LineBatch {
    pub fn new(values: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            lines: Streams::from_interleaved(values)?,
        })
    }
}

impl Shape for LineBatch {
    fn kind(&self) -> &'static str {
        "line batch"
    }

    fn component_arity(&self) -> usize {
        self.lines.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = Bounds::from_points(
            self.lines
                .rows()
                .flat_map(|[x1, y1, x2, y2]| [dvec2(x1, y1), dvec2(x2, y2)]),
        );
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for [x1, y1, x2, y2] in self.lines.rows() {
            let a = renderer.to_svg(dvec2(x1, y1), "line batch")?;
            let b = renderer.to_svg(dvec2(x2, y2), "line batch")?;
            renderer.polyline(&[a, b]);
            renderer.chevrons(a, b);
            renderer.vertex_dots(&[a, b]);
        }
        Ok(())
    }
}

/// Isolated points, drawn as dots in the stroke color.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointBatch {
    pub points: Streams<2>,
}

impl PointBatch {
    pub fn new(points: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            points: Streams::from_interleaved(points)?,
        })
    }
}

impl Shape for PointBatch {
    fn kind(&self) -> &'static str {
        "point batch"
    }

    fn component_arity(&self) -> usize {
        self.points.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        transform.map_bounds(&Bounds::from_points(self.points.points()))
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let radius = renderer.style().point_radius.max(1.0);
        for p in self.points.points() {
            let p = renderer.to_svg(p, "point batch")?;
            renderer.dot(p, radius);
        }
        Ok(())
    }
}

/// Closed filled outline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub points: Streams<2>,
}

impl Polygon {
    pub fn new(points: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            points: Streams::from_interleaved(points)?,
        })
    }
}

impl Shape for Polygon {
    fn kind(&self) -> &'static str {
        "polygon"
    }

    fn component_arity(&self) -> usize {
        self.points.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        transform.map_bounds(&Bounds::from_points(self.points.points()))
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let pts = to_svg_all(renderer, self.points.points(), "polygon")?;
        if pts.len() < 3 {
            return Ok(());
        }
        renderer.polygon(&pts);
        // Closing edge first, then around.
        let mut prev = pts[pts.len() - 1];
        for p in &pts {
            renderer.chevrons(prev, *p);
            prev = *p;
        }
        renderer.vertex_dots(&pts);
        Ok(())
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// Rectangles of one shared size, anchored at their lower-left corners.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rectangle {
    pub size: DVec2,
    pub corners: Streams<2>,
}

impl Rectangle {
    pub fn new(width: f64, height: f64, corners: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            size: dvec2(width, height),
            corners: Streams::from_interleaved(corners)?,
        })
    }
}

impl Shape for Rectangle {
    fn kind(&self) -> &'static str {
        "rectangle"
    }

    fn component_arity(&self) -> usize {
        self.corners.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = Bounds::from_points(self.corners.points().flat_map(|c| [c, c + self.size]));
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for c in self.corners.points() {
            let a = renderer.to_svg(c, "rectangle")?;
            let b = renderer.to_svg(c + self.size, "rectangle")?;
            renderer.rect(a, b);
        }
        Ok(())
    }
}

/// Rectangles with individual sizes: rows of `(x, y, width, height)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectangleBatch {
    pub data: Streams<4>,
}

impl RectangleBatch {
    pub fn new(values: &[f64]) -> Result<Self, ContractViolation> {
        Ok(Self {
            data: Streams::from_interleaved(values)?,
        })
    }
}

impl Shape for RectangleBatch {
    fn kind(&self) -> &'static str {
        "rectangle batch"
    }

    fn component_arity(&self) -> usize {
        self.data.arity()
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        let b = Bounds::from_points(
            self.data
                .rows()
                .flat_map(|[x, y, w, h]| [dvec2(x, y), dvec2(x + w, y + h)]),
        );
        transform.map_bounds(&b)
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        for [x, y, w, h] in self.data.rows() {
            let a = renderer.to_svg(dvec2(x, y), "rectangle batch")?;
            let b = renderer.to_svg(dvec2(x + w, y + h), "rectangle batch")?;
            renderer.rect(a, b);
        }
        Ok(())
    }
}

// ============================================================================
// Text
// ============================================================================

/// What a [`Text`] position and size are measured in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Local coordinates; the size scales with the view.
    #[default]
    World,
    /// SVG device coordinates (y down) and pixel size, unaffected by the view.
    Device,
}

/// A single label.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub position: DVec2,
    pub size: f64,
    pub content: String,
    pub anchor: TextAnchor,
}

impl Text {
    pub fn new(x: f64, y: f64, size: f64, content: impl Into<String>) -> Self {
        Self {
            position: dvec2(x, y),
            size,
            content: content.into(),
            anchor: TextAnchor::World,
        }
    }

    /// Label pinned to the canvas instead of the world.
    pub fn device(x: f64, y: f64, size: f64, content: impl Into<String>) -> Self {
        Self {
            anchor: TextAnchor::Device,
            ..Self::new(x, y, size, content)
        }
    }
}

impl Default for Text {
    fn default() -> Self {
        Self::new(0.0, 0.0, 12.0, "")
    }
}

impl Shape for Text {
    fn kind(&self) -> &'static str {
        "text"
    }

    fn component_arity(&self) -> usize {
        2
    }

    fn bounds_under(&self, transform: &Transform) -> Bounds {
        match self.anchor {
            TextAnchor::World => transform.map_bounds(&Bounds::from_points([self.position])),
            TextAnchor::Device => Bounds::EMPTY,
        }
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        if self.content.is_empty() {
            return Ok(());
        }
        let (at, size) = match self.anchor {
            TextAnchor::World => (
                renderer.to_svg(self.position, "text")?,
                self.size * renderer.transform().scale.x,
            ),
            TextAnchor::Device => (self.position, self.size),
        };
        if !at.is_finite() || !size.is_finite() {
            return Err(RenderError::NonFinite { what: "text" });
        }
        renderer.text(at, size, &self.content);
        Ok(())
    }
}

// ============================================================================
// Backdrop
// ============================================================================

/// Rectangle around the whole scene's content, in the current style.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Backdrop;

impl Shape for Backdrop {
    fn kind(&self) -> &'static str {
        "backdrop"
    }

    fn component_arity(&self) -> usize {
        0
    }

    fn bounds_under(&self, _transform: &Transform) -> Bounds {
        Bounds::EMPTY
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let content = renderer.content_bounds();
        if content.is_empty() {
            return Ok(());
        }
        // Content bounds are world units, whatever frame this node sits in.
        let a = renderer.world_to_svg(content.min, "backdrop")?;
        let b = renderer.world_to_svg(content.max, "backdrop")?;
        renderer.rect(a, b);
        Ok(())
    }
}
