//! Viewport controller: view transform, pointer and wheel input, redraws.
//!
//! The host feeds raw events in and asks for frames. Events mutate the scene
//! and the view and mark the viewport dirty; [`Viewport::request_redraw`]
//! tells the host whether to schedule a frame, at most one outstanding at a
//! time, and [`Viewport::animation_frame`] renders it.

use glam::{DVec2, dvec2};

use crate::behavior::ClaimKind;
use crate::errors::{ContractViolation, PlotError, RenderError};
use crate::log::{debug, trace, warn};
use crate::pointer::{PointerEvent, PointerPhase, PointerSample, WheelEvent};
use crate::render::{self, RenderOptions, defaults};
use crate::scene::Scene;
use crate::types::{Bounds, Rgba, Transform};

/// Tunables of a [`Viewport`].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportOptions {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Wheel delta that changes the zoom by a factor of ten.
    pub wheel_divisor: f64,
    pub render: RenderOptions,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            min_zoom: defaults::MIN_ZOOM,
            max_zoom: defaults::MAX_ZOOM,
            wheel_divisor: defaults::WHEEL_DIVISOR,
            render: RenderOptions::default(),
        }
    }
}

impl ViewportOptions {
    /// Check the zoom range and wheel divisor.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !(min.is_finite() && max.is_finite() && 0.0 < min && min <= max) {
            return Err(ContractViolation::InvalidZoomRange { min, max });
        }
        let divisor = self.wheel_divisor;
        if !(divisor.is_finite() && divisor > 0.0) {
            return Err(ContractViolation::InvalidWheelDivisor { divisor });
        }
        Ok(())
    }

    pub fn with_background(mut self, background: Rgba) -> Self {
        self.render.background = background;
        self
    }
}

/// What the pointer is doing right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Panning,
    DraggingNode,
    Sketching,
    /// Only observable while a wheel event is being applied.
    Zooming,
}

impl From<ClaimKind> for InteractionState {
    fn from(kind: ClaimKind) -> Self {
        match kind {
            ClaimKind::Pan => InteractionState::Panning,
            ClaimKind::Drag => InteractionState::DraggingNode,
            ClaimKind::Sketch => InteractionState::Sketching,
        }
    }
}

/// View transform that fits `bounds` into a `canvas`-sized device rectangle.
///
/// The scale is uniform, taken from the shorter canvas side over the longer
/// bounds side, and the content is centered. Empty or zero-size bounds give
/// scale 1 with the world origin at the canvas center.
pub fn fit_transform(bounds: &Bounds, canvas: DVec2) -> Transform {
    let extent = bounds.width().max(bounds.height());
    if bounds.is_empty() || !extent.is_finite() || extent <= 0.0 {
        let c = canvas * 0.5;
        return Transform::uniform(1.0, c.x, c.y);
    }
    let scale = canvas.x.min(canvas.y) / extent;
    let t = canvas * 0.5 - bounds.center() * scale;
    Transform::uniform(scale, t.x, t.y)
}

fn validate_canvas(width: f64, height: f64) -> Result<DVec2, ContractViolation> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(dvec2(width, height))
    } else {
        Err(ContractViolation::InvalidCanvas { width, height })
    }
}

/// Interactive view onto a [`Scene`].
pub struct Viewport {
    scene: Scene,
    canvas: DVec2,
    /// World -> device, device y up.
    view: Transform,
    options: ViewportOptions,
    state: InteractionState,
    dirty: bool,
    frame_pending: bool,
    markup: String,
}

impl Viewport {
    /// Viewport over `scene`, fitted to its content.
    pub fn new(scene: Scene, width: f64, height: f64) -> Result<Self, PlotError> {
        Self::with_options(scene, width, height, ViewportOptions::default())
    }

    pub fn with_options(
        scene: Scene,
        width: f64,
        height: f64,
        options: ViewportOptions,
    ) -> Result<Self, PlotError> {
        let canvas = validate_canvas(width, height)?;
        options.validate()?;
        let mut viewport = Self {
            scene,
            canvas,
            view: Transform::IDENTITY,
            options,
            state: InteractionState::Idle,
            dirty: true,
            frame_pending: false,
            markup: String::new(),
        };
        viewport.fit_to_content();
        Ok(viewport)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access; the next frame redraws.
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.dirty = true;
        &mut self.scene
    }

    #[inline]
    pub fn view(&self) -> Transform {
        self.view
    }

    pub fn set_view(&mut self, view: Transform) -> Result<(), ContractViolation> {
        view.validate()?;
        self.view = view;
        self.dirty = true;
        Ok(())
    }

    #[inline]
    pub fn canvas(&self) -> DVec2 {
        self.canvas
    }

    pub fn device_bounds(&self) -> Bounds {
        Bounds::from_size(self.canvas.x, self.canvas.y)
    }

    #[inline]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn options(&self) -> &ViewportOptions {
        &self.options
    }

    /// New canvas size; the view is kept as it is.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), ContractViolation> {
        self.canvas = validate_canvas(width, height)?;
        self.dirty = true;
        debug!(width, height, "canvas resized");
        Ok(())
    }

    /// Reset the view so the whole scene is visible.
    pub fn fit_to_content(&mut self) {
        self.scene.invalidate_bounds();
        let bounds = self.scene.bounds();
        self.view = fit_transform(&bounds, self.canvas);
        self.dirty = true;
        debug!(%bounds, view = %self.view, "view fitted");
    }

    /// Host device point (y down) in world coordinates.
    pub fn device_to_world(&self, x: f64, y: f64) -> DVec2 {
        self.view.apply_inverse(dvec2(x, self.canvas.y - y))
    }

    pub fn pointer_down(&mut self, event: PointerEvent) -> Result<(), PlotError> {
        self.pointer(PointerPhase::Down, event)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> Result<(), PlotError> {
        self.pointer(PointerPhase::Move, event)
    }

    pub fn pointer_up(&mut self, event: PointerEvent) -> Result<(), PlotError> {
        self.pointer(PointerPhase::Up, event)
    }

    /// Abandon the current interaction, e.g. when the pointer leaves.
    pub fn cancel_interaction(&mut self) {
        self.scene.cancel_claim();
        self.set_state(InteractionState::Idle);
    }

    /// Zoom about the pointer, then treat the event as a move so hover
    /// behaviors follow the new view. A pan or drag in progress continues
    /// from the zoomed view.
    pub fn wheel(&mut self, event: WheelEvent) -> Result<(), PlotError> {
        let previous = self.state;
        self.set_state(InteractionState::Zooming);

        let anchor = dvec2(event.x, self.canvas.y - event.y);
        let world = self.view.apply_inverse(anchor);
        let zoom = (self.view.max_scale() * 10f64.powf(-event.delta_y / self.options.wheel_divisor))
            .clamp(self.options.min_zoom, self.options.max_zoom);
        let scale = dvec2(
            zoom.copysign(self.view.scale.x),
            zoom.copysign(self.view.scale.y),
        );
        let view = Transform {
            scale,
            translate: anchor - world * scale,
        };
        self.set_state(previous);
        view.validate()?;
        trace!(zoom, delta = event.delta_y, "wheel zoom");
        self.view = view;
        self.dirty = true;
        if let Err(e) = self.scene.rebase_claim(view, anchor) {
            self.set_state(InteractionState::Idle);
            return Err(e.into());
        }

        let moved = PointerEvent::new(event.x, event.y).with_modifiers(event.modifiers);
        self.pointer(PointerPhase::Move, moved)
    }

    fn pointer(&mut self, phase: PointerPhase, event: PointerEvent) -> Result<(), PlotError> {
        let mut sample = PointerSample::new(
            self.device_bounds(),
            self.view,
            dvec2(event.x, event.y),
            event.button,
            event.modifiers,
        );
        let dispatched = self.scene.dispatch(phase, &mut sample);

        if sample.viewport_transform != self.view {
            sample.viewport_transform.validate()?;
            self.view = sample.viewport_transform;
            self.dirty = true;
        }
        if sample.needs_redraw {
            self.dirty = true;
        }
        let state = self
            .scene
            .claim()
            .map_or(InteractionState::Idle, |c| c.kind.into());
        self.set_state(state);
        dispatched.map_err(PlotError::from)
    }

    fn set_state(&mut self, state: InteractionState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "interaction state");
            self.state = state;
        }
    }

    // ------------------------------------------------------------------
    // Redraw
    // ------------------------------------------------------------------

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the viewport for redraw without changing anything.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether the host should schedule a frame now. True at most once until
    /// [`Viewport::animation_frame`] runs.
    pub fn request_redraw(&mut self) -> bool {
        if self.dirty && !self.frame_pending {
            self.frame_pending = true;
            true
        } else {
            false
        }
    }

    /// Render the pending frame if anything changed.
    ///
    /// Returns whether new markup was produced. On error the previous
    /// markup stays current.
    pub fn animation_frame(&mut self) -> Result<bool, RenderError> {
        self.frame_pending = false;
        if !self.dirty {
            return Ok(false);
        }
        self.dirty = false;
        match self.render() {
            Ok(markup) => {
                self.markup = markup;
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "frame aborted, keeping previous markup");
                Err(e)
            }
        }
    }

    /// Render the current state without touching the redraw bookkeeping.
    pub fn render(&self) -> Result<String, RenderError> {
        render::render(self.scene.root(), &self.view, self.canvas, &self.options.render)
    }

    /// Markup of the last successful frame.
    pub fn markup(&self) -> &str {
        &self.markup
    }
}
