//! Behaviors: per-node modifiers of style and pointer handling.
//!
//! A node runs its behaviors in attachment order when a frame or a pointer
//! event enters it and in reverse order when it leaves. Style behaviors
//! overwrite one field of the [`StyleContext`] and hand back a [`Restore`]
//! token; interaction behaviors watch pointer events and may claim a
//! press-move-release sequence.

use glam::DVec2;

use crate::errors::{CompositionError, ContractViolation};
use crate::log::debug;
use crate::pointer::{Chord, PointerPhase, PointerSample};
use crate::render::defaults;
use crate::render::svg::fmt_num;
use crate::render::{Restore, StyleContext};
use crate::shapes::{Drawable, Shape, TextAnchor};
use crate::types::{Rgba, Transform};

/// What a claimed interaction is doing, for [`crate::InteractionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimKind {
    Pan,
    Drag,
    Sketch,
}

/// Drag state captured at pointer-down.
#[derive(Clone, Copy, Debug, PartialEq)]
struct DragCapture {
    /// Group transform when the drag started.
    original: Transform,
    /// Pointer in the group's parent frame when the drag started.
    anchor: DVec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PanCapture {
    view: Transform,
    /// Pointer in device units (y up) when the pan started.
    anchor: DVec2,
}

/// Moves its group with the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Drag {
    pub chord: Chord,
    capture: Option<DragCapture>,
}

/// Moves the whole view with the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct Pan {
    pub chord: Chord,
    capture: Option<PanCapture>,
}

/// Rubber-band line drawing into a line batch.
#[derive(Clone, Debug, PartialEq)]
pub struct Sketch {
    pub chord: Chord,
    active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    /// Stroke color of the subtree.
    Stroke(Rgba),
    /// Fill of closed shapes in the subtree; `None` for unfilled.
    Fill(Option<Rgba>),
    StrokeWidth(f64),
    Font(String),
    /// Direction chevrons at segment ends.
    Marker(bool),
    /// Vertex dot radius in pixels.
    PointRadius(f64),
    Draggable(Drag),
    ViewportPan(Pan),
    /// Appends a point to its point batch on every matching click.
    PointCollector(Chord),
    LineSketch(Sketch),
    /// Keeps its text next to the pointer showing world coordinates.
    CursorReadout,
    /// Keeps its line batch as a cross centered on the pointer.
    Crosshair,
}

/// State a behavior sees while handling one pointer event at one node.
pub(crate) struct Visit<'a> {
    pub phase: PointerPhase,
    pub sample: &'a mut PointerSample,
    /// Parent frame -> device (y up); the node's own frame is in
    /// `sample.world_transform`.
    pub parent: Transform,
}

impl Behavior {
    pub fn stroke(color: Rgba) -> Self {
        Behavior::Stroke(color)
    }

    pub fn fill(color: Rgba) -> Self {
        Behavior::Fill(Some(color))
    }

    pub fn font(family: impl Into<String>) -> Self {
        Behavior::Font(family.into())
    }

    pub fn draggable() -> Self {
        Self::draggable_with(Chord::PRIMARY)
    }

    pub fn draggable_with(chord: Chord) -> Self {
        Behavior::Draggable(Drag {
            chord,
            capture: None,
        })
    }

    pub fn viewport_pan() -> Self {
        Self::viewport_pan_with(Chord::PRIMARY)
    }

    pub fn viewport_pan_with(chord: Chord) -> Self {
        Behavior::ViewportPan(Pan {
            chord,
            capture: None,
        })
    }

    /// Shift-click collects points.
    pub fn point_collector() -> Self {
        Behavior::PointCollector(Chord::SHIFT_PRIMARY)
    }

    /// Alt-drag sketches lines.
    pub fn line_sketch() -> Self {
        Self::line_sketch_with(Chord::ALT_PRIMARY)
    }

    pub fn line_sketch_with(chord: Chord) -> Self {
        Behavior::LineSketch(Sketch {
            chord,
            active: false,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Behavior::Stroke(_) => "stroke",
            Behavior::Fill(_) => "fill",
            Behavior::StrokeWidth(_) => "stroke width",
            Behavior::Font(_) => "font",
            Behavior::Marker(_) => "marker",
            Behavior::PointRadius(_) => "point radius",
            Behavior::Draggable(_) => "draggable",
            Behavior::ViewportPan(_) => "viewport pan",
            Behavior::PointCollector(_) => "point collector",
            Behavior::LineSketch(_) => "line sketch",
            Behavior::CursorReadout => "cursor readout",
            Behavior::Crosshair => "crosshair",
        }
    }

    /// True while this behavior holds state from a pointer-down.
    pub fn is_engaged(&self) -> bool {
        match self {
            Behavior::Draggable(d) => d.capture.is_some(),
            Behavior::ViewportPan(p) => p.capture.is_some(),
            Behavior::LineSketch(s) => s.active,
            _ => false,
        }
    }

    /// Reject pairings whose pointer handling has nothing to act on.
    pub fn check_target(&self, item: &Drawable) -> Result<(), CompositionError> {
        let (fits, help) = match self {
            Behavior::Draggable(_) => (
                matches!(item, Drawable::Group(_)),
                "wrap the drawable in a group and make the group draggable",
            ),
            Behavior::PointCollector(_) => (
                matches!(item, Drawable::PointBatch(_)),
                "collected points are stored in a point batch",
            ),
            Behavior::LineSketch(_) => (
                matches!(item, Drawable::LineBatch(_)),
                "sketched lines are stored in a line batch",
            ),
            Behavior::Crosshair => (
                matches!(item, Drawable::LineBatch(_)),
                "the crosshair is drawn as a line batch",
            ),
            Behavior::CursorReadout => (
                matches!(item, Drawable::Text(_)),
                "the readout is drawn as a text label",
            ),
            _ => (true, ""),
        };
        if fits {
            Ok(())
        } else {
            Err(CompositionError {
                behavior: self.name(),
                drawable: item.kind(),
                help: Some(help.to_string()),
            })
        }
    }

    /// Apply this behavior's style change, returning what it replaced.
    pub fn enter_style(&self, style: &mut StyleContext) -> Restore {
        match self {
            Behavior::Stroke(c) => style.set_stroke(*c),
            Behavior::Fill(c) => style.set_fill(*c),
            Behavior::StrokeWidth(w) => style.set_stroke_width(*w),
            Behavior::Font(f) => style.set_font(f),
            Behavior::Marker(m) => style.set_marker(*m),
            Behavior::PointRadius(r) => style.set_point_radius(*r),
            _ => Restore::Untouched,
        }
    }

    /// Pre-order hook, before the node's children see the event.
    pub(crate) fn pointer_enter(
        &mut self,
        item: &mut Drawable,
        visit: &mut Visit<'_>,
    ) -> Option<ClaimKind> {
        let sample = &mut *visit.sample;
        match (self, visit.phase) {
            (Behavior::Draggable(drag), PointerPhase::Down) => {
                if sample.consumed || sample.chord() != drag.chord {
                    return None;
                }
                let hit = item.bounds_under(&sample.world_transform);
                if !hit.contains(sample.device_up()) {
                    return None;
                }
                let group = item.as_group()?;
                drag.capture = Some(DragCapture {
                    original: group.transform(),
                    anchor: visit.parent.apply_inverse(sample.device_up()),
                });
                sample.consumed = true;
                debug!(anchor = ?sample.device_up(), "drag claimed");
                Some(ClaimKind::Drag)
            }
            (Behavior::PointCollector(chord), PointerPhase::Down) => {
                if sample.consumed || sample.chord() != *chord {
                    return None;
                }
                if let Drawable::PointBatch(batch) = item {
                    let p = sample.local();
                    batch.points.push([p.x, p.y]);
                    sample.consumed = true;
                    sample.needs_redraw = true;
                    debug!(x = p.x, y = p.y, "point collected");
                }
                None
            }
            (Behavior::LineSketch(sketch), PointerPhase::Down) => {
                if sample.consumed || sample.chord() != sketch.chord {
                    return None;
                }
                let Drawable::LineBatch(batch) = item else {
                    return None;
                };
                let p = sample.local();
                batch.lines.push([p.x, p.y, p.x, p.y]);
                sketch.active = true;
                sample.consumed = true;
                sample.needs_redraw = true;
                debug!(x = p.x, y = p.y, "sketch started");
                Some(ClaimKind::Sketch)
            }
            (Behavior::CursorReadout, PointerPhase::Move) => {
                if let Drawable::Text(text) = item {
                    text.anchor = TextAnchor::Device;
                    text.position = sample.device
                        + DVec2::new(defaults::READOUT_OFFSET, -defaults::READOUT_OFFSET);
                    text.content = format!("{}, {}", fmt_num(sample.world.x), fmt_num(sample.world.y));
                    sample.needs_redraw = true;
                }
                None
            }
            (Behavior::Crosshair, PointerPhase::Move) => {
                if let Drawable::LineBatch(batch) = item {
                    let p = sample.local();
                    let half = defaults::CROSSHAIR_HALF_LENGTH / sample.world_transform.scale.abs();
                    batch.lines.clear();
                    batch.lines.push([p.x - half.x, p.y, p.x + half.x, p.y]);
                    batch.lines.push([p.x, p.y - half.y, p.x, p.y + half.y]);
                    sample.needs_redraw = true;
                }
                None
            }
            _ => None,
        }
    }

    /// Post-order hook, after the node's children saw the event.
    ///
    /// Panning starts here so any node below gets the first chance at a
    /// press; the pan only takes presses nothing else consumed.
    pub(crate) fn pointer_exit(
        &mut self,
        _item: &mut Drawable,
        visit: &mut Visit<'_>,
    ) -> Option<ClaimKind> {
        let sample = &mut *visit.sample;
        match (self, visit.phase) {
            (Behavior::ViewportPan(pan), PointerPhase::Down) => {
                if sample.consumed || sample.chord() != pan.chord {
                    return None;
                }
                pan.capture = Some(PanCapture {
                    view: sample.viewport_transform,
                    anchor: sample.device_up(),
                });
                sample.consumed = true;
                debug!(anchor = ?sample.device_up(), "pan claimed");
                Some(ClaimKind::Pan)
            }
            _ => None,
        }
    }

    /// Move and release events of a sequence this behavior claimed.
    pub(crate) fn pointer_claimed(
        &mut self,
        item: &mut Drawable,
        visit: &mut Visit<'_>,
    ) -> Result<(), ContractViolation> {
        let sample = &mut *visit.sample;
        let release = visit.phase == PointerPhase::Up;
        match self {
            Behavior::Draggable(drag) => {
                let (Some(capture), Some(group)) = (drag.capture, item.as_group_mut()) else {
                    return Err(ContractViolation::StaleClaim);
                };
                let point = visit.parent.apply_inverse(sample.device_up());
                let delta = (point - capture.anchor) / capture.original.scale;
                group.set_transform(
                    capture
                        .original
                        .compose(&Transform::translation(delta.x, delta.y)),
                );
                sample.consumed = true;
                sample.needs_redraw = true;
                if release {
                    drag.capture = None;
                    debug!(translate = ?group.transform().translate, "drag released");
                }
            }
            Behavior::ViewportPan(pan) => {
                let Some(capture) = pan.capture else {
                    return Err(ContractViolation::StaleClaim);
                };
                let mut view = capture.view;
                view.translate += sample.device_up() - capture.anchor;
                sample.viewport_transform = view;
                sample.consumed = true;
                sample.needs_redraw = true;
                if release {
                    pan.capture = None;
                    debug!(translate = ?view.translate, "pan released");
                }
            }
            Behavior::LineSketch(sketch) => {
                let Drawable::LineBatch(batch) = item else {
                    return Err(ContractViolation::StaleClaim);
                };
                let p = sample.local();
                let last = batch.lines.len().checked_sub(1).ok_or(
                    ContractViolation::IndexOutOfRange { index: 0, len: 0 },
                )?;
                let [x1, y1, _, _] = batch.lines.get(last)?;
                batch.lines.set(last, [x1, y1, p.x, p.y])?;
                sample.consumed = true;
                sample.needs_redraw = true;
                if release {
                    sketch.active = false;
                    debug!("sketch finished");
                }
            }
            _ => return Err(ContractViolation::StaleClaim),
        }
        Ok(())
    }

    /// Restart a claimed gesture from the current state after the view
    /// changed underneath it, so the next move continues from here.
    pub(crate) fn rebase(
        &mut self,
        item: &Drawable,
        parent: &Transform,
        view: Transform,
        device_up: DVec2,
    ) {
        match self {
            Behavior::Draggable(drag) => {
                if let (Some(capture), Some(group)) = (drag.capture.as_mut(), item.as_group()) {
                    capture.original = group.transform();
                    capture.anchor = parent.apply_inverse(device_up);
                }
            }
            Behavior::ViewportPan(pan) => {
                if let Some(capture) = pan.capture.as_mut() {
                    capture.view = view;
                    capture.anchor = device_up;
                }
            }
            _ => {}
        }
    }

    /// Drop any captured interaction state.
    pub(crate) fn release(&mut self) {
        match self {
            Behavior::Draggable(d) => d.capture = None,
            Behavior::ViewportPan(p) => p.capture = None,
            Behavior::LineSketch(s) => s.active = false,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::dvec2;

    use super::*;
    use crate::group::Group;
    use crate::pointer::Modifiers;
    use crate::shapes::{LineBatch, PointBatch, Text};
    use crate::types::Bounds;

    fn sample(view: Transform, x: f64, y: f64, modifiers: Modifiers) -> PointerSample {
        PointerSample::new(Bounds::from_size(100.0, 100.0), view, dvec2(x, y), 0, modifiers)
    }

    #[test]
    fn incompatible_targets_are_rejected() {
        let err = Behavior::draggable()
            .check_target(&Drawable::from(PointBatch::default()))
            .unwrap_err();
        assert_eq!(err.behavior, "draggable");
        assert_eq!(err.drawable, "point batch");

        assert!(Behavior::point_collector()
            .check_target(&Drawable::from(LineBatch::default()))
            .is_err());
        assert!(Behavior::CursorReadout
            .check_target(&Drawable::from(Text::default()))
            .is_ok());
        assert!(Behavior::stroke(Rgba::RED)
            .check_target(&Drawable::from(Text::default()))
            .is_ok());
    }

    #[test]
    fn interaction_behaviors_leave_style_alone() {
        let mut style = StyleContext::default();
        assert_eq!(Behavior::viewport_pan().enter_style(&mut style), Restore::Untouched);
        assert_eq!(style, StyleContext::default());
        let token = Behavior::StrokeWidth(3.0).enter_style(&mut style);
        assert_eq!(style.stroke_width, 3.0);
        style.restore(token);
        assert_eq!(style, StyleContext::default());
    }

    #[test]
    fn drag_moves_group_by_parent_displacement() {
        let view = Transform::uniform(2.0, 0.0, 0.0);
        let mut item = Drawable::from(
            Group::with_transform(Transform::uniform(2.0, 5.0, 5.0)).with_children([
                crate::scene::Node::new(PointBatch::new(&[0.0, 0.0, 4.0, 4.0]).unwrap()),
            ]),
        );
        let mut behavior = Behavior::draggable();

        // Group covers device (10..26) x (10..26), y up; press at (20, 20) up.
        let mut down = sample(view, 20.0, 80.0, Modifiers::NONE);
        down.world_transform = view.compose(&Transform::uniform(2.0, 5.0, 5.0));
        let mut visit = Visit {
            phase: PointerPhase::Down,
            sample: &mut down,
            parent: view,
        };
        assert_eq!(behavior.pointer_enter(&mut item, &mut visit), Some(ClaimKind::Drag));
        assert!(down.consumed);

        // 8 device px right and 4 up is (4, 2) in the parent frame.
        let mut up = sample(view, 28.0, 76.0, Modifiers::NONE);
        let mut visit = Visit {
            phase: PointerPhase::Up,
            sample: &mut up,
            parent: view,
        };
        behavior.pointer_claimed(&mut item, &mut visit).unwrap();
        let moved = item.as_group().unwrap().transform();
        assert_eq!(moved.translate, dvec2(9.0, 7.0));
        assert_eq!(moved.scale, dvec2(2.0, 2.0));
        assert!(!behavior.is_engaged());
    }

    #[test]
    fn collector_ignores_other_chords() {
        let mut item = Drawable::from(PointBatch::default());
        let mut behavior = Behavior::point_collector();
        let mut plain = sample(Transform::IDENTITY, 10.0, 10.0, Modifiers::NONE);
        let mut visit = Visit {
            phase: PointerPhase::Down,
            sample: &mut plain,
            parent: Transform::IDENTITY,
        };
        behavior.pointer_enter(&mut item, &mut visit);
        assert!(!plain.consumed);

        let mut shifted = sample(Transform::IDENTITY, 10.0, 10.0, Modifiers::SHIFT);
        let mut visit = Visit {
            phase: PointerPhase::Down,
            sample: &mut shifted,
            parent: Transform::IDENTITY,
        };
        assert_eq!(behavior.pointer_enter(&mut item, &mut visit), None);
        assert!(shifted.consumed && shifted.needs_redraw);
        match &item {
            Drawable::PointBatch(b) => assert_eq!(b.points.get(0).unwrap(), [10.0, 90.0]),
            other => panic!("unexpected drawable {other:?}"),
        }
    }
}
