//! Pointer input as the scene sees it.

use glam::{DVec2, dvec2};

use crate::types::{Bounds, Transform};

/// Primary (usually left) button index.
pub const PRIMARY_BUTTON: u16 = 0;

/// Keyboard modifiers held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Self::NONE
    };
}

/// Button plus exact modifier set that starts an interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    pub button: u16,
    pub modifiers: Modifiers,
}

impl Chord {
    pub const fn new(button: u16, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }

    /// Primary button, no modifiers.
    pub const PRIMARY: Chord = Chord::new(PRIMARY_BUTTON, Modifiers::NONE);
    pub const SHIFT_PRIMARY: Chord = Chord::new(PRIMARY_BUTTON, Modifiers::SHIFT);
    pub const ALT_PRIMARY: Chord = Chord::new(PRIMARY_BUTTON, Modifiers::ALT);
}

/// Which part of a press-move-release sequence an event is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A raw pointer event from the host, in host device coordinates (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: u16,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            button: PRIMARY_BUTTON,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_button(self, button: u16) -> Self {
        Self { button, ..self }
    }

    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

/// A wheel event; positive `delta_y` zooms out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WheelEvent {
    pub x: f64,
    pub y: f64,
    pub delta_y: f64,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn new(x: f64, y: f64, delta_y: f64) -> Self {
        Self {
            x,
            y,
            delta_y,
            modifiers: Modifiers::NONE,
        }
    }
}

/// Per-event record threaded through the scene.
///
/// Behaviors read positions from it and write back `consumed`,
/// `needs_redraw` and, for panning, `viewport_transform`.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerSample {
    /// Canvas rectangle, device units.
    pub device_bounds: Bounds,
    /// Local -> device (y up) transform of the node being visited.
    pub world_transform: Transform,
    /// World -> device (y up) view transform.
    pub viewport_transform: Transform,
    /// Pointer position as the host reports it (y down).
    pub device: DVec2,
    /// Pointer position in world coordinates at dispatch time.
    pub world: DVec2,
    pub button: u16,
    pub modifiers: Modifiers,
    /// Set once something acted on this event.
    pub consumed: bool,
    pub needs_redraw: bool,
}

impl PointerSample {
    pub fn new(
        device_bounds: Bounds,
        view: Transform,
        device: DVec2,
        button: u16,
        modifiers: Modifiers,
    ) -> Self {
        let up = dvec2(device.x, device_bounds.max.y - device.y);
        Self {
            device_bounds,
            world_transform: view,
            viewport_transform: view,
            device,
            world: view.apply_inverse(up),
            button,
            modifiers,
            consumed: false,
            needs_redraw: false,
        }
    }

    /// Pointer position in device units with y up.
    #[inline]
    pub fn device_up(&self) -> DVec2 {
        dvec2(self.device.x, self.device_bounds.max.y - self.device.y)
    }

    /// Pointer position in the local frame of the node being visited.
    #[inline]
    pub fn local(&self) -> DVec2 {
        self.world_transform.apply_inverse(self.device_up())
    }

    #[inline]
    pub fn chord(&self) -> Chord {
        Chord::new(self.button, self.modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_flips_device_y() {
        let view = Transform::uniform(2.0, 10.0, 0.0);
        let s = PointerSample::new(
            Bounds::from_size(100.0, 100.0),
            view,
            dvec2(30.0, 20.0),
            PRIMARY_BUTTON,
            Modifiers::NONE,
        );
        assert_eq!(s.device_up(), dvec2(30.0, 80.0));
        assert_eq!(s.world, dvec2(10.0, 40.0));
        assert_eq!(s.local(), s.world);
        assert_eq!(s.chord(), Chord::PRIMARY);
    }
}
