//! Geometric value types: affine axis-aligned transforms, bounds and colors.
//!
//! All arithmetic is `f64`. Nothing in here rounds; rounding happens once,
//! when the renderer serializes a number.

use std::fmt;

use glam::{DVec2, dvec2};

use crate::errors::ContractViolation;

// ============================================================================
// Transform
// ============================================================================

/// Per-axis scale followed by a translation: `p' = p * scale + translate`.
///
/// Scales are non-zero; a negative scale flips its axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: DVec2,
    pub translate: DVec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: DVec2::ONE,
        translate: DVec2::ZERO,
    };

    /// Create a transform without validation (const-friendly).
    /// Use `try_new` for values that come from callers.
    #[inline]
    pub const fn new(sx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Transform {
            scale: DVec2::new(sx, sy),
            translate: DVec2::new(tx, ty),
        }
    }

    /// Create a transform, rejecting zero, NaN or infinite scales.
    pub fn try_new(sx: f64, sy: f64, tx: f64, ty: f64) -> Result<Self, ContractViolation> {
        let t = Self::new(sx, sy, tx, ty);
        t.validate()?;
        Ok(t)
    }

    /// Uniform scale `s` with translation `(tx, ty)`.
    #[inline]
    pub const fn uniform(s: f64, tx: f64, ty: f64) -> Self {
        Self::new(s, s, tx, ty)
    }

    /// Pure translation.
    #[inline]
    pub const fn translation(dx: f64, dy: f64) -> Self {
        Self::new(1.0, 1.0, dx, dy)
    }

    pub fn validate(&self) -> Result<(), ContractViolation> {
        let ok = |s: f64| s.is_finite() && s != 0.0;
        if ok(self.scale.x) && ok(self.scale.y) && self.translate.is_finite() {
            Ok(())
        } else {
            Err(ContractViolation::DegenerateScale {
                sx: self.scale.x,
                sy: self.scale.y,
            })
        }
    }

    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        p * self.scale + self.translate
    }

    #[inline]
    pub fn apply_inverse(&self, p: DVec2) -> DVec2 {
        (p - self.translate) / self.scale
    }

    /// Compose with `inner`: the result applies `inner` first, then `self`.
    #[inline]
    pub fn compose(&self, inner: &Transform) -> Transform {
        Transform {
            scale: self.scale * inner.scale,
            translate: inner.translate * self.scale + self.translate,
        }
    }

    pub fn inverse(&self) -> Transform {
        let scale = DVec2::ONE / self.scale;
        Transform {
            scale,
            translate: -self.translate * scale,
        }
    }

    /// Map a bounds rectangle through this transform. Empty stays empty.
    pub fn map_bounds(&self, bounds: &Bounds) -> Bounds {
        if bounds.is_empty() {
            return Bounds::EMPTY;
        }
        Bounds::from_corners(self.apply(bounds.min), self.apply(bounds.max))
    }

    /// Map a bounds rectangle through the inverse of this transform.
    pub fn inverse_map_bounds(&self, bounds: &Bounds) -> Bounds {
        if bounds.is_empty() {
            return Bounds::EMPTY;
        }
        Bounds::from_corners(self.apply_inverse(bounds.min), self.apply_inverse(bounds.max))
    }

    /// Largest absolute axis scale.
    pub fn max_scale(&self) -> f64 {
        self.scale.x.abs().max(self.scale.y.abs())
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[scale ({}, {}), translate ({}, {})]",
            self.scale.x, self.scale.y, self.translate.x, self.translate.y
        )
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Axis-aligned bounding box that may be empty.
///
/// `EMPTY` is the identity for [`Bounds::union`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    empty: bool,
    pub min: DVec2,
    pub max: DVec2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        empty: true,
        min: DVec2::ZERO,
        max: DVec2::ZERO,
    };

    /// Bounds spanning two corners given in any order.
    pub fn from_corners(a: DVec2, b: DVec2) -> Self {
        Bounds {
            empty: false,
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Bounds of a `width` x `height` rectangle anchored at the origin.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::from_corners(DVec2::ZERO, dvec2(width, height))
    }

    pub fn from_points(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut b = Bounds::EMPTY;
        for p in points {
            b.accumulate(p);
        }
        b
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Grow to include `p`.
    pub fn accumulate(&mut self, p: DVec2) {
        if self.empty {
            self.empty = false;
            self.min = p;
            self.max = p;
        } else {
            self.min = self.min.min(p);
            self.max = self.max.max(p);
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        match (self.empty, other.empty) {
            (true, _) => *other,
            (_, true) => *self,
            _ => Bounds {
                empty: false,
                min: self.min.min(other.min),
                max: self.max.max(other.max),
            },
        }
    }

    /// Bounds grown by `margin` on every side. Empty stays empty.
    pub fn inflate(&self, margin: DVec2) -> Bounds {
        if self.empty {
            return *self;
        }
        Bounds::from_corners(self.min - margin, self.max + margin)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        !self.empty && p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn width(&self) -> f64 {
        if self.empty { 0.0 } else { self.max.x - self.min.x }
    }

    pub fn height(&self) -> f64 {
        if self.empty { 0.0 } else { self.max.y - self.min.y }
    }

    pub fn size(&self) -> DVec2 {
        dvec2(self.width(), self.height())
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            write!(f, "[empty]")
        } else {
            write!(
                f,
                "[{}, {}, {}, {}]",
                self.min.x, self.min.y, self.max.x, self.max.y
            )
        }
    }
}

// ============================================================================
// Color
// ============================================================================

/// RGBA color with channels in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);
    pub const RED: Rgba = Rgba::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Rgba = Rgba::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Rgba = Rgba::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Rgba { a, ..self }
    }

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        Rgba {
            r: self.r + t * (other.r - self.r),
            g: self.g + t * (other.g - self.g),
            b: self.b + t * (other.b - self.b),
            a: self.a + t * (other.a - self.a),
        }
    }

    /// Integer channels, `floor(c * 255)` clamped to `0..=255`.
    pub fn to_u8(&self) -> [u8; 3] {
        let ch = |c: f64| (c * 255.0).floor().clamp(0.0, 255.0) as u8;
        [ch(self.r), ch(self.g), ch(self.b)]
    }

    /// `rgb(r, g, b)` with integer channels; opacity is serialized separately.
    pub fn to_rgb_string(&self) -> String {
        let [r, g, b] = self.to_u8();
        format!("rgb({}, {}, {})", r, g, b)
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 1.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgb_string())
    }
}
