//! Adaptive decimal grid
//!
//! The grid is recomputed every frame from the visible world rectangle. The
//! coarsest band steps by `10^(exponent - 1)` where `exponent` is the decimal
//! order of the larger visible extent; each finer band divides by ten until
//! lines would sit closer than about [`defaults::GRID_TARGET_SPACING`]
//! pixels. Lines are generated from integer indices so a coordinate belongs
//! to exactly one band: finer bands skip every tenth index, which the
//! coarser band already drew.

use glam::dvec2;

use crate::errors::RenderError;
use crate::render::{Renderer, defaults};
use crate::shapes::Shape;
use crate::types::{Bounds, Rgba, Transform};

/// Lines of one decade, `level` 0 being the coarsest.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub level: usize,
    /// World distance between neighbouring lines of this band.
    pub step: f64,
    /// World x of vertical lines.
    pub vertical: Vec<f64>,
    /// World y of horizontal lines.
    pub horizontal: Vec<f64>,
}

/// Decimal order of the coarsest band and the number of bands, or `None`
/// when either rectangle has no area.
pub fn band_count(visible: &Bounds, device: &Bounds) -> Option<(i32, usize)> {
    let extent = visible.size();
    let device_extent = device.size();
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if visible.is_empty() || !(usable(extent.x) && usable(extent.y)) {
        return None;
    }
    if !(usable(device_extent.x) && usable(device_extent.y)) {
        return None;
    }
    let exponent = extent.x.log10().floor().max(extent.y.log10().floor()) as i32;
    let fine = (extent * defaults::GRID_TARGET_SPACING / device_extent)
        .to_array()
        .map(|v| v.log10().floor())
        .into_iter()
        .fold(f64::INFINITY, f64::min) as i32;
    let bands = exponent - fine;
    if bands <= 0 {
        Some((1, 1))
    } else {
        Some((exponent, bands as usize))
    }
}

/// Lines of every band that fall strictly inside the device rectangle.
pub fn bands(visible: &Bounds, device: &Bounds) -> Vec<Band> {
    let Some((exponent, count)) = band_count(visible, device) else {
        return Vec::new();
    };
    let mut out: Vec<Band> = (0..count)
        .map(|level| Band {
            level,
            step: 10f64.powi(exponent - 1 - level as i32),
            vertical: Vec::new(),
            horizontal: Vec::new(),
        })
        .collect();

    for axis in 0..2 {
        let lo = visible.min[axis];
        let hi = visible.max[axis];
        let dev_extent = device.max[axis] - device.min[axis];
        let px_per_unit = dev_extent / (hi - lo);
        let mut lines: Vec<Vec<f64>> = vec![Vec::new(); count];
        let step = out[0].step;
        let mut walk = AxisWalk {
            lines: &mut lines,
            lo,
            hi,
            px_per_unit,
            dev_extent,
            top_step: step,
        };
        let first = (lo / step).floor() as i64;
        let last = (hi / step).ceil() as i64;
        walk.subdivide(0, first, last);
        for (band, found) in out.iter_mut().zip(lines) {
            if axis == 0 {
                band.vertical = found;
            } else {
                band.horizontal = found;
            }
        }
    }
    out
}

/// Color and opacity of band `level` out of `count`.
///
/// The coarsest band takes `major` at full opacity; finer bands blend toward
/// `minor` and fade out.
pub fn band_color(major: &Rgba, minor: &Rgba, level: usize, count: usize) -> Rgba {
    let t = level as f64 / count.max(1) as f64;
    major.lerp(minor, t).with_alpha(1.0 - t)
}

struct AxisWalk<'a> {
    lines: &'a mut [Vec<f64>],
    lo: f64,
    hi: f64,
    px_per_unit: f64,
    dev_extent: f64,
    top_step: f64,
}

impl AxisWalk<'_> {
    fn step(&self, level: usize) -> f64 {
        self.top_step / 10f64.powi(level as i32)
    }

    /// Emit interior lines of `[first, last]` at `level`, then descend into
    /// the intervals between them that overlap the visible range.
    fn subdivide(&mut self, level: usize, first: i64, last: i64) {
        let step = self.step(level);
        if step * self.px_per_unit < defaults::GRID_MIN_SPACING {
            return;
        }
        for i in first..last {
            if i > first {
                let v = i as f64 * step;
                let px = (v - self.lo) * self.px_per_unit;
                if px > 0.0 && px < self.dev_extent {
                    self.lines[level].push(v);
                }
            }
            let overlaps = (i + 1) as f64 * step > self.lo && (i as f64) * step < self.hi;
            if overlaps && level + 1 < self.lines.len() {
                self.subdivide(level + 1, i * 10, (i + 1) * 10);
            }
        }
    }
}

/// Background grid of the visible world rectangle.
///
/// Holds no geometry; everything is derived from the view at draw time.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLines {
    pub major: Rgba,
    pub minor: Rgba,
    /// Color of the `x = 0` and `y = 0` lines; `None` leaves them out.
    pub axis: Option<Rgba>,
}

impl Default for GridLines {
    fn default() -> Self {
        Self {
            major: defaults::GRID_MAJOR,
            minor: defaults::GRID_MINOR,
            axis: Some(defaults::GRID_AXIS),
        }
    }
}

impl GridLines {
    pub fn new() -> Self {
        Self::default()
    }

    fn draw_lines(
        renderer: &mut Renderer,
        transform: &Transform,
        vertical: &[f64],
        horizontal: &[f64],
    ) -> Result<(), RenderError> {
        let size = renderer.canvas();
        for x in vertical {
            let up = transform.apply(dvec2(*x, 0.0));
            if !up.x.is_finite() {
                return Err(RenderError::NonFinite { what: "grid" });
            }
            renderer.polyline(&[dvec2(up.x, 0.0), dvec2(up.x, size.y)]);
        }
        for y in horizontal {
            let up = transform.apply(dvec2(0.0, *y));
            if !up.y.is_finite() {
                return Err(RenderError::NonFinite { what: "grid" });
            }
            let svg_y = size.y - up.y;
            renderer.polyline(&[dvec2(0.0, svg_y), dvec2(size.x, svg_y)]);
        }
        Ok(())
    }
}

impl Shape for GridLines {
    fn kind(&self) -> &'static str {
        "grid"
    }

    fn component_arity(&self) -> usize {
        0
    }

    fn bounds_under(&self, _transform: &Transform) -> Bounds {
        Bounds::EMPTY
    }

    fn draw_to(&self, renderer: &mut Renderer) -> Result<(), RenderError> {
        let transform = renderer.transform();
        let device = renderer.device_bounds();
        let visible = transform.inverse_map_bounds(&device);
        let bands = bands(&visible, &device);
        let count = bands.len();
        let marker = renderer.style_mut().set_marker(false);

        let mut result = Ok(());
        for band in bands.iter().rev() {
            let color = band_color(&self.major, &self.minor, band.level, count);
            let token = renderer.style_mut().set_stroke(color);
            result = Self::draw_lines(renderer, &transform, &band.vertical, &band.horizontal);
            renderer.style_mut().restore(token);
            if result.is_err() {
                break;
            }
        }

        if let Some(axis) = self.axis.filter(|_| result.is_ok()) {
            let inside = |lo: f64, hi: f64| lo < 0.0 && 0.0 < hi;
            let vertical: &[f64] = if inside(visible.min.x, visible.max.x) { &[0.0] } else { &[] };
            let horizontal: &[f64] = if inside(visible.min.y, visible.max.y) { &[0.0] } else { &[] };
            let token = renderer.style_mut().set_stroke(axis);
            result = Self::draw_lines(renderer, &transform, vertical, horizontal);
            renderer.style_mut().restore(token);
        }

        renderer.style_mut().restore(marker);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Bounds {
        Bounds::from_size(size, size)
    }

    #[test]
    fn band_count_tracks_zoom_decades() {
        let device = square(500.0);
        // 200 world units over 500 px: coarse 10^2, finest 10^0.
        assert_eq!(band_count(&square(200.0), &device), Some((2, 2)));
        // Ten times more world per pixel keeps the same number of bands.
        assert_eq!(band_count(&square(2000.0), &device), Some((3, 2)));
        // Zoomed far in.
        assert_eq!(band_count(&square(0.02), &device), Some((-2, 2)));
        // A wide window adds a band for the short axis.
        let wide = Bounds::from_corners(dvec2(0.0, 0.0), dvec2(2000.0, 20.0));
        assert_eq!(band_count(&wide, &device), Some((3, 4)));
    }

    #[test]
    fn band_count_is_at_least_one() {
        // 1 world unit over 1 px leaves nothing to subdivide.
        assert_eq!(band_count(&square(1.0), &square(1.0)), Some((1, 1)));
    }

    #[test]
    fn degenerate_rectangles_have_no_grid() {
        let device = square(100.0);
        let flat = Bounds::from_corners(dvec2(0.0, 0.0), dvec2(10.0, 0.0));
        assert_eq!(band_count(&flat, &device), None);
        assert_eq!(band_count(&Bounds::EMPTY, &device), None);
        assert!(bands(&flat, &device).is_empty());
    }

    #[test]
    fn coarse_band_lines_are_interior_multiples() {
        let visible = Bounds::from_corners(dvec2(-50.0, -50.0), dvec2(70.0, 70.0));
        let out = bands(&visible, &square(500.0));
        assert_eq!(out[0].step, 10.0);
        assert_eq!(
            out[0].vertical,
            vec![-40.0, -30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]
        );
        assert_eq!(out[0].horizontal, out[0].vertical);
    }

    #[test]
    fn no_coordinate_appears_in_two_bands() {
        let visible = Bounds::from_corners(dvec2(-3.7, 12.2), dvec2(96.1, 88.8));
        let out = bands(&visible, &square(640.0));
        assert!(out.len() >= 2);
        for axis in [0, 1] {
            let mut all: Vec<f64> = out
                .iter()
                .flat_map(|b| if axis == 0 { b.vertical.clone() } else { b.horizontal.clone() })
                .collect();
            let n = all.len();
            all.sort_by(f64::total_cmp);
            all.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
            assert_eq!(all.len(), n);
        }
    }

    #[test]
    fn finer_bands_skip_coarse_lines() {
        let visible = Bounds::from_corners(dvec2(0.0, 0.0), dvec2(100.0, 100.0));
        let out = bands(&visible, &square(500.0));
        assert_eq!(out.len(), 2);
        assert!(!out[1].vertical.iter().any(|v| (v % 10.0).abs() < 1e-9));
        assert!(out[1].vertical.contains(&1.0));
        assert!(out[1].vertical.contains(&99.0));
        // 0 and 100 sit on the edges, not strictly inside.
        assert!(!out[0].vertical.contains(&0.0));
        assert_eq!(out[0].vertical.len() + out[1].vertical.len(), 99);
    }

    #[test]
    fn short_axis_of_a_stretched_view_only_walks_visible_intervals() {
        // Ten bands come from the long axis; the short one spans 3 units and
        // must not visit the 10^9 finest intervals of the coarse range.
        let visible = Bounds::from_corners(dvec2(0.0, 0.0), dvec2(3e8, 3.055));
        let device = square(1000.0);
        assert_eq!(band_count(&visible, &device), Some((8, 10)));
        let out = bands(&visible, &device);
        let vertical: usize = out.iter().map(|b| b.vertical.len()).sum();
        let horizontal: usize = out.iter().map(|b| b.horizontal.len()).sum();
        assert_eq!(vertical, 29 + 270);
        assert_eq!(horizontal, 3 + 27 + 275);
        assert_eq!(out[7].horizontal, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn opacity_falls_with_fineness() {
        let major = defaults::GRID_MAJOR;
        let minor = defaults::GRID_MINOR;
        let coarse = band_color(&major, &minor, 0, 3);
        let mid = band_color(&major, &minor, 1, 3);
        let fine = band_color(&major, &minor, 2, 3);
        assert_eq!(coarse, major);
        assert!(coarse.a > mid.a && mid.a > fine.a);
        assert!(fine.a > 0.0);
    }
}
