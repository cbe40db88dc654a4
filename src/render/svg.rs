//! SVG serialization
//!
//! Element writers take device coordinates with y pointing down (SVG space).
//! Every number goes through [`fmt_num`] so the same scene always produces
//! the same markup.

use std::fmt::{self, Write as _};

use glam::{DVec2, dvec2};

use super::Renderer;
use super::defaults;
use crate::types::Rgba;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Format a number with at most three decimals, trailing zeros trimmed.
pub(crate) fn fmt_num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s.as_str()
    };
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn fmt_point(p: DVec2) -> String {
    format!("{},{}", fmt_num(p.x), fmt_num(p.y))
}

fn fmt_points(points: &[DVec2]) -> String {
    points
        .iter()
        .map(|p| fmt_point(*p))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Escape text content and attribute values.
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn paint(out: &mut String, attr: &str, color: &Rgba) {
    let _ = write!(out, " {attr}=\"{}\"", color.to_rgb_string());
    if !color.is_opaque() {
        let _ = write!(out, " {attr}-opacity=\"{}\"", fmt_num(color.a));
    }
}

impl Renderer {
    fn emit(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }

    fn stroke_attrs(&self) -> String {
        let mut s = String::new();
        paint(&mut s, "stroke", &self.style.stroke);
        if self.style.stroke_width != 1.0 {
            let _ = write!(s, " stroke-width=\"{}\"", fmt_num(self.style.stroke_width));
        }
        s
    }

    fn fill_attrs(&self) -> String {
        let mut s = String::new();
        match &self.style.fill {
            Some(color) => paint(&mut s, "fill", color),
            None => s.push_str(" fill=\"none\""),
        }
        s
    }

    pub(crate) fn open_document(&mut self, background: &Rgba) {
        self.emit(format_args!(
            "<svg xmlns=\"{SVG_NS}\" version=\"1.1\" viewBox=\"0 0 {} {}\" style=\"background-color: {}\">",
            fmt_num(self.canvas.x),
            fmt_num(self.canvas.y),
            background.to_rgb_string()
        ));
    }

    pub(crate) fn close_document(&mut self) {
        self.out.push_str("</svg>\n");
    }

    /// Circle, or an ellipse when the radii differ.
    pub fn ellipse(&mut self, center: DVec2, radii: DVec2) {
        let (rx, ry) = (radii.x.abs(), radii.y.abs());
        let attrs = format!("{}{}", self.fill_attrs(), self.stroke_attrs());
        if (rx - ry).abs() <= 1e-9 * rx.max(ry) {
            self.emit(format_args!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{attrs}/>",
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(rx)
            ));
        } else {
            self.emit(format_args!(
                "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\"{attrs}/>",
                fmt_num(center.x),
                fmt_num(center.y),
                fmt_num(rx),
                fmt_num(ry)
            ));
        }
    }

    /// Open stroked path through `points`.
    pub fn polyline(&mut self, points: &[DVec2]) {
        if points.len() < 2 {
            return;
        }
        let stroke = self.stroke_attrs();
        self.emit(format_args!(
            "<polyline points=\"{}\" fill=\"none\"{stroke}/>",
            fmt_points(points)
        ));
    }

    pub fn polygon(&mut self, points: &[DVec2]) {
        let attrs = format!("{}{}", self.fill_attrs(), self.stroke_attrs());
        self.emit(format_args!(
            "<polygon points=\"{}\"{attrs}/>",
            fmt_points(points)
        ));
    }

    /// Axis-aligned rectangle between two opposite corners.
    pub fn rect(&mut self, a: DVec2, b: DVec2) {
        let min = a.min(b);
        let size = (a - b).abs();
        let attrs = format!("{}{}", self.fill_attrs(), self.stroke_attrs());
        self.emit(format_args!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{attrs}/>",
            fmt_num(min.x),
            fmt_num(min.y),
            fmt_num(size.x),
            fmt_num(size.y)
        ));
    }

    pub fn text(&mut self, at: DVec2, size: f64, content: &str) {
        let mut attrs = String::new();
        paint(&mut attrs, "fill", &self.style.fill.unwrap_or(self.style.stroke));
        attrs.push_str(&self.stroke_attrs());
        self.emit(format_args!(
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"{}\"{attrs}>{}</text>",
            fmt_num(at.x),
            fmt_num(at.y),
            fmt_num(size.abs()),
            escape_text(&self.style.font),
            escape_text(content)
        ));
    }

    /// Vertex dot filled with the stroke color.
    pub fn dot(&mut self, at: DVec2, radius: f64) {
        let mut fill = String::new();
        paint(&mut fill, "fill", &self.style.stroke);
        self.emit(format_args!(
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{fill}/>",
            fmt_num(at.x),
            fmt_num(at.y),
            fmt_num(radius)
        ));
    }

    /// Dots at `points` when the point radius asks for them.
    pub fn vertex_dots(&mut self, points: &[DVec2]) {
        let radius = self.style.point_radius;
        if radius > 1.0 {
            for p in points {
                self.dot(*p, radius);
            }
        }
    }

    /// Two chevron strokes at `to` pointing along `from -> to`.
    ///
    /// Drawn only with the marker style on and for segments with a
    /// measurable length.
    pub fn chevrons(&mut self, from: DVec2, to: DVec2) {
        if !self.style.marker {
            return;
        }
        let delta = to - from;
        let len = delta.length();
        if len <= defaults::MARKER_MIN_LENGTH {
            return;
        }
        let unit = delta / len;
        let perp = dvec2(-unit.y, unit.x);
        let base = to - unit * defaults::MARKER_LENGTH;
        let spread = perp * defaults::MARKER_SPREAD;
        self.polyline(&[base + spread, to]);
        self.polyline(&[base - spread, to]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_use_three_decimals_trimmed() {
        assert_eq!(fmt_num(90.0), "90");
        assert_eq!(fmt_num(0.5), "0.5");
        assert_eq!(fmt_num(1.23456), "1.235");
        assert_eq!(fmt_num(-12.1004), "-12.1");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape_text("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn translucent_paint_adds_opacity() {
        let mut s = String::new();
        paint(&mut s, "stroke", &Rgba::RED.with_alpha(0.25));
        assert_eq!(s, " stroke=\"rgb(255, 0, 0)\" stroke-opacity=\"0.25\"");
    }
}
