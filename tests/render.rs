//! Rendered markup checks.
//!
//! Run with: cargo test --test render -- --nocapture

mod common;

use glam::dvec2;
use regex_lite::Regex;
use svgplot::{
    Backdrop, Circle, GridLines, Group, LineBatch, LineStrip, Node, PointBatch, RenderError, RenderOptions,
    Rgba, Scene, Text, Transform, Viewport, render,
};

fn frame(scene: &Scene, view: Transform) -> String {
    common::init_tracing();
    render(scene.root(), &view, dvec2(100.0, 100.0), &RenderOptions::default())
        .expect("frame renders")
}

/// Values of `attr` on every `<tag .../>` element, in document order.
fn attr_values(svg: &str, tag: &str, attr: &str) -> Vec<String> {
    let element = Regex::new(&format!(r"<{tag}\b[^>]*>")).unwrap();
    let value = Regex::new(&format!(r#"\s{attr}="([^"]*)""#)).unwrap();
    element
        .find_iter(svg)
        .filter_map(|m| value.captures(m.as_str()).map(|c| c[1].to_string()))
        .collect()
}

fn count(svg: &str, needle: &str) -> usize {
    svg.matches(needle).count()
}

#[test]
fn single_circle_frame() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(Circle::new(5.0, &[10.0, 10.0]).unwrap())]);
    let svg = frame(&scene, Transform::IDENTITY);
    insta::assert_snapshot!(svg, @r#"
    <svg xmlns="http://www.w3.org/2000/svg" version="1.1" viewBox="0 0 100 100" style="background-color: rgb(255, 255, 255)">
    <circle cx="10" cy="90" r="5" fill="none" stroke="rgb(0, 0, 0)"/>
    </svg>
    "#);
}

#[test]
fn non_uniform_view_turns_circles_into_ellipses() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(Circle::new(1.0, &[0.0, 0.0]).unwrap())]);
    let svg = frame(&scene, Transform::new(2.0, 3.0, 50.0, 50.0));
    assert_eq!(attr_values(&svg, "ellipse", "rx"), ["2"]);
    assert_eq!(attr_values(&svg, "ellipse", "ry"), ["3"]);
    assert_eq!(attr_values(&svg, "ellipse", "cy"), ["50"]);
}

#[test]
fn translucent_stroke_writes_opacity() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineBatch::new(&[0.0, 0.0, 10.0, 10.0]).unwrap())
        .stroke(Rgba::RED.with_alpha(0.5))
        .stroke_width(2.0)]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(attr_values(&svg, "polyline", "stroke"), ["rgb(255, 0, 0)"]);
    assert_eq!(attr_values(&svg, "polyline", "stroke-opacity"), ["0.5"]);
    assert_eq!(attr_values(&svg, "polyline", "stroke-width"), ["2"]);
}

#[test]
fn opaque_default_stroke_has_no_opacity_attribute() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineBatch::new(&[0.0, 0.0, 10.0, 10.0]).unwrap())]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(count(&svg, "opacity"), 0);
    assert_eq!(count(&svg, "stroke-width"), 0);
}

#[test]
fn marker_draws_two_chevrons_at_segment_end() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineBatch::new(&[0.0, 0.0, 10.0, 0.0]).unwrap()).marker(true)]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(
        attr_values(&svg, "polyline", "points"),
        ["0,100 10,100", "4,104 10,100", "4,96 10,100"]
    );
}

#[test]
fn zero_length_segment_gets_no_chevrons() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineBatch::new(&[5.0, 5.0, 5.0, 5.0]).unwrap()).marker(true)]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(count(&svg, "<polyline"), 1);
}

#[test]
fn style_scopes_end_with_their_subtree() {
    let styled = Group::new().with_children([
        Node::new(PointBatch::new(&[1.0, 1.0]).unwrap()).stroke(Rgba::BLUE),
        Node::new(PointBatch::new(&[2.0, 2.0]).unwrap()),
    ]);
    let mut scene = Scene::new();
    scene.add_children([
        Node::new(styled).stroke(Rgba::RED),
        Node::new(PointBatch::new(&[3.0, 3.0]).unwrap()),
    ]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(
        attr_values(&svg, "circle", "fill"),
        ["rgb(0, 0, 255)", "rgb(255, 0, 0)", "rgb(0, 0, 0)"]
    );
}

#[test]
fn point_radius_adds_vertex_dots_to_lines() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineBatch::new(&[0.0, 0.0, 10.0, 0.0]).unwrap()).point_radius(3.0)]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(attr_values(&svg, "circle", "r"), ["3", "3"]);
    assert_eq!(attr_values(&svg, "circle", "cx"), ["0", "10"]);
}

#[test]
fn single_point_strip_draws_nothing() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(LineStrip::new(&[4.0, 4.0]).unwrap()).point_radius(3.0)]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(count(&svg, "<circle"), 0);
    assert_eq!(count(&svg, "<polyline"), 0);
}

#[test]
fn text_is_escaped_and_uses_font() {
    let mut scene = Scene::new();
    scene.add_children([
        Node::new(Text::new(10.0, 10.0, 12.0, "a<b")),
        Node::new(Text::new(20.0, 20.0, 12.0, "c")).font("Courier"),
    ]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert!(svg.contains(">a&lt;b</text>"), "{svg}");
    assert_eq!(attr_values(&svg, "text", "font-family"), ["Verdana", "Courier"]);
    assert_eq!(attr_values(&svg, "text", "y"), ["90", "80"]);
}

#[test]
fn backdrop_outlines_scene_content() {
    let mut scene = Scene::new();
    scene.add_children([
        Node::new(Backdrop),
        Node::new(PointBatch::new(&[0.0, 0.0, 10.0, 20.0]).unwrap()),
    ]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(attr_values(&svg, "rect", "y"), ["80"]);
    assert_eq!(attr_values(&svg, "rect", "width"), ["10"]);
    assert_eq!(attr_values(&svg, "rect", "height"), ["20"]);
}

#[test]
fn grid_draws_fine_band_first_and_faded() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(GridLines::new())]);
    let svg = frame(&scene, Transform::IDENTITY);
    let points = attr_values(&svg, "polyline", "points");
    // Two bands: 9 coarse and 90 fine lines per axis, none on the edges.
    assert_eq!(points.len(), 198);
    assert_eq!(points[0], "1,0 1,100");
    assert_eq!(count(&svg, "stroke-opacity=\"0.5\""), 180);
    for edge in ["0,0 0,100", "100,0 100,100", "0,0 100,0", "0,100 100,100"] {
        assert!(!points.iter().any(|p| p == edge), "edge line {edge}");
    }
}

#[test]
fn grid_draws_axes_when_origin_is_visible() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(GridLines::new())]);
    let svg = frame(&scene, Transform::uniform(1.0, 50.0, 50.0));
    let axis = Rgba::rgb(1.0, 0.7, 0.7).to_rgb_string();
    assert_eq!(count(&svg, &format!("stroke=\"{axis}\"")), 2);
}

#[test]
fn grid_under_stretched_view_stays_bounded() {
    common::init_tracing();
    let mut scene = Scene::new();
    scene.add_children([Node::new(GridLines::new())]);
    let svg = render(
        scene.root(),
        &Transform::new(1e-5, 1e3, 0.0, 0.0),
        dvec2(1000.0, 1000.0),
        &RenderOptions::default(),
    )
    .unwrap();
    // Three visible decades per axis at 1 px finest spacing.
    assert_eq!(count(&svg, "<polyline"), 1998);
}

#[test]
fn hidden_node_is_not_drawn() {
    let mut hidden = Node::new(Circle::new(1.0, &[0.0, 0.0]).unwrap());
    hidden.set_visible(false);
    let mut scene = Scene::new();
    scene.add_children([hidden]);
    let svg = frame(&scene, Transform::IDENTITY);
    assert_eq!(count(&svg, "<circle"), 0);
}

#[test]
fn non_finite_coordinates_abort_the_frame() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(Circle::new(1.0, &[f64::NAN, 0.0]).unwrap())]);
    let err = render(
        scene.root(),
        &Transform::IDENTITY,
        dvec2(100.0, 100.0),
        &RenderOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err, RenderError::NonFinite { what: "circle" });
}

#[test]
fn aborted_frame_keeps_previous_markup() {
    common::init_tracing();
    let mut scene = Scene::new();
    scene.add_children([Node::new(Circle::new(1.0, &[0.0, 0.0]).unwrap())]);
    let mut vp = Viewport::new(scene, 100.0, 100.0).unwrap();
    assert!(vp.request_redraw());
    assert_eq!(vp.animation_frame(), Ok(true));
    let good = vp.markup().to_string();
    assert!(good.contains("<circle"));

    vp.scene_mut()
        .add_children([Node::new(Circle::new(1.0, &[f64::INFINITY, 0.0]).unwrap())]);
    assert!(vp.request_redraw());
    assert!(vp.animation_frame().is_err());
    assert_eq!(vp.markup(), good);
}

#[test]
fn background_comes_from_options() {
    let mut scene = Scene::new();
    scene.add_children([Node::new(PointBatch::new(&[0.0, 0.0]).unwrap())]);
    let options = RenderOptions {
        background: Rgba::rgb(0.5, 0.5, 0.5),
        ..RenderOptions::default()
    };
    let svg = render(scene.root(), &Transform::IDENTITY, dvec2(10.0, 10.0), &options).unwrap();
    assert!(svg.contains("style=\"background-color: rgb(127, 127, 127)\""));
    assert!(svg.contains("viewBox=\"0 0 10 10\""));
}
