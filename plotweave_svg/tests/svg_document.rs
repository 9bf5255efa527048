// Copyright 2025 the Plotweave Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document-level checks for `plotweave_svg`: well-formedness, embedded
//! images, and the degenerate-input rules.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use plotweave_render::{
    Color, Font, HorizontalAlignment, Image, LineJoin, Rect, RenderContext, ScreenPoint,
    VerticalAlignment,
};
use plotweave_svg::{SvgOptions, SvgRenderContext};
use proptest::prelude::*;

fn sample_image() -> Image {
    let pixels = [
        Color::BLUE,
        Color::GREEN,
        Color::RED,
        Color::WHITE,
        Color::TRANSPARENT,
        Color::YELLOW.with_alpha(127),
        Color::ORANGE.with_alpha(127),
        Color::PINK.with_alpha(127),
    ];
    Image::from_pixels(4, 2, &pixels).unwrap()
}

#[derive(Clone, Debug)]
enum Op {
    Push(f64, f64, f64, f64),
    Pop,
    Line(f64, f64, f64, f64, u8),
    Ellipse(f64, f64, f64, f64, u8),
    Text(String),
}

fn op() -> impl Strategy<Value = Op> {
    let coord = -20.0..220.0_f64;
    prop_oneof![
        (coord.clone(), coord.clone(), coord.clone(), coord.clone())
            .prop_map(|(a, b, c, d)| Op::Push(a, b, c, d)),
        Just(Op::Pop),
        (coord.clone(), coord.clone(), coord.clone(), coord.clone(), any::<u8>())
            .prop_map(|(a, b, c, d, alpha)| Op::Line(a, b, c, d, alpha)),
        (coord.clone(), coord.clone(), coord.clone(), coord, any::<u8>())
            .prop_map(|(a, b, c, d, alpha)| Op::Ellipse(a, b, c, d, alpha)),
        "[ -~]{0,12}".prop_map(Op::Text),
    ]
}

proptest! {
    #[test]
    fn output_is_well_formed_xml(ops in proptest::collection::vec(op(), 0..40)) {
        let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::new(200.0, 200.0)).unwrap();
        let mut depth = 0;
        for op in ops {
            match op {
                Op::Push(x0, y0, x1, y1) => {
                    rc.set_clip(Rect::new(x0, y0, x1, y1)).unwrap();
                    depth += 1;
                }
                Op::Pop => {
                    if depth > 0 {
                        rc.reset_clip().unwrap();
                        depth -= 1;
                    }
                }
                Op::Line(x0, y0, x1, y1, alpha) => {
                    rc.draw_line(
                        &[ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1)],
                        Color::BLUE.with_alpha(alpha),
                        1.5,
                        Some(&[4.0, 1.0]),
                        LineJoin::Bevel,
                        true,
                    )
                    .unwrap();
                }
                Op::Ellipse(x0, y0, x1, y1, alpha) => {
                    rc.draw_ellipse(
                        Rect::new(x0, y0, x1, y1),
                        Color::RED.with_alpha(alpha),
                        Color::BLACK,
                        1.0,
                    )
                    .unwrap();
                }
                Op::Text(text) => {
                    rc.draw_text(
                        ScreenPoint::new(50.0, 50.0),
                        &text,
                        Color::BLACK,
                        &Font::new("Arial & Co", 12.0),
                        30.0,
                        HorizontalAlignment::Center,
                        VerticalAlignment::Middle,
                        None,
                    )
                    .unwrap();
                }
            }
        }
        // Open clips are closed by `finish`.
        let bytes = rc.finish().unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        let doc = roxmltree::Document::parse_with_options(
            &svg,
            roxmltree::ParsingOptions { allow_dtd: true, ..Default::default() },
        );
        prop_assert!(doc.is_ok(), "{:?}\n{svg}", doc.err());
        prop_assert_eq!(svg.matches("</svg>").count(), 1);
    }
}

#[test]
fn embedded_image_round_trips() {
    let image = sample_image();
    let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::new(100.0, 100.0)).unwrap();
    rc.draw_image(
        &image,
        Rect::new(0.0, 0.0, 4.0, 2.0),
        Rect::new(10.0, 10.0, 90.0, 50.0),
        1.0,
        true,
    )
    .unwrap();
    let svg = String::from_utf8(rc.finish().unwrap()).unwrap();

    let doc = roxmltree::Document::parse_with_options(
        &svg,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .unwrap();
    let node = doc
        .descendants()
        .find(|n| n.has_tag_name("image"))
        .expect("an image element");
    let href = node
        .attribute(("http://www.w3.org/1999/xlink", "href"))
        .expect("an xlink:href attribute");
    let payload = href
        .strip_prefix("data:image/png;base64,")
        .expect("a PNG data URI");

    let decoded = Image::from_bytes(BASE64.decode(payload).unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (4, 2));
    assert_eq!(decoded.pixels().unwrap(), image.pixels().unwrap());
}

#[test]
fn invisible_fill_emits_no_fill() {
    let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::default()).unwrap();
    let rect = Rect::new(10.0, 10.0, 50.0, 50.0);
    rc.draw_rectangle(rect, Color::RED.with_alpha(0), Color::BLACK, 1.0)
        .unwrap();
    rc.draw_ellipse(rect, Color::TRANSPARENT, Color::BLACK, 1.0)
        .unwrap();
    rc.draw_polygon(
        &[
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(10.0, 0.0),
            ScreenPoint::new(10.0, 10.0),
        ],
        Color::BLUE.with_alpha(0),
        Color::BLACK,
        1.0,
        None,
        LineJoin::Miter,
        false,
    )
    .unwrap();
    let svg = String::from_utf8(rc.finish().unwrap()).unwrap();
    assert_eq!(svg.matches("fill:none").count(), 3);
    assert!(!svg.contains("fill:#"));
}

#[test]
fn non_positive_thickness_emits_no_stroke() {
    for thickness in [0.0, -1.0] {
        let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::default()).unwrap();
        rc.draw_rectangle(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Color::RED,
            Color::BLACK,
            thickness,
        )
        .unwrap();
        rc.draw_line(
            &[ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0)],
            Color::BLACK,
            thickness,
            None,
            LineJoin::Miter,
            false,
        )
        .unwrap();
        let svg = String::from_utf8(rc.finish().unwrap()).unwrap();
        assert!(!svg.contains("stroke:"));
        assert!(!svg.contains("<line"));
        assert!(svg.contains("<rect"));
    }
}

#[test]
fn empty_text_measures_zero() {
    let rc = SvgRenderContext::new(Vec::new(), SvgOptions::default()).unwrap();
    let size = rc.measure_text("", &Font::default());
    assert_eq!((size.width, size.height), (0.0, 0.0));
}

#[test]
fn flush_keeps_the_document_open() {
    let mut rc = SvgRenderContext::new(Vec::new(), SvgOptions::default()).unwrap();
    rc.set_clip(Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
    rc.flush().unwrap();
    rc.reset_clip().unwrap();
    let svg = String::from_utf8(rc.finish().unwrap()).unwrap();
    assert!(svg.trim_end().ends_with("</g>\n</svg>"));
}
