//! 端到端转换测试

use svg2dxf_core::config::ConversionConfig;
use svg2dxf_core::error::CoreError;
use svg2dxf_core::math::{approx_eq, points_approx_eq, Point2};
use svg2dxf_file::{
    convert_file, convert_node, convert_str, parse_document, FileError, Primitive, RecordingSink,
};

fn record(svg: &str) -> RecordingSink {
    record_with(svg, &ConversionConfig::default())
}

fn record_with(svg: &str, config: &ConversionConfig) -> RecordingSink {
    let document = parse_document(svg).unwrap();
    let mut sink = RecordingSink::new();
    convert_node(&document.root_element(), &mut sink, config).unwrap();
    sink
}

#[test]
fn circle_in_translated_group() {
    let sink = record(
        r##"<svg xmlns="http://www.w3.org/2000/svg">
            <g transform="translate(10,0)"><circle cx="0" cy="0" r="5" style="stroke:#0000ff"/></g>
        </svg>"##,
    );
    assert_eq!(sink.len(), 1);
    match &sink.primitives[0] {
        Primitive::Circle {
            center,
            radius,
            style,
        } => {
            assert!(points_approx_eq(center, &Point2::new(10.0, 0.0)));
            assert!(approx_eq(*radius, 5.0));
            assert_eq!(style.color, Some(0x0000ff));
            assert_eq!(style.lineweight, None);
        }
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn text_height_from_points() {
    let sink = record(r##"<svg><text x="0" y="0" style="font-size:12pt"/></svg>"##);
    match &sink.primitives[0] {
        Primitive::Text {
            content,
            height,
            rotation,
            ..
        } => {
            assert_eq!(content, "");
            assert!(approx_eq(*height, 300.0));
            assert!(approx_eq(*rotation, 0.0));
        }
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn text_default_font_size() {
    let sink = record(r##"<svg><text font-size="large">x</text></svg>"##);
    match &sink.primitives[0] {
        Primitive::Text { height, .. } => assert!(approx_eq(*height, 250.0)),
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn polygon_closed_polyline_open() {
    let sink = record(
        r##"<svg>
            <polygon points="0,0 10,0 10,10"/>
            <polyline points="0,0
                10,0 10,10"/>
        </svg>"##,
    );
    let flags: Vec<_> = sink
        .primitives
        .iter()
        .map(|p| match p {
            Primitive::Polyline { points, closed, .. } => {
                assert_eq!(points.len(), 3);
                *closed
            }
            other => panic!("unexpected primitive {other:?}"),
        })
        .collect();
    assert_eq!(flags, [true, false]);
}

#[test]
fn style_overrides_attribute() {
    let sink = record(
        r##"<svg><line x2="1" style="stroke:#ff0000;stroke-width:2" stroke="#00ff00" stroke-width="5"/></svg>"##,
    );
    let style = sink.primitives[0].style();
    assert_eq!(style.color, Some(0xff0000));
    assert_eq!(style.lineweight, Some(200));
}

#[test]
fn stroke_none_has_no_color() {
    let sink = record(r##"<svg><line x2="1" stroke="none" stroke-width="0.5"/></svg>"##);
    let style = sink.primitives[0].style();
    assert_eq!(style.color, None);
    assert_eq!(style.lineweight, Some(50));
}

#[test]
fn short_path_has_two_samples() {
    let sink = record(r##"<svg><path d="M0,0 L1,0"/></svg>"##);
    match &sink.primitives[0] {
        Primitive::Polyline { points, closed, .. } => {
            assert!(!closed);
            assert_eq!(points.len(), 2);
            assert!(points_approx_eq(&points[1], &Point2::new(1.0, 0.0)));
        }
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn curved_path_sampled_by_length() {
    // 半径 10 的半圆，弧长约 31.4，采样 4 个点
    let sink = record(r##"<svg><path d="M0,0 A10,10 0 0 1 20,0"/></svg>"##);
    match &sink.primitives[0] {
        Primitive::Polyline { points, .. } => {
            assert_eq!(points.len(), 4);
            assert!(points_approx_eq(&points[0], &Point2::new(0.0, 0.0)));
            assert!(points_approx_eq(&points[3], &Point2::new(20.0, 0.0)));
        }
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn unit_scale_applies_to_all_coordinates() {
    let config = ConversionConfig {
        svg_unit_to_dxf: 2.0,
        ..Default::default()
    };
    let sink = record_with(
        r##"<svg><circle cx="1" cy="1" r="1" stroke-width="1"/><line x2="3"/></svg>"##,
        &config,
    );
    match &sink.primitives[0] {
        Primitive::Circle {
            center,
            radius,
            style,
        } => {
            assert!(points_approx_eq(center, &Point2::new(2.0, 2.0)));
            assert!(approx_eq(*radius, 2.0));
            assert_eq!(style.lineweight, Some(200));
        }
        other => panic!("unexpected primitive {other:?}"),
    }
    match &sink.primitives[1] {
        Primitive::Line { end, .. } => assert!(points_approx_eq(end, &Point2::new(6.0, 0.0))),
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn malformed_transform_is_identity() {
    let sink = record(r##"<svg><g transform="translate(a,b) scale(2)"><line x2="1"/></g></svg>"##);
    match &sink.primitives[0] {
        Primitive::Line { end, .. } => assert!(points_approx_eq(end, &Point2::new(2.0, 0.0))),
        other => panic!("unexpected primitive {other:?}"),
    }
}

#[test]
fn malformed_points_fail() {
    let document = parse_document(r##"<svg><polyline points="0,0 10"/></svg>"##).unwrap();
    let mut sink = RecordingSink::new();
    let err = convert_node(
        &document.root_element(),
        &mut sink,
        &ConversionConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        FileError::Node {
            source: CoreError::InvalidPointPair(_),
            ..
        }
    ));
    assert!(sink.is_empty());
}

#[test]
fn malformed_path_fails() {
    let result = convert_str(
        r##"<svg><path d="M0,0 L10"/></svg>"##,
        &ConversionConfig::default(),
    );
    assert!(matches!(
        result,
        Err(FileError::Node {
            source: CoreError::InvalidPathData { .. },
            ..
        })
    ));
}

#[test]
fn draw_order_follows_document_order() {
    let sink = record(
        r##"<svg><line x2="1"/><g><circle r="1"/><text>a</text></g><rect width="1" height="1"/></svg>"##,
    );
    let kinds: Vec<_> = sink.primitives.iter().map(Primitive::kind).collect();
    assert_eq!(kinds, ["line", "circle", "text", "polyline"]);
}

#[test]
fn dxf_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("diagram.svg");
    let output = dir.path().join("diagram.dxf");
    std::fs::write(
        &input,
        r##"<svg xmlns="http://www.w3.org/2000/svg">
            <circle cx="10" cy="0" r="5" stroke="#0000ff" stroke-width="1"/>
            <polygon points="0,0 10,0 10,10"/>
            <line x1="0" y1="0" x2="5" y2="5"/>
            <text x="1" y="2" font-size="12pt">Label</text>
            <ellipse rx="1" ry="2"/>
        </svg>"##,
    )
    .unwrap();

    let summary = convert_file(&input, &output, &ConversionConfig::default()).unwrap();
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.skipped.get("ellipse"), Some(&1));

    let drawing = dxf::Drawing::load_file(&output).unwrap();
    let mut kinds = Vec::new();
    for entity in drawing.entities() {
        match &entity.specific {
            dxf::entities::EntityType::Circle(c) => {
                assert!(approx_eq(c.center.x, 10.0));
                assert!(approx_eq(c.radius, 5.0));
                assert_eq!(entity.common.color_24_bit, 0x0000ff);
                assert_eq!(entity.common.lineweight_enum_value, 100);
                kinds.push("circle");
            }
            dxf::entities::EntityType::LwPolyline(p) => {
                assert!(p.is_closed());
                assert_eq!(p.vertices.len(), 3);
                kinds.push("polyline");
            }
            dxf::entities::EntityType::Line(_) => kinds.push("line"),
            dxf::entities::EntityType::Text(t) => {
                assert_eq!(t.value, "Label");
                assert!(approx_eq(t.text_height, 300.0));
                kinds.push("text");
            }
            other => panic!("unexpected entity {other:?}"),
        }
    }
    assert_eq!(kinds, ["circle", "polyline", "line", "text"]);
}
