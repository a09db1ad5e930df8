//! Property tests for the coordinate model, wire format and eraser.

use overlay_core::{
    Annotation, AnnotationSet, CaptureOutcome, Color, ContentBox, Eraser, NormalizedPoint,
    PageNavigator, StrokeCapture, StrokeKind, SurfaceMetrics,
};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = NormalizedPoint> {
    (-0.5f64..1.5, -0.5f64..1.5).prop_map(|(x, y)| NormalizedPoint::new(x, y))
}

fn color() -> impl Strategy<Value = Color> {
    prop_oneof![
        "#[0-9a-fA-F]{6}".prop_map(|s| Color::parse(&s).expect("generated color")),
        "#[0-9a-fA-F]{3}".prop_map(|s| Color::parse(&s).expect("generated color")),
    ]
}

fn annotation() -> impl Strategy<Value = Annotation> {
    let stroke = (
        prop_oneof![Just(StrokeKind::Pen), Just(StrokeKind::Highlighter)],
        color(),
        0.5f64..20.0,
        0usize..10,
        prop::collection::vec(point(), 2..30),
    )
        .prop_map(|(kind, color, width, page, points)| {
            Annotation::stroke(kind, color, width, page, points)
        });
    let text = (color(), 0.5f64..20.0, 0usize..10, point(), "[a-zA-Z0-9 ]{1,40}")
        .prop_map(|(color, width, page, anchor, text)| {
            Annotation::text(color, width, page, anchor, text)
        });
    prop_oneof![stroke, text]
}

proptest! {
    #[test]
    fn wire_round_trip_preserves_annotations(annotations in prop::collection::vec(annotation(), 0..20)) {
        let set = AnnotationSet::from(annotations);
        let json = set.to_json().expect("serialize");
        let back = AnnotationSet::from_json(&json).expect("parse");
        prop_assert_eq!(back, set);
    }

    #[test]
    fn replay_scales_with_box_size(
        p in (0.0f64..1.0, 0.0f64..1.0),
        size in (50.0f64..2000.0, 50.0f64..2000.0),
        factor in 0.25f64..4.0,
        dpr in prop_oneof![Just(1.0f64), Just(1.5), Just(2.0), Just(3.0)],
    ) {
        let before = SurfaceMetrics::new(ContentBox::new(10.0, 20.0, size.0, size.1), 1.0);
        let after = SurfaceMetrics::new(
            ContentBox::new(0.0, 0.0, size.0 * factor, size.1 * factor),
            dpr,
        );
        let client_x = 10.0 + p.0 * size.0;
        let client_y = 20.0 + p.1 * size.1;
        let normalized = before.normalize(client_x, client_y).expect("sized");

        let css_before = before.to_css(&normalized);
        let css_after = after.to_css(&normalized);
        prop_assert!((css_after.x - css_before.x * factor).abs() < 1e-6);
        prop_assert!((css_after.y - css_before.y * factor).abs() < 1e-6);
        prop_assert!((css_after.x / (size.0 * factor) - p.0).abs() < 1e-9);
    }

    #[test]
    fn eraser_boundary(offset in 0.0f64..0.1, angle in 0.0f64..std::f64::consts::TAU) {
        let threshold = 0.05;
        let eps = 1e-9;
        let anchor = NormalizedPoint::new(0.5, 0.5);
        let at = |r: f64| NormalizedPoint::new(0.5 + r * angle.cos(), 0.5 + r * angle.sin());
        let label = Annotation::text(Color::default(), 3.0, 0, anchor, "x");

        let mut inside = AnnotationSet::from(vec![label.clone()]);
        Eraser::new(threshold).erase(&mut inside, 0, &at(threshold - eps));
        prop_assert!(inside.is_empty());

        let mut outside = AnnotationSet::from(vec![label]);
        Eraser::new(threshold).erase(&mut outside, 0, &at(threshold + eps + offset));
        prop_assert_eq!(outside.len(), 1);
    }

    #[test]
    fn navigator_stays_in_range(total in 1usize..50, deltas in prop::collection::vec(-60i64..60, 0..40)) {
        let mut nav = PageNavigator::new(total);
        for delta in deltas {
            let before = nav.current();
            match nav.advance(delta) {
                Some(page) => prop_assert_eq!(page, nav.current()),
                None => prop_assert_eq!(before, nav.current()),
            }
            prop_assert!(nav.current() < total);
        }
    }

    #[test]
    fn single_point_capture_is_discarded(p in point(), page in 0usize..5) {
        let mut capture = StrokeCapture::new();
        prop_assert!(capture.begin(StrokeKind::Pen, Color::default(), 3.0, page, p));
        prop_assert_eq!(capture.finish(), CaptureOutcome::Discarded);
    }
}
