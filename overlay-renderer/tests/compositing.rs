//! Renderer behaviour against a recording surface.
//!
//! Covers:
//! - Page scoping of full redraws
//! - Per-tool composite state and its restoration after every draw
//! - Replay at different box sizes and pixel ratios

use overlay_core::{
    Annotation, BackingSize, Color, ContentBox, Effect, Engine, LoadedDocument, NormalizedPoint,
    PageContent, StrokeKind, SurfaceMetrics, Tool,
};
use overlay_renderer::{
    BlendMode, CompositeStyle, DrawCommand, RecordingSurface, Renderer, Surface,
};

fn metrics(width: f64, height: f64, dpr: f64) -> SurfaceMetrics {
    SurfaceMetrics::new(ContentBox::new(0.0, 0.0, width, height), dpr)
}

fn engine_with_pages(pages: usize) -> Engine {
    let mut engine = Engine::default();
    let ticket = engine.begin_load("doc");
    engine.finish_load(
        &ticket,
        Ok(LoadedDocument {
            id: "doc".into(),
            filename: "doc".into(),
            page_content: PageContent::Images((0..pages).map(|i| format!("{i}.png")).collect()),
            annotations: Vec::new(),
        }),
    );
    engine
}

fn polylines(commands: &[DrawCommand]) -> Vec<(Vec<(f64, f64)>, f64, CompositeStyle)> {
    commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Polyline {
                points,
                line_width,
                composite,
                ..
            } => Some((
                points.iter().map(|p| (p.x, p.y)).collect(),
                *line_width,
                *composite,
            )),
            _ => None,
        })
        .collect()
}

fn drag(
    engine: &mut Engine,
    renderer: &mut Renderer<RecordingSurface>,
    a: (f64, f64),
    b: (f64, f64),
) {
    let effect = engine.pointer_down(a.0, a.1);
    renderer.apply(engine, &effect).expect("down");
    let effect = engine.pointer_move(b.0, b.1);
    renderer.apply(engine, &effect).expect("move");
    let effect = engine.pointer_up();
    renderer.apply(engine, &effect).expect("up");
}

#[test]
fn redraw_shows_only_current_page() {
    let mut engine = engine_with_pages(2);
    let mut renderer = Renderer::new(RecordingSurface::new());
    let effect = engine.calibrate(metrics(100.0, 100.0, 1.0));
    renderer.apply(&engine, &effect).expect("calibrate");

    drag(&mut engine, &mut renderer, (10.0, 10.0), (20.0, 20.0));
    let effect = engine.advance(1);
    assert_eq!(effect, Effect::ShowPage(1));
    let effect = engine.calibrate(metrics(100.0, 100.0, 1.0));
    renderer.apply(&engine, &effect).expect("page 1");
    drag(&mut engine, &mut renderer, (70.0, 70.0), (90.0, 90.0));

    renderer.surface_mut().take_commands();
    renderer.apply(&engine, &Effect::Redraw).expect("redraw");
    let lines = polylines(renderer.surface().commands());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, vec![(70.0, 70.0), (90.0, 90.0)]);

    let effect = engine.advance(-1);
    renderer.surface_mut().take_commands();
    renderer.apply(&engine, &effect).expect("page change");
    let lines = polylines(renderer.surface().commands());
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, vec![(10.0, 10.0), (20.0, 20.0)]);
}

#[test]
fn highlighter_composites_and_restores() {
    let mut engine = engine_with_pages(1);
    let mut renderer = Renderer::new(RecordingSurface::new());
    let effect = engine.calibrate(metrics(200.0, 100.0, 2.0));
    renderer.apply(&engine, &effect).expect("calibrate");
    engine.select_tool(Tool::Highlighter);

    let effect = engine.pointer_down(20.0, 10.0);
    renderer.apply(&engine, &effect).expect("down");
    let effect = engine.pointer_move(100.0, 10.0);
    renderer.surface_mut().take_commands();
    renderer.apply(&engine, &effect).expect("segment");

    let commands = renderer.surface().commands().to_vec();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0], DrawCommand::Composite(CompositeStyle::HIGHLIGHT));
    match &commands[1] {
        DrawCommand::Polyline {
            line_width,
            composite,
            color,
            ..
        } => {
            assert!((line_width - 18.0).abs() < f64::EPSILON);
            assert_eq!(composite.blend, BlendMode::Multiply);
            assert_eq!(color, "#FFEB3B");
        }
        other => panic!("expected polyline, got {other:?}"),
    }
    assert_eq!(commands[2], DrawCommand::Composite(CompositeStyle::NORMAL));
    assert!(renderer.surface().composite().is_normal());
}

#[test]
fn every_draw_is_followed_by_reset() {
    let mut renderer = Renderer::new(RecordingSurface::new());
    renderer.recalibrate(metrics(100.0, 100.0, 1.0)).expect("calibrate");
    let points = vec![NormalizedPoint::new(0.1, 0.1), NormalizedPoint::new(0.2, 0.2)];
    let annotations = vec![
        Annotation::stroke(StrokeKind::Highlighter, Color::default(), 3.0, 0, points.clone()),
        Annotation::text(Color::default(), 2.0, 0, NormalizedPoint::new(0.5, 0.5), "label"),
        Annotation::stroke(StrokeKind::Pen, Color::default(), 3.0, 0, points),
    ];
    renderer.redraw(&annotations).expect("redraw");

    let commands = renderer.surface().commands();
    for (i, command) in commands.iter().enumerate() {
        if matches!(command, DrawCommand::Polyline { .. } | DrawCommand::Text { .. }) {
            assert_eq!(
                commands.get(i + 1),
                Some(&DrawCommand::Composite(CompositeStyle::NORMAL)),
                "draw {i} not followed by reset"
            );
        }
    }
    let text_px = commands.iter().find_map(|c| match c {
        DrawCommand::Text { font_px, .. } => Some(*font_px),
        _ => None,
    });
    assert_eq!(text_px, Some(20.0));
    assert_eq!(renderer.surface().draw_count(), 3);
}

#[test]
fn failed_draw_still_restores_composite() {
    let mut renderer = Renderer::new(RecordingSurface::new());
    renderer.recalibrate(metrics(100.0, 100.0, 1.0)).expect("calibrate");
    renderer.surface_mut().fail_next_draws(1);
    let stroke = Annotation::stroke(
        StrokeKind::Highlighter,
        Color::default(),
        3.0,
        0,
        vec![NormalizedPoint::new(0.0, 0.0), NormalizedPoint::new(1.0, 1.0)],
    );
    assert!(renderer.redraw([&stroke]).is_err());
    assert!(renderer.surface().composite().is_normal());
    assert_eq!(
        renderer.surface().commands().last(),
        Some(&DrawCommand::Composite(CompositeStyle::NORMAL))
    );
}

#[test]
fn single_point_strokes_are_never_drawn() {
    let mut renderer = Renderer::new(RecordingSurface::new());
    renderer.recalibrate(metrics(100.0, 100.0, 1.0)).expect("calibrate");
    let dot = Annotation::stroke(
        StrokeKind::Pen,
        Color::default(),
        3.0,
        0,
        vec![NormalizedPoint::new(0.5, 0.5)],
    );
    renderer.redraw([&dot]).expect("redraw");
    assert_eq!(renderer.surface().draw_count(), 0);
}

#[test]
fn replay_follows_box_size_not_pixel_ratio() {
    let stroke = Annotation::stroke(
        StrokeKind::Pen,
        Color::default(),
        3.0,
        0,
        vec![NormalizedPoint::new(0.25, 0.5), NormalizedPoint::new(0.75, 0.5)],
    );

    let mut small = Renderer::new(RecordingSurface::new());
    small.recalibrate(metrics(400.0, 300.0, 1.0)).expect("calibrate");
    small.redraw([&stroke]).expect("redraw");

    let mut large = Renderer::new(RecordingSurface::new());
    large.recalibrate(metrics(800.0, 600.0, 2.0)).expect("calibrate");
    large.redraw([&stroke]).expect("redraw");

    let a = polylines(small.surface().commands());
    let b = polylines(large.surface().commands());
    assert_eq!(a[0].0, vec![(100.0, 150.0), (300.0, 150.0)]);
    assert_eq!(b[0].0, vec![(200.0, 300.0), (600.0, 300.0)]);
    assert_eq!(
        large.surface().backing(),
        BackingSize {
            width: 1600,
            height: 1200
        }
    );
    assert!((large.surface().scale() - 2.0).abs() < f64::EPSILON);
}

#[test]
fn unsized_metrics_defer_drawing() {
    let mut renderer = Renderer::new(RecordingSurface::new());
    renderer.recalibrate(metrics(0.0, 0.0, 2.0)).expect("ignored");
    assert!(renderer.metrics().is_none());
    renderer.redraw(std::iter::empty()).expect("no-op");
    assert!(renderer.surface().commands().is_empty());
    assert_eq!(renderer.frame_count(), 0);
    assert_eq!(renderer.active_backend(), renderer.surface().backend_type());
}

#[test]
fn segments_for_other_pages_are_not_drawn() {
    let mut engine = engine_with_pages(2);
    let mut renderer = Renderer::new(RecordingSurface::new());
    let effect = engine.calibrate(metrics(100.0, 100.0, 1.0));
    renderer.apply(&engine, &effect).expect("calibrate");

    engine.pointer_down(10.0, 10.0);
    engine.advance(1);
    let effect = engine.pointer_move(30.0, 30.0);
    assert!(matches!(effect, Effect::DrawSegment(_)));
    renderer.surface_mut().take_commands();
    renderer.apply(&engine, &effect).expect("segment");
    assert_eq!(renderer.surface().draw_count(), 0);
}
