//! End-to-end drawing over a loaded price series.

use ps_annotate::{
    AxisScale, DataPoint, DragOutcome, DrawingSession, OverlayRenderer, PixelPoint, PointerEvent,
    ViewportTransform,
};
use ps_core::PriceSeries;

fn monthly_series() -> PriceSeries {
    PriceSeries::new(
        "BTC",
        vec!["2023-01".into(), "2023-02".into(), "2023-03".into()],
        vec![100.0, 110.0, 90.0],
    )
    .expect("series should build")
}

/// Chart laid out over a 200x300 px frame, y axis spanning the series range.
fn layout(series: &PriceSeries, width: f64, height: f64) -> ViewportTransform {
    let (lo, hi) = series.value_range().expect("series has values");
    ViewportTransform::new(
        AxisScale::new(0.0, (series.len() - 1) as f64, 0.0, width),
        AxisScale::new(lo, hi, height, 0.0),
    )
}

fn to_px(t: &ViewportTransform, x: f64, y: f64) -> PixelPoint {
    t.point_to_pixel(DataPoint::new(x, y))
        .expect("point should map")
}

#[test]
fn drag_across_series_commits_labelled_line() {
    let series = monthly_series();
    let transform = layout(&series, 200.0, 300.0);

    let mut session = DrawingSession::new();
    session.replace_dataset(!series.is_empty());
    assert!(session.set_drawing_enabled(true));

    session.handle(PointerEvent::Down(to_px(&transform, 0.0, 100.0)), &transform);
    session.handle(PointerEvent::Move(to_px(&transform, 1.0, 105.0)), &transform);
    let outcome = session.handle(PointerEvent::Up(to_px(&transform, 2.0, 90.0)), &transform);
    assert!(matches!(outcome, DragOutcome::Committed(_)));

    let lines = session.store().lines();
    assert_eq!(lines.len(), 1);
    let line = lines[0];
    assert_eq!(series.label_at(line.x1), Some("2023-01"));
    assert!((line.y1 - 100.0).abs() < 1e-9);
    assert_eq!(series.label_at(line.x2), Some("2023-03"));
    assert!((line.y2 - 90.0).abs() < 1e-9);
    assert!(session.store().draft().is_none());
}

#[test]
fn committed_lines_follow_resize() {
    let series = monthly_series();
    let small = layout(&series, 200.0, 300.0);

    let mut session = DrawingSession::new();
    session.replace_dataset(true);
    session.set_drawing_enabled(true);
    session.handle(PointerEvent::Down(to_px(&small, 0.0, 100.0)), &small);
    session.handle(PointerEvent::Up(to_px(&small, 2.0, 90.0)), &small);

    // Same data, twice the surface: endpoints land on the same prices.
    let large = layout(&series, 400.0, 600.0);
    let line = session.store().lines()[0];
    let start = large.point_to_pixel(line.start()).unwrap();
    let end = large.point_to_pixel(line.end()).unwrap();
    assert!((start.x - 0.0).abs() < 1e-9);
    assert!((start.y - 300.0).abs() < 1e-9);
    assert!((end.x - 400.0).abs() < 1e-9);
    assert!((end.y - 600.0).abs() < 1e-9);
}

#[test]
fn loading_new_symbol_discards_annotations() {
    let series = monthly_series();
    let transform = layout(&series, 200.0, 300.0);

    let mut session = DrawingSession::new();
    session.replace_dataset(true);
    session.set_drawing_enabled(true);
    session.handle(PointerEvent::Down(to_px(&transform, 0.0, 100.0)), &transform);
    session.handle(PointerEvent::Up(to_px(&transform, 1.0, 110.0)), &transform);
    assert_eq!(session.store().len(), 1);

    session.replace_dataset(true);
    assert!(session.store().is_empty());

    struct NullCanvas;
    impl ps_annotate::Canvas for NullCanvas {
        fn stroke_segment(
            &mut self,
            _from: PixelPoint,
            _to: PixelPoint,
            _style: &ps_annotate::LineStyle,
        ) -> Result<(), ps_annotate::RenderError> {
            Ok(())
        }
    }
    let report = OverlayRenderer::default().render(session.store(), &transform, &mut NullCanvas);
    assert_eq!(report.drawn, 0);
}

#[test]
fn chart_without_data_ignores_pointer() {
    let mut session = DrawingSession::new();
    session.replace_dataset(false);
    assert!(!session.set_drawing_enabled(true));

    let outcome = session.handle(
        PointerEvent::Down(PixelPoint::new(10.0, 10.0)),
        &ViewportTransform::unavailable(),
    );
    assert_eq!(outcome, DragOutcome::Ignored);
}
