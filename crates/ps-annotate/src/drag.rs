//! Pointer-driven drawing state machine.
//!
//! [`DrawingSession`] owns the [`AnnotationStore`] and is the only thing that
//! mutates it. Outside code gets shared access through
//! [`DrawingSession::store`], so a draft can only exist while a drag is in
//! progress.

use crate::store::{AnnotationLine, AnnotationStore};
use crate::transform::{DataPoint, PixelPoint, ViewportTransform};

/// Raw pointer input in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PixelPoint),
    Move(PixelPoint),
    Up(PixelPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pointer is held down; `anchor` is where the line starts.
    Dragging { anchor: DataPoint },
}

/// What a pointer event did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Ignored,
    Started,
    DraftUpdated,
    Committed(AnnotationLine),
    Abandoned,
}

impl DragOutcome {
    /// Whether the overlay needs a repaint.
    pub fn changed(&self) -> bool {
        !matches!(self, DragOutcome::Ignored)
    }
}

#[derive(Debug, Default)]
pub struct DrawingSession {
    drawing_enabled: bool,
    dataset_loaded: bool,
    state: DragState,
    store: AnnotationStore,
}

impl DrawingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn dataset_loaded(&self) -> bool {
        self.dataset_loaded
    }

    /// Turning drawing off discards every annotation, committed or not.
    ///
    /// Drawing cannot be turned on without a dataset; returns the resulting
    /// mode.
    pub fn set_drawing_enabled(&mut self, enabled: bool) -> bool {
        if enabled && !self.dataset_loaded {
            return false;
        }
        self.drawing_enabled = enabled;
        if !enabled {
            self.reset();
            self.store.clear_all();
        }
        self.drawing_enabled
    }

    pub fn toggle_drawing(&mut self) -> bool {
        self.set_drawing_enabled(!self.drawing_enabled)
    }

    /// A new dataset replaced the chart contents (or the chart was emptied).
    /// Drawing is switched off and all annotations are dropped.
    pub fn replace_dataset(&mut self, has_data: bool) {
        self.dataset_loaded = has_data;
        self.set_drawing_enabled(false);
        tracing::debug!(has_data, "annotations cleared for new dataset");
    }

    /// Clear-lines control.
    pub fn clear_annotations(&mut self) {
        self.reset();
        self.store.clear_all();
    }

    /// Abort any drag in progress without committing.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.store.set_draft(None);
    }

    fn accepts_input(&self, transform: &ViewportTransform) -> bool {
        self.drawing_enabled && self.dataset_loaded && transform.is_valid()
    }

    pub fn handle(&mut self, event: PointerEvent, transform: &ViewportTransform) -> DragOutcome {
        let accepts = self.accepts_input(transform);

        match (self.state, event) {
            (DragState::Dragging { anchor }, PointerEvent::Up(pos)) => {
                // Release always ends the drag, even when the guard fails.
                self.reset();
                let end = if accepts {
                    transform.point_to_data(pos)
                } else {
                    None
                };
                match end {
                    Some(end) => {
                        let line = AnnotationLine::between(anchor, end);
                        self.store.commit(line);
                        tracing::debug!(?line, count = self.store.len(), "annotation committed");
                        DragOutcome::Committed(line)
                    }
                    None => {
                        tracing::debug!("drag abandoned: release position not convertible");
                        DragOutcome::Abandoned
                    }
                }
            }
            _ if !accepts => DragOutcome::Ignored,
            (_, PointerEvent::Down(pos)) => match transform.point_to_data(pos) {
                Some(anchor) => {
                    self.store.set_draft(None);
                    self.state = DragState::Dragging { anchor };
                    DragOutcome::Started
                }
                None => DragOutcome::Ignored,
            },
            (DragState::Dragging { anchor }, PointerEvent::Move(pos)) => {
                match transform.point_to_data(pos) {
                    Some(current) => {
                        self.store
                            .set_draft(Some(AnnotationLine::between(anchor, current)));
                        DragOutcome::DraftUpdated
                    }
                    None => DragOutcome::Ignored,
                }
            }
            (DragState::Idle, PointerEvent::Move(_) | PointerEvent::Up(_)) => DragOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::AxisScale;

    fn chart() -> ViewportTransform {
        ViewportTransform::new(
            AxisScale::new(0.0, 10.0, 0.0, 100.0),
            AxisScale::new(0.0, 10.0, 100.0, 0.0),
        )
    }

    fn px(x: f64, y: f64) -> PixelPoint {
        PixelPoint::new(x, y)
    }

    fn ready() -> DrawingSession {
        let mut s = DrawingSession::new();
        s.replace_dataset(true);
        assert!(s.set_drawing_enabled(true));
        s
    }

    #[test]
    fn down_move_up_commits_anchor_to_release() {
        let t = chart();
        let mut s = ready();

        assert_eq!(s.handle(PointerEvent::Down(px(10.0, 90.0)), &t), DragOutcome::Started);
        assert!(s.store().draft().is_none());
        assert_eq!(
            s.state(),
            DragState::Dragging {
                anchor: DataPoint::new(1.0, 1.0)
            }
        );

        assert_eq!(s.handle(PointerEvent::Move(px(50.0, 50.0)), &t), DragOutcome::DraftUpdated);
        assert_eq!(
            s.store().draft(),
            Some(&AnnotationLine::between(
                DataPoint::new(1.0, 1.0),
                DataPoint::new(5.0, 5.0)
            ))
        );
        assert!(s.store().is_empty());

        let outcome = s.handle(PointerEvent::Up(px(80.0, 20.0)), &t);
        let expected = AnnotationLine::between(DataPoint::new(1.0, 1.0), DataPoint::new(8.0, 8.0));
        assert_eq!(outcome, DragOutcome::Committed(expected));
        assert_eq!(s.store().lines(), &[expected]);
        assert!(s.store().draft().is_none());
        assert_eq!(s.state(), DragState::Idle);
    }

    #[test]
    fn many_moves_never_commit() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(0.0, 0.0)), &t);
        for i in 1..20 {
            s.handle(PointerEvent::Move(px(i as f64, i as f64)), &t);
        }
        assert!(s.store().is_empty());
        assert!(s.store().draft().is_some());
    }

    #[test]
    fn invalid_release_abandons_drag() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Move(px(20.0, 20.0)), &t);

        let outcome = s.handle(PointerEvent::Up(px(f64::NAN, 20.0)), &t);
        assert_eq!(outcome, DragOutcome::Abandoned);
        assert!(s.store().is_empty());
        assert!(s.store().draft().is_none());
        assert_eq!(s.state(), DragState::Idle);
    }

    #[test]
    fn release_after_transform_lost_still_returns_to_idle() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Move(px(20.0, 20.0)), &t);

        let outcome = s.handle(
            PointerEvent::Up(px(30.0, 30.0)),
            &ViewportTransform::unavailable(),
        );
        assert_eq!(outcome, DragOutcome::Abandoned);
        assert_eq!(s.state(), DragState::Idle);
        assert!(s.store().draft().is_none());
        assert!(s.store().is_empty());
    }

    #[test]
    fn invalid_move_keeps_drag_and_draft() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Move(px(20.0, 20.0)), &t);
        let before = s.store().draft().copied();

        assert_eq!(
            s.handle(PointerEvent::Move(px(f64::INFINITY, 0.0)), &t),
            DragOutcome::Ignored
        );
        assert_eq!(s.store().draft().copied(), before);
        assert!(matches!(s.state(), DragState::Dragging { .. }));
    }

    #[test]
    fn invalid_press_stays_idle() {
        let t = chart();
        let mut s = ready();
        assert_eq!(
            s.handle(PointerEvent::Down(px(f64::NAN, 0.0)), &t),
            DragOutcome::Ignored
        );
        assert_eq!(s.state(), DragState::Idle);
    }

    #[test]
    fn events_ignored_when_drawing_disabled() {
        let t = chart();
        let mut s = DrawingSession::new();
        s.replace_dataset(true);
        assert_eq!(s.handle(PointerEvent::Down(px(1.0, 1.0)), &t), DragOutcome::Ignored);
        assert_eq!(s.state(), DragState::Idle);
    }

    #[test]
    fn events_ignored_with_invalid_transform() {
        let mut s = ready();
        let t = ViewportTransform::unavailable();
        assert_eq!(s.handle(PointerEvent::Down(px(1.0, 1.0)), &t), DragOutcome::Ignored);
        assert_eq!(s.state(), DragState::Idle);
    }

    #[test]
    fn drawing_cannot_be_enabled_without_dataset() {
        let mut s = DrawingSession::new();
        assert!(!s.set_drawing_enabled(true));
        assert!(!s.drawing_enabled());
        assert!(!s.toggle_drawing());
    }

    #[test]
    fn disabling_drawing_discards_all_lines() {
        let t = chart();
        let mut s = ready();
        for i in 0..4 {
            let x = 10.0 * i as f64;
            s.handle(PointerEvent::Down(px(x, 10.0)), &t);
            s.handle(PointerEvent::Up(px(x + 5.0, 20.0)), &t);
        }
        assert_eq!(s.store().len(), 4);

        s.set_drawing_enabled(false);
        assert_eq!(s.store().len(), 0);
    }

    #[test]
    fn disabling_mid_drag_discards_without_commit() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Move(px(30.0, 30.0)), &t);

        s.toggle_drawing();
        assert_eq!(s.state(), DragState::Idle);
        assert!(s.store().draft().is_none());
        assert!(s.store().is_empty());

        // A late release after the reset is ignored.
        assert_eq!(s.handle(PointerEvent::Up(px(40.0, 40.0)), &t), DragOutcome::Ignored);
        assert!(s.store().is_empty());
    }

    #[test]
    fn replacing_dataset_resets_everything() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Up(px(20.0, 20.0)), &t);
        s.handle(PointerEvent::Down(px(30.0, 30.0)), &t);

        s.replace_dataset(true);
        assert!(s.store().is_empty());
        assert_eq!(s.state(), DragState::Idle);
        assert!(!s.drawing_enabled());
    }

    #[test]
    fn second_press_restarts_drag() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 90.0)), &t);
        s.handle(PointerEvent::Move(px(20.0, 80.0)), &t);
        assert_eq!(s.handle(PointerEvent::Down(px(50.0, 50.0)), &t), DragOutcome::Started);
        assert!(s.store().draft().is_none());
        assert_eq!(
            s.state(),
            DragState::Dragging {
                anchor: DataPoint::new(5.0, 5.0)
            }
        );
    }

    #[test]
    fn clear_annotations_keeps_mode() {
        let t = chart();
        let mut s = ready();
        s.handle(PointerEvent::Down(px(10.0, 10.0)), &t);
        s.handle(PointerEvent::Up(px(20.0, 20.0)), &t);
        s.clear_annotations();
        assert!(s.store().is_empty());
        assert!(s.drawing_enabled());
    }
}
