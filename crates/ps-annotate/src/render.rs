//! Overlay renderer: paints the annotation store over the chart.
//!
//! The pass is best-effort. A line whose endpoints do not map to pixels, or
//! that the canvas refuses, is skipped on its own. A panic anywhere in the
//! pass costs this frame's overlay and nothing else.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::store::{AnnotationLine, AnnotationStore};
use crate::transform::{PixelPoint, ViewportTransform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width: f32,
    /// Unmultiplied RGBA.
    pub color: [u8; 4],
}

impl LineStyle {
    /// Amber at 90% opacity.
    pub const COMMITTED: LineStyle = LineStyle {
        width: 2.0,
        color: [255, 200, 0, 230],
    };

    /// White at 60% opacity.
    pub const DRAFT: LineStyle = LineStyle {
        width: 2.0,
        color: [255, 255, 255, 153],
    };
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("Line endpoint has no pixel position")]
    Unmapped,

    #[error("Non-finite pixel coordinate: {value}")]
    NonFinite { value: f64 },

    #[error("Canvas error: {0}")]
    Canvas(String),
}

/// Drawing surface the overlay paints on.
pub trait Canvas {
    fn stroke_segment(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        style: &LineStyle,
    ) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderReport {
    pub drawn: usize,
    pub skipped: usize,
    pub frame_skipped: bool,
}

impl RenderReport {
    fn skipped_frame() -> Self {
        Self {
            frame_skipped: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRenderer {
    pub committed: LineStyle,
    pub draft: LineStyle,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            committed: LineStyle::COMMITTED,
            draft: LineStyle::DRAFT,
        }
    }
}

impl OverlayRenderer {
    /// Paint committed lines, then the draft. Never panics and never fails.
    pub fn render<C: Canvas + ?Sized>(
        &self,
        store: &AnnotationStore,
        transform: &ViewportTransform,
        canvas: &mut C,
    ) -> RenderReport {
        let pass = panic::catch_unwind(AssertUnwindSafe(|| {
            self.render_pass(store, transform, canvas)
        }));
        match pass {
            Ok(report) => report,
            Err(_) => {
                tracing::warn!("annotation overlay pass panicked; frame skipped");
                RenderReport::skipped_frame()
            }
        }
    }

    fn render_pass<C: Canvas + ?Sized>(
        &self,
        store: &AnnotationStore,
        transform: &ViewportTransform,
        canvas: &mut C,
    ) -> RenderReport {
        if !transform.is_valid() {
            return RenderReport::skipped_frame();
        }

        let mut report = RenderReport::default();
        let draft = store.draft().map(|line| (line, &self.draft));
        let lines = store
            .lines()
            .iter()
            .map(|line| (line, &self.committed))
            .chain(draft);

        for (line, style) in lines {
            match draw_line(line, style, transform, canvas) {
                Ok(()) => report.drawn += 1,
                Err(err) => {
                    tracing::trace!(%err, ?line, "annotation skipped");
                    report.skipped += 1;
                }
            }
        }
        report
    }
}

fn draw_line<C: Canvas + ?Sized>(
    line: &AnnotationLine,
    style: &LineStyle,
    transform: &ViewportTransform,
    canvas: &mut C,
) -> Result<(), RenderError> {
    let from = transform
        .point_to_pixel(line.start())
        .ok_or(RenderError::Unmapped)?;
    let to = transform
        .point_to_pixel(line.end())
        .ok_or(RenderError::Unmapped)?;
    canvas.stroke_segment(from, to, style)
}
