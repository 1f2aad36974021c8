//! Annotation store: committed lines plus at most one draft.

use ps_core::Real;

use crate::transform::DataPoint;

/// A straight annotation line in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationLine {
    pub x1: Real,
    pub y1: Real,
    pub x2: Real,
    pub y2: Real,
}

/// The uncommitted line that follows the pointer during a drag.
pub type DraftLine = AnnotationLine;

impl AnnotationLine {
    pub fn between(start: DataPoint, end: DataPoint) -> Self {
        Self {
            x1: start.x,
            y1: start.y,
            x2: end.x,
            y2: end.y,
        }
    }

    pub fn start(&self) -> DataPoint {
        DataPoint::new(self.x1, self.y1)
    }

    pub fn end(&self) -> DataPoint {
        DataPoint::new(self.x2, self.y2)
    }

    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    lines: Vec<AnnotationLine>,
    draft: Option<DraftLine>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line. Geometry is not validated.
    pub fn commit(&mut self, line: AnnotationLine) {
        self.lines.push(line);
    }

    pub fn set_draft(&mut self, draft: Option<DraftLine>) {
        self.draft = draft;
    }

    pub fn clear_all(&mut self) {
        self.lines.clear();
        self.draft = None;
    }

    pub fn lines(&self) -> &[AnnotationLine] {
        &self.lines
    }

    pub fn draft(&self) -> Option<&DraftLine> {
        self.draft.as_ref()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
