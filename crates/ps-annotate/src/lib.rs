//! ps-annotate: freehand annotation overlay for the price chart.
//!
//! Pointer input arrives in pixel space; annotations are stored in data space
//! so they stay attached to prices and dates across resize, pan, and zoom.
//!
//! - [`transform`]: data <-> pixel mapping with explicit invalid states
//! - [`store`]: committed lines plus the single in-progress draft
//! - [`drag`]: the pointer-driven drawing state machine
//! - [`render`]: best-effort paint pass over any [`Canvas`]

pub mod drag;
pub mod render;
pub mod store;
pub mod transform;

pub use drag::{DragOutcome, DragState, DrawingSession, PointerEvent};
pub use render::{Canvas, LineStyle, OverlayRenderer, RenderError, RenderReport};
pub use store::{AnnotationLine, AnnotationStore, DraftLine};
pub use transform::{Axis, AxisScale, DataPoint, PixelPoint, ViewportTransform};
