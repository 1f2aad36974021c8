use egui::{Color32, Painter, Stroke, pos2};

use ps_annotate::{Canvas, LineStyle, PixelPoint, RenderError};

/// Overlay canvas backed by a painter clipped to the plot frame.
pub struct PainterCanvas<'a> {
    painter: &'a Painter,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a Painter) -> Self {
        Self { painter }
    }
}

impl Canvas for PainterCanvas<'_> {
    fn stroke_segment(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        style: &LineStyle,
    ) -> Result<(), RenderError> {
        for value in [from.x, from.y, to.x, to.y] {
            if !value.is_finite() {
                return Err(RenderError::NonFinite { value });
            }
        }
        let [r, g, b, a] = style.color;
        self.painter.line_segment(
            [
                pos2(from.x as f32, from.y as f32),
                pos2(to.x as f32, to.y as f32),
            ],
            Stroke::new(style.width, Color32::from_rgba_unmultiplied(r, g, b, a)),
        );
        Ok(())
    }
}
