//! Viewport transform: the chart's current axis scales.
//!
//! Every query returns `None` instead of failing when a scale is missing
//! (chart not laid out, no data) or a result is not finite. Callers sit on the
//! repaint path, so nothing here panics.

use ps_core::{Real, inverse_lerp, lerp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Time / category position.
    X,
    /// Price.
    Y,
}

/// A point in chart data space: `x` is the category position, `y` the price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DataPoint {
    pub x: Real,
    pub y: Real,
}

impl DataPoint {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }
}

/// A point in pixel space, relative to the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: Real,
    pub y: Real,
}

impl PixelPoint {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }
}

/// Linear mapping between a data interval and a pixel interval.
///
/// The pixel interval may run backwards (the y axis grows downwards on
/// screen while prices grow upwards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScale {
    data_min: Real,
    data_max: Real,
    pixel_start: Real,
    pixel_end: Real,
}

impl AxisScale {
    /// Returns `None` for non-finite bounds or a zero-width interval on
    /// either side.
    pub fn new(data_min: Real, data_max: Real, pixel_start: Real, pixel_end: Real) -> Option<Self> {
        let bounds = [data_min, data_max, pixel_start, pixel_end];
        if bounds.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if data_max - data_min == 0.0 || pixel_end - pixel_start == 0.0 {
            return None;
        }
        Some(Self {
            data_min,
            data_max,
            pixel_start,
            pixel_end,
        })
    }

    pub fn data_range(&self) -> (Real, Real) {
        (self.data_min, self.data_max)
    }

    pub fn pixel_range(&self) -> (Real, Real) {
        (self.pixel_start, self.pixel_end)
    }

    pub fn to_pixel(&self, value: Real) -> Option<Real> {
        let t = inverse_lerp(self.data_min, self.data_max, value)?;
        lerp(self.pixel_start, self.pixel_end, t)
    }

    pub fn to_data(&self, pixel: Real) -> Option<Real> {
        let t = inverse_lerp(self.pixel_start, self.pixel_end, pixel)?;
        lerp(self.data_min, self.data_max, t)
    }
}

/// Both axis scales of the chart, either of which may be unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportTransform {
    x: Option<AxisScale>,
    y: Option<AxisScale>,
}

impl ViewportTransform {
    pub fn new(x: Option<AxisScale>, y: Option<AxisScale>) -> Self {
        Self { x, y }
    }

    /// Transform of a chart that has not been laid out yet.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    pub fn scale(&self, axis: Axis) -> Option<&AxisScale> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
        }
    }

    pub fn to_pixel(&self, axis: Axis, value: Real) -> Option<Real> {
        self.scale(axis)?.to_pixel(value)
    }

    pub fn to_data(&self, axis: Axis, pixel: Real) -> Option<Real> {
        self.scale(axis)?.to_data(pixel)
    }

    /// Both coordinates must resolve; one bad axis invalidates the point.
    pub fn point_to_pixel(&self, p: DataPoint) -> Option<PixelPoint> {
        Some(PixelPoint {
            x: self.to_pixel(Axis::X, p.x)?,
            y: self.to_pixel(Axis::Y, p.y)?,
        })
    }

    pub fn point_to_data(&self, p: PixelPoint) -> Option<DataPoint> {
        Some(DataPoint {
            x: self.to_data(Axis::X, p.x)?,
            y: self.to_data(Axis::Y, p.y)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> ViewportTransform {
        // 3 samples across 200 px, prices 90..110 over 300 px (y flipped)
        ViewportTransform::new(
            AxisScale::new(0.0, 2.0, 0.0, 200.0),
            AxisScale::new(90.0, 110.0, 300.0, 0.0),
        )
    }

    #[test]
    fn maps_both_axes() {
        let t = chart();
        assert_eq!(t.to_pixel(Axis::X, 1.0), Some(100.0));
        assert_eq!(t.to_pixel(Axis::Y, 100.0), Some(150.0));
        assert_eq!(t.to_pixel(Axis::Y, 110.0), Some(0.0));
        assert_eq!(t.to_data(Axis::Y, 300.0), Some(90.0));
    }

    #[test]
    fn unavailable_transform_is_invalid_and_quiet() {
        let t = ViewportTransform::unavailable();
        assert!(!t.is_valid());
        assert_eq!(t.to_pixel(Axis::X, 1.0), None);
        assert_eq!(t.to_data(Axis::Y, 1.0), None);
        assert_eq!(t.point_to_data(PixelPoint::new(1.0, 1.0)), None);
    }

    #[test]
    fn single_missing_axis_invalidates_points() {
        let t = ViewportTransform::new(AxisScale::new(0.0, 2.0, 0.0, 200.0), None);
        assert!(!t.is_valid());
        assert_eq!(t.to_pixel(Axis::X, 1.0), Some(100.0));
        assert_eq!(t.point_to_pixel(DataPoint::new(1.0, 100.0)), None);
    }

    #[test]
    fn degenerate_scales_are_rejected() {
        assert!(AxisScale::new(5.0, 5.0, 0.0, 100.0).is_none());
        assert!(AxisScale::new(0.0, 1.0, 40.0, 40.0).is_none());
        assert!(AxisScale::new(Real::NAN, 1.0, 0.0, 100.0).is_none());
        assert!(AxisScale::new(0.0, Real::INFINITY, 0.0, 100.0).is_none());
    }

    #[test]
    fn non_finite_input_yields_none() {
        let t = chart();
        assert_eq!(t.to_pixel(Axis::X, Real::NAN), None);
        assert_eq!(t.to_data(Axis::Y, Real::INFINITY), None);
        assert_eq!(t.point_to_data(PixelPoint::new(10.0, Real::NAN)), None);
    }

    #[test]
    fn values_outside_bounds_still_map() {
        let t = chart();
        assert_eq!(t.to_pixel(Axis::X, -1.0), Some(-100.0));
        assert_eq!(t.to_data(Axis::X, 300.0), Some(3.0));
    }
}
