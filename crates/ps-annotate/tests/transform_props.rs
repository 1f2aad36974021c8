//! Property tests for the viewport transform.

use proptest::prelude::*;
use ps_annotate::{Axis, AxisScale, DataPoint, PixelPoint, ViewportTransform};
use ps_core::Tolerances;

fn tol() -> Tolerances {
    Tolerances {
        abs: 1e-6,
        rel: 1e-9,
    }
}

prop_compose! {
    fn scale()(
        data_min in -1e6f64..1e6,
        data_span in 1e-3f64..1e6,
        pixel_start in -2000.0f64..2000.0,
        pixel_span in 10.0f64..4000.0,
        flipped in any::<bool>(),
    ) -> AxisScale {
        let (start, end) = if flipped {
            (pixel_start + pixel_span, pixel_start)
        } else {
            (pixel_start, pixel_start + pixel_span)
        };
        AxisScale::new(data_min, data_min + data_span, start, end).expect("non-degenerate scale")
    }
}

proptest! {
    #[test]
    fn data_pixel_roundtrip(x_scale in scale(), y_scale in scale(), u in 0.0f64..1.0, v in 0.0f64..1.0) {
        let t = ViewportTransform::new(Some(x_scale), Some(y_scale));
        let (x_lo, x_hi) = x_scale.data_range();
        let (y_lo, y_hi) = y_scale.data_range();
        let p = DataPoint::new(x_lo + u * (x_hi - x_lo), y_lo + v * (y_hi - y_lo));

        let pixel = t.point_to_pixel(p).expect("valid transform maps finite points");
        let back = t.point_to_data(pixel).expect("inverse maps finite pixels");

        let x_tol = tol().scaled_to(x_hi - x_lo);
        let y_tol = tol().scaled_to(y_hi - y_lo);
        prop_assert!(x_tol.approx_eq(back.x, p.x), "x: {} vs {}", back.x, p.x);
        prop_assert!(y_tol.approx_eq(back.y, p.y), "y: {} vs {}", back.y, p.y);
    }

    #[test]
    fn missing_axis_never_maps(x_scale in scale(), px in -1e4f64..1e4, py in -1e4f64..1e4) {
        let t = ViewportTransform::new(Some(x_scale), None);
        prop_assert!(!t.is_valid());
        prop_assert!(t.point_to_data(PixelPoint::new(px, py)).is_none());
        prop_assert!(t.to_data(Axis::Y, py).is_none());
    }
}
