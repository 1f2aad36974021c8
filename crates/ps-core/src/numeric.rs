//! Float helpers shared by the chart transform and its tests.

/// Floating point type used for prices and chart coordinates.
pub type Real = f64;

/// Absolute and relative slack for comparing mapped coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
        }
    }
}

impl Tolerances {
    /// Widen the absolute slack to cover rounding over an interval of `span`.
    pub fn scaled_to(self, span: Real) -> Self {
        Self {
            abs: self.abs.max(span.abs() * self.rel),
            ..self
        }
    }

    pub fn approx_eq(&self, a: Real, b: Real) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }
}

/// `Some(v)` if `v` is finite.
#[inline]
pub fn finite(v: Real) -> Option<Real> {
    v.is_finite().then_some(v)
}

/// Point at fraction `t` of the way from `a` to `b`.
#[inline]
pub fn lerp(a: Real, b: Real, t: Real) -> Option<Real> {
    finite(a + t * (b - a))
}

/// Fraction of the way `v` lies from `a` to `b`; `None` when `a == b`.
#[inline]
pub fn inverse_lerp(a: Real, b: Real, v: Real) -> Option<Real> {
    let span = b - a;
    if span == 0.0 {
        return None;
    }
    finite((v - a) / span)
}
