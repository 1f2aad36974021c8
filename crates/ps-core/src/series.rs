//! Price history backing the chart.
//!
//! The x axis is categorical: sample `i` sits at x position `i as Real` and
//! carries `labels[i]` (a daily date string such as `"2023-01-15"`).
//! Positions between samples are valid chart coordinates;
//! [`PriceSeries::label_at`] resolves them to the nearest sample.

use serde::{Deserialize, Serialize};

use crate::{PsError, PsResult, Real};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<Real>,
}

impl PriceSeries {
    pub fn new(
        name: impl Into<String>,
        labels: Vec<String>,
        values: Vec<Real>,
    ) -> PsResult<Self> {
        if labels.len() != values.len() {
            return Err(PsError::SeriesMismatch {
                labels: labels.len(),
                values: values.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            labels,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Label of the sample nearest to chart position `x`.
    pub fn label_at(&self, x: Real) -> Option<&str> {
        let idx = x.round();
        if !idx.is_finite() || idx < 0.0 {
            return None;
        }
        self.labels.get(idx as usize).map(String::as_str)
    }

    pub fn last_value(&self) -> Option<Real> {
        self.values.last().copied()
    }

    /// Min and max over the finite samples.
    pub fn value_range(&self) -> Option<(Real, Real)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// `[x, price]` pairs in plot coordinates.
    pub fn points(&self) -> Vec<[Real; 2]> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| [i as Real, *v])
            .collect()
    }

    /// Trailing simple moving average over `window` samples.
    ///
    /// The first `window - 1` entries have no value. A window of 0 or 1
    /// yields an empty vector.
    pub fn moving_average(&self, window: usize) -> Vec<Option<Real>> {
        if window <= 1 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(self.values.len());
        let mut sum = 0.0;
        for (i, v) in self.values.iter().enumerate() {
            sum += v;
            if i >= window {
                sum -= self.values[i - window];
            }
            if i + 1 < window {
                out.push(None);
            } else {
                out.push(Some(sum / window as Real));
            }
        }
        out
    }
}
