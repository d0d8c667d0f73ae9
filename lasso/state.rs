//! # Estimator State
//!
//! The full memory of the online estimator lives in a single immutable record,
//! `LassoState`. Each arrival consumes a borrowed state and produces a brand-new
//! one, so a caller can never observe a half-updated accumulator and never has
//! to reason about aliasing between successive calls.

use crate::error::LassoError;
use ndarray::{Array1, ArrayView1};

/// The accumulators and weight estimate threaded from one arrival to the next.
///
/// # Fields
///
/// * `xy`: The cross-correlation accumulator. After the first arrival this is
///   **not** the plain running sum of `features[j] * label`: every coordinate
///   sweep permanently subtracts the cross-term of the other coordinates from
///   it (see `coordinate::update_coordinates`). That subtraction is never
///   undone, so `xy` drifts away from the pure sufficient statistic over time.
/// * `xx`: The per-feature energy, the running sum of `features[j]^2`.
///   Always non-negative and non-decreasing across arrivals.
/// * `theta`: The current sparse weight estimate. It is recomputed from the
///   accumulators at every arrival and carries no memory of its own beyond
///   being the starting point for coordinates not yet visited in a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoState {
    xy: Array1<f64>,
    xx: Array1<f64>,
    theta: Array1<f64>,
}

impl LassoState {
    /// An empty state for `dimension` features: no arrivals seen, all zeros.
    pub fn new(dimension: usize) -> Self {
        Self {
            xy: Array1::zeros(dimension),
            xx: Array1::zeros(dimension),
            theta: Array1::zeros(dimension),
        }
    }

    /// Rebuilds a state from raw parts, e.g. to resume a stream.
    ///
    /// All three vectors must share one length, every entry must be finite,
    /// and every energy must be non-negative.
    pub fn from_parts(
        xy: Array1<f64>,
        xx: Array1<f64>,
        theta: Array1<f64>,
    ) -> Result<Self, LassoError> {
        let dimension = xy.len();
        if xx.len() != dimension {
            return Err(LassoError::DimensionMismatch {
                context: "energy accumulator",
                expected: dimension,
                found: xx.len(),
            });
        }
        if theta.len() != dimension {
            return Err(LassoError::DimensionMismatch {
                context: "weight vector",
                expected: dimension,
                found: theta.len(),
            });
        }
        ensure_finite("cross-correlation accumulator", xy.view())?;
        ensure_finite("energy accumulator", xx.view())?;
        ensure_finite("weight vector", theta.view())?;
        if let Some((index, &value)) = xx.iter().enumerate().find(|(_, v)| **v < 0.0) {
            return Err(LassoError::NegativeEnergy { index, value });
        }
        Ok(Self { xy, xx, theta })
    }

    pub(crate) fn from_parts_unchecked(
        xy: Array1<f64>,
        xx: Array1<f64>,
        theta: Array1<f64>,
    ) -> Self {
        Self { xy, xx, theta }
    }

    pub fn dimension(&self) -> usize {
        self.theta.len()
    }

    pub fn xy(&self) -> ArrayView1<'_, f64> {
        self.xy.view()
    }

    pub fn xx(&self) -> ArrayView1<'_, f64> {
        self.xx.view()
    }

    pub fn theta(&self) -> ArrayView1<'_, f64> {
        self.theta.view()
    }

    /// Ascending indices of the features with a nonzero weight.
    pub fn support(&self) -> Vec<usize> {
        self.theta
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Consumes the state, handing back `(xy, xx, theta)`.
    pub fn into_parts(self) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        (self.xy, self.xx, self.theta)
    }
}

/// Fails with `NonFiniteState` at the first NaN or infinite entry.
pub(crate) fn ensure_finite(
    vector: &'static str,
    values: ArrayView1<f64>,
) -> Result<(), LassoError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(LassoError::NonFiniteState { vector, index }),
        None => Ok(()),
    }
}
