//! # Sequential Coordinate Sweep
//!
//! This is the numerical heart of the estimator. For one arrival it revisits
//! every coordinate of the weight vector exactly once, solving the L1-penalized
//! one-dimensional problem for that coordinate in closed form while holding the
//! others fixed.
//!
//! The sweep is Gauss–Seidel: coordinates are visited in a fixed order and each
//! update is visible to every coordinate that comes after it in the same sweep.
//! Reordering the sweep, or running it in parallel, changes the answer. The
//! estimator always runs `CoordinateOrder::Ascending`; the descending order
//! exists so that dependence can be observed directly.
//!
//! For coordinate `j` the sweep:
//!
//! 1. Forms the cross-term of all *other* coordinates,
//!    `features[j] * sum_{k != j} features[k] * theta[k]`.
//! 2. Subtracts it from `xy[j]`. The subtraction is permanent: the mutated
//!    accumulator is what the next arrival starts from.
//! 3. Soft-thresholds `xy[j]` by the global penalty and rescales by `xx[j]`.

use crate::error::LassoError;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// The order in which a sweep visits coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateOrder {
    /// `0, 1, ..., P-1`. The estimator's order.
    #[default]
    Ascending,
    /// `P-1, ..., 1, 0`.
    Descending,
}

impl CoordinateOrder {
    fn visit(self, dimension: usize) -> impl Iterator<Item = usize> {
        let forward = self == Self::Ascending;
        (0..dimension).map(move |i| if forward { i } else { dimension - 1 - i })
    }
}

/// What to do with a coordinate whose feature has never carried any energy.
///
/// With `xx[j] == 0` the closed-form update divides by zero. Nothing has been
/// learned about such a feature yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneracyPolicy {
    /// Pin the coordinate at zero and report its index in the sweep result.
    #[default]
    HoldAtZero,
    /// Fail the whole arrival with `LassoError::NumericalDegeneracy`.
    Reject,
}

/// For every feature index `j`, the ascending list of all other indices.
///
/// Fixed at construction for a given dimension. The sets are produced on
/// demand rather than stored, which keeps memory linear in the dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplementSets {
    dimension: usize,
}

impl ComplementSets {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// `{0, ..., P-1} \ {j}`, ascending.
    pub fn of(&self, j: usize) -> impl Iterator<Item = usize> {
        (0..j).chain(j + 1..self.dimension)
    }
}

/// The outcome of one sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSweep {
    pub theta: Array1<f64>,
    /// The cross-correlation accumulator after the in-sweep subtractions.
    pub xy: Array1<f64>,
    /// Coordinates held at zero because their energy was zero, in visit order.
    pub degenerate: Vec<usize>,
}

/// The L1 proximal operator: moves `value` toward zero by `threshold`,
/// clamping at zero.
#[inline]
pub fn soft_threshold(value: f64, threshold: f64) -> f64 {
    let shrunk = (value.abs() - threshold).max(0.0);
    if shrunk == 0.0 {
        0.0
    } else {
        value.signum() * shrunk
    }
}

/// Closed-form coordinate minimizer, or `None` when the feature has no energy.
#[inline]
pub fn coordinate_estimate(xy_j: f64, xx_j: f64, penalty: f64) -> Option<f64> {
    if xx_j == 0.0 {
        None
    } else {
        Some(soft_threshold(xy_j, penalty) / xx_j)
    }
}

/// Runs one sweep over every coordinate.
///
/// `xy` and `theta` are taken by value and returned transformed inside the
/// `CoordinateSweep`. The arguments are not touched when an error is returned
/// for a dimension mismatch; under `DegeneracyPolicy::Reject` the partially
/// swept vectors are dropped.
pub fn update_coordinates(
    features: ArrayView1<f64>,
    mut xy: Array1<f64>,
    mut theta: Array1<f64>,
    xx: ArrayView1<f64>,
    penalty: f64,
    complements: &ComplementSets,
    order: CoordinateOrder,
    policy: DegeneracyPolicy,
) -> Result<CoordinateSweep, LassoError> {
    let dimension = complements.dimension();
    for (context, found) in [
        ("feature vector", features.len()),
        ("cross-correlation accumulator", xy.len()),
        ("weight vector", theta.len()),
        ("energy accumulator", xx.len()),
    ] {
        if found != dimension {
            return Err(LassoError::DimensionMismatch {
                context,
                expected: dimension,
                found,
            });
        }
    }

    let mut degenerate = Vec::new();
    for j in order.visit(dimension) {
        let cross: f64 = complements.of(j).map(|k| features[k] * theta[k]).sum();
        xy[j] -= features[j] * cross;

        match coordinate_estimate(xy[j], xx[j], penalty) {
            Some(weight) => theta[j] = weight,
            None => match policy {
                DegeneracyPolicy::HoldAtZero => {
                    theta[j] = 0.0;
                    degenerate.push(j);
                }
                DegeneracyPolicy::Reject => {
                    return Err(LassoError::NumericalDegeneracy { index: j });
                }
            },
        }
    }

    Ok(CoordinateSweep {
        theta,
        xy,
        degenerate,
    })
}
