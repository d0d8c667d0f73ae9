//! # Synthetic Sparse Regression Data
//!
//! Builds a ground truth for exercising the online estimator: a Gaussian
//! feature matrix, a weight vector with a known number of nonzero entries at
//! uniformly chosen positions, and the noiseless labels they imply.
//!
//! Every draw comes from one seeded `StdRng`, in a fixed order (features, then
//! weights, then the zeroed positions), so a configuration always reproduces
//! the same dataset.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Number of available features, `P`.
    pub total_features: usize,
    /// Number of features the true model uses, `p <= P`.
    pub true_features: usize,
    /// Number of arrivals, `T`.
    pub arrivals: usize,
    /// Standard deviation of every feature draw.
    pub feature_std: f64,
    /// Standard deviation of every nonzero true weight.
    pub weight_std: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            total_features: 50,
            true_features: 5,
            arrivals: 500,
            feature_std: 1.0,
            weight_std: 1.0,
            seed: 42,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error(
        "The true model uses {true_features} features, but only {total_features} are available."
    )]
    InvalidConfiguration {
        true_features: usize,
        total_features: usize,
    },

    #[error("The spread parameter '{name}' must be finite and positive, but was {value}.")]
    InvalidSpread { name: &'static str, value: f64 },

    #[error("At least one feature must be available.")]
    EmptyDimension,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.total_features == 0 {
            return Err(SimulationError::EmptyDimension);
        }
        if self.true_features > self.total_features {
            return Err(SimulationError::InvalidConfiguration {
                true_features: self.true_features,
                total_features: self.total_features,
            });
        }
        for (name, value) in [
            ("feature_std", self.feature_std),
            ("weight_std", self.weight_std),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::InvalidSpread { name, value });
            }
        }
        Ok(())
    }
}

/// A generated dataset together with the truth it was generated from.
#[derive(Debug, Clone)]
pub struct SyntheticData {
    /// Noiseless labels, `features · theta`. Length `T`.
    pub labels: Array1<f64>,
    /// Shape `[T, P]`; row `t` is the `t`-th arrival.
    pub features: Array2<f64>,
    /// The true weights: exactly `p` nonzero entries.
    pub theta: Array1<f64>,
    /// Ascending indices of the nonzero entries of `theta`.
    pub support: Vec<usize>,
}

/// Generates a dataset from the configuration's own seed.
pub fn generate_data(config: &SimulationConfig) -> Result<SyntheticData, SimulationError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    generate_data_with_rng(config, &mut rng)
}

/// Generates a dataset from a caller-supplied random source.
///
/// The configuration is validated before a single number is drawn.
pub fn generate_data_with_rng<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SyntheticData, SimulationError> {
    config.validate()?;
    let total = config.total_features;

    let feature_dist = normal("feature_std", config.feature_std)?;
    let weight_dist = normal("weight_std", config.weight_std)?;

    let features = Array2::from_shape_fn((config.arrivals, total), |_| {
        feature_dist.sample(&mut *rng)
    });
    let mut theta = Array1::from_shape_fn(total, |_| weight_dist.sample(&mut *rng));

    let mut keep = vec![true; total];
    for j in index::sample(&mut *rng, total, total - config.true_features).into_iter() {
        theta[j] = 0.0;
        keep[j] = false;
    }
    let support: Vec<usize> = (0..total).filter(|&j| keep[j]).collect();

    let labels = features.dot(&theta);

    log::info!(
        "Generated {} arrivals over {} features; true support {:?}",
        config.arrivals,
        total,
        support
    );

    Ok(SyntheticData {
        labels,
        features,
        theta,
        support,
    })
}

fn normal(name: &'static str, std_dev: f64) -> Result<Normal<f64>, SimulationError> {
    Normal::new(0.0, std_dev).map_err(|_| SimulationError::InvalidSpread {
        name,
        value: std_dev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(total: usize, true_features: usize, arrivals: usize) -> SimulationConfig {
        SimulationConfig {
            total_features: total,
            true_features,
            arrivals,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn support_has_exactly_the_requested_size() {
        let data = generate_data(&config(20, 6, 30)).unwrap();
        assert_eq!(data.support.len(), 6);
        assert!(data.support.windows(2).all(|w| w[0] < w[1]));
        let nonzero: Vec<usize> = data
            .theta
            .iter()
            .enumerate()
            .filter(|(_, w)| **w != 0.0)
            .map(|(j, _)| j)
            .collect();
        assert_eq!(nonzero, data.support);
    }

    #[test]
    fn shapes_follow_the_configuration() {
        let data = generate_data(&config(7, 2, 11)).unwrap();
        assert_eq!(data.features.shape(), &[11, 7]);
        assert_eq!(data.labels.len(), 11);
        assert_eq!(data.theta.len(), 7);
    }

    #[test]
    fn labels_are_noiseless_linear_combinations() {
        let data = generate_data(&config(5, 3, 8)).unwrap();
        for (t, row) in data.features.rows().into_iter().enumerate() {
            let expected: f64 = row.iter().zip(data.theta.iter()).map(|(x, w)| x * w).sum();
            assert_abs_diff_eq!(data.labels[t], expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let a = generate_data(&config(10, 3, 5)).unwrap();
        let b = generate_data(&config(10, 3, 5)).unwrap();
        assert_eq!(a.features, b.features);
        assert_eq!(a.support, b.support);
    }

    #[test]
    fn full_and_empty_supports_are_allowed() {
        assert_eq!(generate_data(&config(4, 4, 3)).unwrap().support, vec![0, 1, 2, 3]);
        let empty = generate_data(&config(4, 0, 3)).unwrap();
        assert!(empty.support.is_empty());
        assert!(empty.labels.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn oversized_true_support_is_raised_before_generation() {
        let err = generate_data(&config(3, 5, 10)).unwrap_err();
        assert_eq!(
            err,
            SimulationError::InvalidConfiguration {
                true_features: 5,
                total_features: 3
            }
        );
    }

    #[test]
    fn non_positive_spread_is_rejected() {
        let bad = SimulationConfig {
            weight_std: 0.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            generate_data(&bad).unwrap_err(),
            SimulationError::InvalidSpread {
                name: "weight_std",
                value: 0.0
            }
        );
    }
}
