use thiserror::Error;

/// Every way an arrival, or the engine that processes it, can be rejected.
///
/// These are all caller-correctable precondition violations. Nothing in the
/// estimator fails transiently, so no variant is ever worth retrying.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LassoError {
    #[error("{context} has {found} entries, but the engine was built for {expected} features.")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "Feature {index} has zero accumulated energy, so its coordinate has no defined update."
    )]
    NumericalDegeneracy { index: usize },

    #[error("Non-finite value (NaN or Infinity) in feature {index} of the observation.")]
    NonFiniteObservation { index: usize },

    #[error("The observation label is not finite: {0}.")]
    NonFiniteLabel(f64),

    #[error("Entry {index} of the {vector} is not finite; the arrival overflowed or the state is corrupt.")]
    NonFiniteState { vector: &'static str, index: usize },

    #[error("Accumulated energy for feature {index} is negative ({value}); energies are sums of squares.")]
    NegativeEnergy { index: usize, value: f64 },

    #[error("Noise variance must be finite and non-negative, but was {0}.")]
    InvalidNoiseVariance(f64),

    #[error("The feature dimension must be at least 1.")]
    EmptyDimension,
}
