use crate::error::LassoError;
use ndarray::ArrayView1;

/// The global soft-threshold for one arrival: `sqrt(sum_j xx[j] * var_y)`.
///
/// Every coordinate in the sweep shares this single value. It grows with the
/// total accumulated feature energy, so the estimator regularizes harder as
/// evidence piles up. With `var_y == 0` or no energy yet, it is exactly zero.
pub fn compute_penalty(xx: ArrayView1<f64>, var_y: f64) -> f64 {
    (xx.sum() * var_y).sqrt()
}

/// Checks that a noise variance can feed `compute_penalty`.
pub fn validate_noise_variance(var_y: f64) -> Result<f64, LassoError> {
    if var_y.is_finite() && var_y >= 0.0 {
        Ok(var_y)
    } else {
        Err(LassoError::InvalidNoiseVariance(var_y))
    }
}
