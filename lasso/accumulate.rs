use crate::error::LassoError;
use ndarray::{Array1, ArrayView1, Zip};

/// Folds one observation into the running sums.
///
/// Returns fresh `(xy', xx')` with
/// `xy'[j] = xy[j] + features[j] * label` and `xx'[j] = xx[j] + features[j]^2`.
/// The inputs are only borrowed, so a dimension error leaves the caller's
/// accumulators exactly as they were.
pub fn accumulate(
    xy: ArrayView1<f64>,
    xx: ArrayView1<f64>,
    features: ArrayView1<f64>,
    label: f64,
) -> Result<(Array1<f64>, Array1<f64>), LassoError> {
    check_len("feature vector", xy.len(), features.len())?;
    check_len("energy accumulator", xy.len(), xx.len())?;

    let xy_next = Zip::from(&xy)
        .and(&features)
        .map_collect(|&acc, &x| acc + x * label);
    let xx_next = Zip::from(&xx)
        .and(&features)
        .map_collect(|&acc, &x| acc + x * x);

    Ok((xy_next, xx_next))
}

fn check_len(context: &'static str, expected: usize, found: usize) -> Result<(), LassoError> {
    if expected != found {
        return Err(LassoError::DimensionMismatch {
            context,
            expected,
            found,
        });
    }
    Ok(())
}
