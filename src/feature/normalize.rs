//! Histogram normalization to unit sum.

use crate::util::math::sum_f64;
use crate::util::{ImgMatchError, ImgMatchResult};

/// Returns a copy of `hist` scaled so its elements sum to 1.
///
/// Fails with [`ImgMatchError::DegenerateVector`] when the histogram sums to
/// zero (for example an empty region), and with
/// [`ImgMatchError::InvalidInput`] on negative or non-finite elements.
pub fn normalize(hist: &[f32]) -> ImgMatchResult<Vec<f32>> {
    if hist.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(ImgMatchError::InvalidInput(
            "histogram elements must be finite and non-negative",
        ));
    }
    let sum = sum_f64(hist);
    if sum <= 0.0 {
        return Err(ImgMatchError::DegenerateVector {
            reason: "histogram sums to zero",
        });
    }
    Ok(hist.iter().map(|&v| (f64::from(v) / sum) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::normalize;
    use crate::ImgMatchError;

    #[test]
    fn normalize_scales_to_unit_sum() {
        let out = normalize(&[1.0, 3.0, 0.0, 4.0]).unwrap();
        assert_eq!(out, vec![0.125, 0.375, 0.0, 0.5]);
    }

    #[test]
    fn normalize_rejects_all_zero() {
        let err = normalize(&[0.0; 4]).unwrap_err();
        assert_eq!(
            err,
            ImgMatchError::DegenerateVector {
                reason: "histogram sums to zero",
            }
        );
    }

    #[test]
    fn normalize_rejects_negative_counts() {
        assert!(matches!(
            normalize(&[1.0, -1.0]),
            Err(ImgMatchError::InvalidInput(_))
        ));
    }
}
