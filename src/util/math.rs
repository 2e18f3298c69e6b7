//! Numeric helpers shared by normalization and the metric family.

/// Sums a slice with an `f64` accumulator.
pub(crate) fn sum_f64(values: &[f32]) -> f64 {
    values.iter().map(|&v| f64::from(v)).sum()
}

/// Dot product of two equal-length slices with an `f64` accumulator.
pub(crate) fn dot_f64(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum()
}

/// Euclidean norm of a slice.
pub(crate) fn l2_norm_f64(values: &[f32]) -> f64 {
    dot_f64(values, values).sqrt()
}

/// Rounds to the nearest integer with ties to even, saturating to `u8`.
pub(crate) fn saturate_round_u8(value: f32) -> u8 {
    let rounded = value.round_ties_even();
    if rounded <= 0.0 {
        0
    } else if rounded >= 255.0 {
        255
    } else {
        rounded as u8
    }
}

#[cfg(test)]
mod tests {
    use super::{dot_f64, l2_norm_f64, saturate_round_u8, sum_f64};

    #[test]
    fn sum_and_dot_match_hand_values() {
        assert!((sum_f64(&[0.25, 0.25, 0.5]) - 1.0).abs() < 1e-12);
        assert!((dot_f64(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]) - 32.0).abs() < 1e-12);
    }

    #[test]
    fn l2_norm_of_pythagorean_pair() {
        assert!((l2_norm_f64(&[3.0, 4.0]) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn saturate_round_u8_rounds_half_to_even() {
        assert_eq!(saturate_round_u8(2.5), 2);
        assert_eq!(saturate_round_u8(3.5), 4);
        assert_eq!(saturate_round_u8(-4.0), 0);
        assert_eq!(saturate_round_u8(300.0), 255);
    }
}
