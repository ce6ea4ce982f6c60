//! FORMALITY SPREAD
//!
//! Penalizes outfits that mix very casual and very formal pieces. The raw value
//! is the population standard deviation of the garments' formality; it is
//! divided by 5 (the largest deviation possible on a 0-10 scale) so the result
//! lands in [0, 1]. Lower is better; the composite uses `1 - spread`.

/// Largest population standard deviation for values in 0..=10
const MAX_STD_DEV: f64 = 5.0;

pub fn calculate_formality_spread(formality: &[u8]) -> f64 {
    if formality.len() < 2 {
        return 0.0;
    }

    let n = formality.len() as f64;
    let mean = formality.iter().map(|&f| f64::from(f)).sum::<f64>() / n;
    let variance = formality
        .iter()
        .map(|&f| {
            let d = f64::from(f) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    (variance.sqrt() / MAX_STD_DEV).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_formality_has_no_spread() {
        assert_relative_eq!(calculate_formality_spread(&[2, 2, 2]), 0.0);
        assert_relative_eq!(calculate_formality_spread(&[7]), 0.0);
    }

    #[test]
    fn test_spread_scales_to_unit_interval() {
        // Half at 0, half at 10: std dev 5, the maximum
        assert_relative_eq!(calculate_formality_spread(&[0, 10]), 1.0);
        // std dev of [2, 4] is 1
        assert_relative_eq!(calculate_formality_spread(&[2, 4]), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_wider_range_scores_worse() {
        let tight = calculate_formality_spread(&[3, 4, 4]);
        let wide = calculate_formality_spread(&[0, 4, 9]);
        assert!(wide > tight);
    }
}
