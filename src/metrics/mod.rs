//! Metric modules for outfit scoring
//!
//! Each score component lives in its own module. `score_outfit` combines them
//! for one garment list; the composer uses the same functions on its hot path.

pub mod budget_fit;
pub mod color_harmony;
pub mod formality_spread;

// Re-export metric functions
pub use budget_fit::calculate_budget_fit;
pub use color_harmony::{calculate_color_harmony, ColorMatrix};
pub use formality_spread::calculate_formality_spread;

use crate::config::ScoreWeights;
use crate::garment::{Color, Garment};
use crate::profile::ProfileSnapshot;
use serde::{Deserialize, Serialize};

/// Per-component values a composite score was computed from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Mean pair color compatibility, 0-1 (higher is better)
    pub color_harmony: f64,
    /// Normalized formality standard deviation, 0-1 (lower is better)
    pub formality_spread: f64,
    /// Share of the budget used, 0-1 (higher is better; 0 when unconstrained)
    pub budget_fit: f64,
}

impl ScoreBreakdown {
    /// Weighted composite on a 0-100 scale
    ///
    /// The formality penalty enters as `1 - spread` so all three terms point the
    /// same way. Weights that do not sum to a positive number score 0.
    pub fn composite(&self, weights: &ScoreWeights) -> f64 {
        let total = weights.total();
        if total.is_nan() || total <= 0.0 {
            return 0.0;
        }
        let weighted = weights.color * self.color_harmony
            + weights.formality * (1.0 - self.formality_spread)
            + weights.budget * self.budget_fit;

        100.0 * weighted / total
    }
}

/// Sum of prices in the given order
pub fn total_cost(garments: &[&Garment]) -> f64 {
    garments.iter().map(|g| g.price()).sum()
}

/// Score a garment list against a profile
///
/// Pure: the result depends only on the garments, the profile snapshot and the
/// color matrix.
pub fn score_outfit(
    garments: &[&Garment],
    profile: &ProfileSnapshot,
    matrix: &ColorMatrix,
) -> ScoreBreakdown {
    let colors: Vec<&Color> = garments.iter().map(|g| g.color()).collect();
    let formality: Vec<u8> = garments.iter().map(|g| g.formality().value()).collect();

    ScoreBreakdown {
        color_harmony: calculate_color_harmony(&colors, matrix),
        formality_spread: calculate_formality_spread(&formality),
        budget_fit: calculate_budget_fit(total_cost(garments), profile.budget_ceiling),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_composite_bounds() {
        let weights = ScoreWeights::default();

        let best = ScoreBreakdown { color_harmony: 1.0, formality_spread: 0.0, budget_fit: 1.0 };
        assert_relative_eq!(best.composite(&weights), 100.0, epsilon = 1e-9);

        let worst = ScoreBreakdown { color_harmony: 0.0, formality_spread: 1.0, budget_fit: 0.0 };
        assert_relative_eq!(worst.composite(&weights), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_composite_respects_weights() {
        let breakdown = ScoreBreakdown { color_harmony: 1.0, formality_spread: 1.0, budget_fit: 0.0 };

        let color_only = ScoreWeights { color: 1.0, formality: 0.0, budget: 0.0 };
        assert_relative_eq!(breakdown.composite(&color_only), 100.0);

        let formality_only = ScoreWeights { color: 0.0, formality: 2.0, budget: 0.0 };
        assert_relative_eq!(breakdown.composite(&formality_only), 0.0);
    }

    #[test]
    fn test_composite_with_zero_weights_is_zero_not_nan() {
        let breakdown = ScoreBreakdown { color_harmony: 0.8, formality_spread: 0.2, budget_fit: 0.5 };

        let zero = ScoreWeights { color: 0.0, formality: 0.0, budget: 0.0 };
        assert_eq!(breakdown.composite(&zero), 0.0);

        let cancelling = ScoreWeights { color: 1.0, formality: -1.0, budget: 0.0 };
        assert_eq!(breakdown.composite(&cancelling), 0.0);

        let nan = ScoreWeights { color: f64::NAN, formality: 0.3, budget: 0.2 };
        assert_eq!(breakdown.composite(&nan), 0.0);
    }
}
