//! BUDGET FIT
//!
//! Rewards outfits that use the budget well: `total_cost / ceiling`, so an
//! outfit close to (but never over) the ceiling scores near 1. Over-budget
//! outfits never reach scoring; the composer filters them first.
//!
//! Without a ceiling, or with a ceiling of 0, every outfit gets the same
//! neutral 0 and the component does not affect ranking.

pub fn calculate_budget_fit(total_cost: f64, budget_ceiling: Option<f64>) -> f64 {
    match budget_ceiling {
        Some(ceiling) if ceiling > 0.0 => (total_cost / ceiling).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closer_to_ceiling_scores_higher() {
        assert_relative_eq!(calculate_budget_fit(75.0, Some(100.0)), 0.75);
        assert!(calculate_budget_fit(95.0, Some(100.0)) > calculate_budget_fit(40.0, Some(100.0)));
        assert_relative_eq!(calculate_budget_fit(100.0, Some(100.0)), 1.0);
    }

    #[test]
    fn test_unconstrained_is_neutral() {
        assert_relative_eq!(calculate_budget_fit(75.0, None), 0.0);
        assert_relative_eq!(calculate_budget_fit(0.0, Some(0.0)), 0.0);
    }
}
