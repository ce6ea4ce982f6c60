//! COLOR HARMONY
//!
//! Scores how well the colors in an outfit go together, as the mean
//! compatibility over every unordered garment pair. Pair scores come from the
//! configured color table:
//!
//!   1. explicit pair entry (e.g. navy/white = 1.0, red/pink = 0.15)
//!   2. same color on both garments
//!   3. either color is a neutral
//!   4. table default
//!
//! Result is in [0, 1]; higher is better.

use crate::config::ColorTable;
use crate::garment::Color;
use rustc_hash::{FxHashMap, FxHashSet};

/// Color table compiled for lookups by normalized token
#[derive(Debug, Clone)]
pub struct ColorMatrix {
    pairs: FxHashMap<String, FxHashMap<String, f64>>,
    neutrals: FxHashSet<String>,
    neutral_score: f64,
    same_color_score: f64,
    default_score: f64,
}

impl ColorMatrix {
    /// Compile a table, normalizing every token the same way garment colors are
    ///
    /// Entries that do not normalize to a valid token can never match a garment
    /// and are dropped.
    pub fn from_table(table: &ColorTable) -> Self {
        let mut pairs: FxHashMap<String, FxHashMap<String, f64>> = FxHashMap::default();

        for entry in &table.pairs {
            let (Ok(a), Ok(b)) = (Color::parse(&entry.a), Color::parse(&entry.b)) else {
                tracing::warn!(a = %entry.a, b = %entry.b, "ignoring color pair with invalid token");
                continue;
            };
            pairs
                .entry(a.as_str().to_string())
                .or_default()
                .insert(b.as_str().to_string(), entry.score);
            pairs
                .entry(b.as_str().to_string())
                .or_default()
                .insert(a.as_str().to_string(), entry.score);
        }

        let neutrals = table
            .neutrals
            .iter()
            .filter_map(|raw| Color::parse(raw).ok())
            .map(String::from)
            .collect();

        Self {
            pairs,
            neutrals,
            neutral_score: table.neutral_score,
            same_color_score: table.same_color_score,
            default_score: table.default_score,
        }
    }

    /// Compatibility of two colors in [0, 1]; symmetric
    pub fn pair_score(&self, a: &Color, b: &Color) -> f64 {
        let (a, b) = (a.as_str(), b.as_str());

        if let Some(score) = self.pairs.get(a).and_then(|row| row.get(b)) {
            return *score;
        }
        if a == b {
            return self.same_color_score;
        }
        if self.neutrals.contains(a) || self.neutrals.contains(b) {
            return self.neutral_score;
        }
        self.default_score
    }
}

/// Mean pair compatibility over all unordered pairs
///
/// Fewer than two garments have nothing to clash with and score 1.0.
pub fn calculate_color_harmony(colors: &[&Color], matrix: &ColorMatrix) -> f64 {
    mean_pair_score(colors.len(), |i, j| matrix.pair_score(colors[i], colors[j]))
}

/// Mean of `score(i, j)` over all `i < j < n`
pub(crate) fn mean_pair_score(n: usize, score: impl Fn(usize, usize) -> f64) -> f64 {
    if n < 2 {
        return 1.0;
    }

    let mut total = 0.0;
    for i in 0..n - 1 {
        for j in i + 1..n {
            total += score(i, j);
        }
    }
    let n_pairs = n * (n - 1) / 2;
    total / n_pairs as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn color(raw: &str) -> Color {
        Color::parse(raw).unwrap()
    }

    #[test]
    fn test_pair_lookup_order() {
        let matrix = ColorMatrix::from_table(&ColorTable::default());

        // Explicit pair beats neutral rule, in either order
        assert_relative_eq!(matrix.pair_score(&color("navy"), &color("white")), 1.0);
        assert_relative_eq!(matrix.pair_score(&color("White"), &color("Navy")), 1.0);
        // Explicit clash
        assert_relative_eq!(matrix.pair_score(&color("red"), &color("pink")), 0.15);
        // Same color
        assert_relative_eq!(matrix.pair_score(&color("red"), &color("red")), 0.6);
        // One neutral
        assert_relative_eq!(matrix.pair_score(&color("grey"), &color("mustard")), 0.8);
        // Nothing matches
        assert_relative_eq!(matrix.pair_score(&color("mustard"), &color("teal")), 0.45);
    }

    #[test]
    fn test_table_tokens_are_normalized() {
        let mut table = ColorTable::default();
        table.pairs.push(crate::config::ColorPairScore {
            a: "Dusty Rose".to_string(),
            b: "GRAY".to_string(),
            score: 0.97,
        });
        table.pairs.push(crate::config::ColorPairScore {
            a: "#fff".to_string(),
            b: "black".to_string(),
            score: 0.0,
        });
        let matrix = ColorMatrix::from_table(&table);

        assert_relative_eq!(matrix.pair_score(&color("dusty_rose"), &color("grey")), 0.97);
    }

    #[test]
    fn test_harmony_is_mean_over_pairs() {
        let matrix = ColorMatrix::from_table(&ColorTable::default());
        let (blue, navy, white) = (color("blue"), color("navy"), color("white"));

        // blue/navy 0.9, blue/white 0.95, navy/white 1.0
        let score = calculate_color_harmony(&[&blue, &navy, &white], &matrix);
        assert_relative_eq!(score, (0.9 + 0.95 + 1.0) / 3.0, epsilon = 1e-12);

        assert_relative_eq!(calculate_color_harmony(&[&blue], &matrix), 1.0);
    }
}
