//! Suggestion Configuration
//!
//! Scoring weights, style formality bands, the color compatibility table and the
//! composer's work limits. Everything here is tunable; the defaults are a
//! starting point, not calibrated values.
//!
//! Configs are plain JSON. Missing keys fall back to the defaults, so a file
//! only needs to carry what it overrides:
//!
//! ```json
//! { "weights": { "color": 0.6, "formality": 0.3, "budget": 0.1 }, "sample_seed": 7 }
//! ```

use crate::profile::StyleTag;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Relative weight of each score component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub color: f64,
    pub formality: f64,
    pub budget: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            color: 0.5,
            formality: 0.3,
            budget: 0.2,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.color + self.formality + self.budget
    }
}

/// Inclusive formality range a style accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalityBand {
    pub min: u8,
    pub max: u8,
}

impl FormalityBand {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, formality: u8) -> bool {
        self.min <= formality && formality <= self.max
    }
}

/// Explicit compatibility score for an unordered color pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPairScore {
    pub a: String,
    pub b: String,
    pub score: f64,
}

impl ColorPairScore {
    fn new(a: &str, b: &str, score: f64) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            score,
        }
    }
}

/// Color compatibility table
///
/// Lookup order: explicit pair, then same color, then any neutral in the pair,
/// then `default_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTable {
    pub pairs: Vec<ColorPairScore>,
    pub neutrals: Vec<String>,
    pub neutral_score: f64,
    pub same_color_score: f64,
    pub default_score: f64,
}

impl Default for ColorTable {
    fn default() -> Self {
        let pairs = vec![
            // Classic pairings
            ColorPairScore::new("navy", "white", 1.0),
            ColorPairScore::new("black", "white", 1.0),
            ColorPairScore::new("blue", "white", 0.95),
            ColorPairScore::new("denim", "white", 0.95),
            ColorPairScore::new("camel", "navy", 0.95),
            ColorPairScore::new("blue", "navy", 0.9),
            ColorPairScore::new("blue", "khaki", 0.9),
            ColorPairScore::new("navy", "beige", 0.9),
            ColorPairScore::new("grey", "pink", 0.9),
            ColorPairScore::new("olive", "cream", 0.9),
            ColorPairScore::new("burgundy", "grey", 0.9),
            ColorPairScore::new("green", "brown", 0.8),
            // Clashes
            ColorPairScore::new("red", "pink", 0.15),
            ColorPairScore::new("red", "orange", 0.2),
            ColorPairScore::new("red", "green", 0.2),
            ColorPairScore::new("purple", "orange", 0.2),
            ColorPairScore::new("black", "brown", 0.35),
            ColorPairScore::new("navy", "black", 0.4),
        ];

        let neutrals = ["black", "white", "grey", "navy", "beige", "cream", "denim", "khaki"]
            .into_iter()
            .map(String::from)
            .collect();

        Self {
            pairs,
            neutrals,
            neutral_score: 0.8,
            same_color_score: 0.6,
            default_score: 0.45,
        }
    }
}

/// Full configuration for composing suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub weights: ScoreWeights,

    /// Formality band per style; styles missing from the map use the default band
    pub style_bands: BTreeMap<StyleTag, FormalityBand>,

    pub colors: ColorTable,

    /// Largest combination space scored exhaustively; beyond it the composer samples
    pub enumeration_ceiling: u64,

    /// Number of distinct combinations scored when sampling
    pub sample_size: usize,

    /// Seed for the sampling RNG (same inputs, same sample)
    pub sample_seed: u64,

    /// Combinations per parallel work unit; the deadline is checked between units
    pub chunk_size: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            style_bands: StyleTag::ALL
                .into_iter()
                .map(|style| (style, style.default_band()))
                .collect(),
            colors: ColorTable::default(),
            enumeration_ceiling: 250_000,
            sample_size: 20_000,
            sample_seed: 0x5EED_CAFE,
            chunk_size: 4_096,
        }
    }
}

impl SuggestionConfig {
    /// Load configuration from a JSON file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read suggestion config: {:?}", path))?;

        let config: SuggestionConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse suggestion config JSON")?;

        config
            .validate()
            .with_context(|| format!("Invalid suggestion config: {:?}", path))?;

        tracing::info!(
            path = %path.display(),
            ceiling = config.enumeration_ceiling,
            sample_size = config.sample_size,
            "loaded suggestion config"
        );

        Ok(config)
    }

    /// Formality band for a style
    pub fn band(&self, style: StyleTag) -> FormalityBand {
        self.style_bands
            .get(&style)
            .copied()
            .unwrap_or_else(|| style.default_band())
    }

    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [("color", w.color), ("formality", w.formality), ("budget", w.budget)] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("weight '{}' must be finite and non-negative, got {}", name, value);
            }
        }
        if w.total() <= 0.0 {
            anyhow::bail!("weights must not all be zero");
        }

        for (style, band) in &self.style_bands {
            if band.min > band.max || band.max > crate::garment::Formality::MAX {
                anyhow::bail!(
                    "band for '{}' must satisfy min <= max <= {}, got {}..={}",
                    style,
                    crate::garment::Formality::MAX,
                    band.min,
                    band.max
                );
            }
        }

        let table = &self.colors;
        let scores = [
            ("neutral_score", table.neutral_score),
            ("same_color_score", table.same_color_score),
            ("default_score", table.default_score),
        ];
        for (name, score) in scores {
            if !(0.0..=1.0).contains(&score) {
                anyhow::bail!("color table '{}' must be within [0, 1], got {}", name, score);
            }
        }
        for pair in &table.pairs {
            if !(0.0..=1.0).contains(&pair.score) {
                anyhow::bail!(
                    "color pair {}/{} score must be within [0, 1], got {}",
                    pair.a,
                    pair.b,
                    pair.score
                );
            }
        }

        if self.enumeration_ceiling == 0 {
            anyhow::bail!("enumeration_ceiling must be at least 1");
        }
        if self.sample_size == 0 {
            anyhow::bail!("sample_size must be at least 1");
        }
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be at least 1");
        }

        Ok(())
    }
}
