//! Preference Profile
//!
//! Holds the user's style tag and optional budget ceiling. Inputs arrive as raw
//! text from a preferences form (`"casual"`, `"$100"`), so parsing into typed
//! values happens here, at the boundary. Updates are all-or-nothing and every
//! successful update bumps the profile version.

use crate::config::FormalityBand;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of supported styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleTag {
    Casual,
    SmartCasual,
    Business,
    Formal,
    Athletic,
}

impl StyleTag {
    pub const ALL: [StyleTag; 5] = [
        StyleTag::Casual,
        StyleTag::SmartCasual,
        StyleTag::Business,
        StyleTag::Formal,
        StyleTag::Athletic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleTag::Casual => "casual",
            StyleTag::SmartCasual => "smart-casual",
            StyleTag::Business => "business",
            StyleTag::Formal => "formal",
            StyleTag::Athletic => "athletic",
        }
    }

    /// Formality band used when the config does not override it
    pub fn default_band(self) -> FormalityBand {
        match self {
            StyleTag::Casual => FormalityBand::new(0, 4),
            StyleTag::SmartCasual => FormalityBand::new(3, 6),
            StyleTag::Business => FormalityBand::new(5, 8),
            StyleTag::Formal => FormalityBand::new(7, 10),
            StyleTag::Athletic => FormalityBand::new(0, 3),
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleTag {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        StyleTag::ALL
            .into_iter()
            .find(|style| style.as_str() == key)
            .ok_or_else(|| ValidationError::UnknownStyle(raw.to_string()))
    }
}

/// Parse budget text such as `"$100"`, `"1,250.50"` or `"80 €"`
///
/// Empty text means "no ceiling" and yields `Ok(None)`.
pub fn parse_budget(raw: &str) -> Result<Option<f64>, ValidationError> {
    const CURRENCY: &[char] = &['$', '€', '£', '¥'];

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let digits: String = trimmed
        .trim_start_matches(CURRENCY)
        .trim_end_matches(CURRENCY)
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    let value: f64 = digits
        .parse()
        .map_err(|_| ValidationError::InvalidBudget(raw.to_string()))?;

    validate_budget(value).map(Some)
}

fn validate_budget(value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::InvalidBudget(value.to_string()))
    }
}

/// Requested change to the budget ceiling
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BudgetChange {
    #[default]
    Keep,
    Clear,
    Set(f64),
    /// Raw form input, parsed with [`parse_budget`]
    Text(String),
}

/// Partial profile edit; unspecified fields stay unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub style: Option<String>,
    pub budget: BudgetChange,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn budget(mut self, ceiling: f64) -> Self {
        self.budget = BudgetChange::Set(ceiling);
        self
    }

    pub fn budget_text(mut self, text: impl Into<String>) -> Self {
        self.budget = BudgetChange::Text(text.into());
        self
    }

    pub fn clear_budget(mut self) -> Self {
        self.budget = BudgetChange::Clear;
        self
    }
}

/// Immutable view of the profile at one version
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub style: StyleTag,
    pub budget_ceiling: Option<f64>,
}

/// The session's single, versioned preference profile
#[derive(Debug, Clone)]
pub struct PreferenceProfile {
    current: ProfileSnapshot,
    version: u64,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceProfile {
    /// Casual style, no budget ceiling
    pub fn new() -> Self {
        Self::from_snapshot(ProfileSnapshot {
            style: StyleTag::Casual,
            budget_ceiling: None,
        })
    }

    pub(crate) fn from_snapshot(snapshot: ProfileSnapshot) -> Self {
        Self {
            current: snapshot,
            version: 0,
        }
    }

    /// Apply a partial update
    ///
    /// Both fields are validated before either is written, so a rejected update
    /// leaves the profile and its version untouched.
    pub fn update(&mut self, update: ProfileUpdate) -> Result<(), ValidationError> {
        let style = match update.style.as_deref() {
            Some(raw) => raw.parse::<StyleTag>()?,
            None => self.current.style,
        };

        let budget_ceiling = match update.budget {
            BudgetChange::Keep => self.current.budget_ceiling,
            BudgetChange::Clear => None,
            BudgetChange::Set(value) => Some(validate_budget(value)?),
            BudgetChange::Text(text) => parse_budget(&text)?,
        };

        self.current = ProfileSnapshot { style, budget_ceiling };
        self.version += 1;

        tracing::debug!(
            style = %style,
            budget = ?budget_ceiling,
            version = self.version,
            "profile updated"
        );

        Ok(())
    }

    pub fn current(&self) -> ProfileSnapshot {
        self.current
    }

    /// Incremented on every successful update
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the profile wholesale (storage load); counts as a mutation
    pub(crate) fn restore(&mut self, snapshot: ProfileSnapshot) -> Result<(), ValidationError> {
        if let Some(ceiling) = snapshot.budget_ceiling {
            validate_budget(ceiling)?;
        }
        self.current = snapshot;
        self.version += 1;
        Ok(())
    }
}
