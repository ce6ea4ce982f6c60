//! Error types for the wardrobe core
//!
//! Every mutation failure here is caller-correctable. Empty or degraded
//! suggestion sets are results, not errors, so they have no variant.

use thiserror::Error;

/// Rejected garment or profile input.
///
/// Raised synchronously before any state changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required garment attribute was not supplied
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Formality outside the 0-10 scale
    #[error("formality {0} is outside 0..={max}", max = crate::garment::Formality::MAX)]
    FormalityOutOfRange(i64),

    /// Negative, NaN or infinite price
    #[error("price must be a finite non-negative number, got {0}")]
    InvalidPrice(f64),

    /// Color token that normalizes to nothing usable
    #[error("invalid color token: {0:?}")]
    InvalidColor(String),

    /// Image handle was empty
    #[error("image reference must not be empty")]
    EmptyImageRef,

    /// Category name not in the closed set
    #[error("unknown garment category: {0:?}")]
    UnknownCategory(String),

    /// Style tag not in the closed set
    #[error("unknown style tag: {0:?}")]
    UnknownStyle(String),

    /// Budget ceiling that is negative, NaN, infinite or unparseable
    #[error("invalid budget ceiling: {0}")]
    InvalidBudget(String),

    /// Two garments claim the same id (storage restore)
    #[error("duplicate garment id: {0}")]
    DuplicateId(crate::garment::GarmentId),

    /// No further ids can be issued
    #[error("garment id space exhausted")]
    IdExhausted,

    /// One entry of a bulk add failed; nothing was added
    #[error("garment #{index} rejected: {source}")]
    InBatch {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Failure from an injected storage capability
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Columnar backend error
    #[cfg(feature = "columnar")]
    #[error("parquet error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Stored data loaded but does not form a valid wardrobe
    #[error("corrupt wardrobe snapshot: {0}")]
    Corrupt(String),
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Failure reported by an injected garment classifier
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not classify {image_ref}: {reason}")]
pub struct ClassifyError {
    pub image_ref: String,
    pub reason: String,
}

/// Failure of a bulk image upload; the catalog is left unchanged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
