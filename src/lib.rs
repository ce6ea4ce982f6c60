//! Wardrobe Core
//!
//! Local data core for a wardrobe and outfit-suggestion app: a garment
//! catalog, the user's style and budget preferences, and a composer that
//! ranks outfit combinations under hard constraints.
//!
//! Module layout:
//! - `garment`: garment attributes and their validation
//! - `catalog`: versioned garment collection with cheap snapshots
//! - `profile`: style tag and budget ceiling
//! - `metrics/`: score components (color harmony, formality spread, budget fit)
//! - `config`: scoring weights, style bands, color table, search bounds
//! - `composer`: parallel enumeration/sampling and ranking of outfits
//! - `session`: owns the state and caches the last suggestion set
//! - `storage`: injected persistence (memory, JSON, optional Parquet)
//! - `ingest`: injected image classification into the catalog

pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod garment;
pub mod ingest;
pub mod metrics;
pub mod profile;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use catalog::{CatalogSnapshot, GarmentCatalog};
pub use composer::{Degradation, OutfitCandidate, OutfitComposer, SuggestionSet};
pub use config::{ColorTable, FormalityBand, ScoreWeights, SuggestionConfig};
pub use error::{ClassifyError, IngestError, StoreError, ValidationError};
pub use garment::{Category, Color, Formality, Garment, GarmentDraft, GarmentId, ImageRef};
pub use ingest::GarmentClassifier;
pub use metrics::{score_outfit, ScoreBreakdown};
pub use profile::{PreferenceProfile, ProfileSnapshot, ProfileUpdate, StyleTag};
pub use session::{SessionState, SuggestionSession};
pub use storage::{JsonFileStore, MemoryStore, WardrobeSnapshot, WardrobeStore};

#[cfg(feature = "columnar")]
pub use storage::ParquetStore;
