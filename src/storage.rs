//! Wardrobe Storage - injected persistence capability
//!
//! The core never picks a database. A session hands a `WardrobeSnapshot` to
//! whatever `WardrobeStore` the host app provides and asks for one back on
//! start-up. Three adapters ship with the crate:
//!
//! - `MemoryStore`: keeps the snapshot in a mutex (tests, embedding)
//! - `JsonFileStore`: one JSON document, replaced atomically via rename
//! - `ParquetStore` (feature `columnar`): garments as a Parquet table plus a
//!   small JSON sidecar for the profile

use crate::catalog::GarmentCatalog;
use crate::error::StoreError;
use crate::garment::Garment;
use crate::profile::{PreferenceProfile, ProfileSnapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

#[cfg(feature = "columnar")]
mod parquet;

#[cfg(feature = "columnar")]
pub use parquet::ParquetStore;

/// Snapshot layout version written by this crate
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Everything needed to rebuild a session's catalog and profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeSnapshot {
    pub format: u32,
    pub next_id: u64,
    pub garments: Vec<Garment>,
    pub profile: ProfileSnapshot,
}

impl WardrobeSnapshot {
    pub fn capture(catalog: &GarmentCatalog, profile: &PreferenceProfile) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            next_id: catalog.next_id(),
            garments: catalog.list().to_vec(),
            profile: profile.current(),
        }
    }

    /// Load the snapshot into an existing catalog and profile
    ///
    /// Everything is checked before anything is written. Versions are bumped,
    /// never reset, so results cached before the load can not match afterwards.
    pub(crate) fn apply(
        self,
        catalog: &mut GarmentCatalog,
        profile: &mut PreferenceProfile,
    ) -> Result<(), StoreError> {
        if self.format != SNAPSHOT_FORMAT {
            return Err(StoreError::Corrupt(format!(
                "unsupported snapshot format {} (expected {})",
                self.format, SNAPSHOT_FORMAT
            )));
        }
        if let Some(ceiling) = self.profile.budget_ceiling {
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(StoreError::Corrupt(format!("invalid stored budget ceiling {}", ceiling)));
            }
        }

        catalog.restore(self.garments, self.next_id)?;
        profile.restore(self.profile)?;
        Ok(())
    }
}

/// Save/load capability supplied by the host application
pub trait WardrobeStore {
    fn save(&self, snapshot: &WardrobeSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<WardrobeSnapshot>, StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<WardrobeSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WardrobeStore for MemoryStore {
    fn save(&self, snapshot: &WardrobeSnapshot) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<WardrobeSnapshot>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

/// Single JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WardrobeStore for JsonFileStore {
    fn save(&self, snapshot: &WardrobeSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target, then rename, so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), garments = snapshot.garments.len(), "wardrobe saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<WardrobeSnapshot>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot: WardrobeSnapshot = serde_json::from_slice(&bytes)?;

        tracing::debug!(path = %self.path.display(), garments = snapshot.garments.len(), "wardrobe loaded");
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garment::{Category, GarmentDraft};
    use crate::profile::{ProfileUpdate, StyleTag};

    fn populated() -> (GarmentCatalog, PreferenceProfile) {
        let mut catalog = GarmentCatalog::new();
        for (category, color, price) in [
            (Category::Top, "blue", 20.0),
            (Category::Bottom, "navy", 15.0),
            (Category::Footwear, "white", 40.0),
        ] {
            catalog
                .add(
                    GarmentDraft::new()
                        .category(category)
                        .color(color)
                        .formality(2)
                        .price(price)
                        .image_ref(format!("img://{}", color)),
                )
                .unwrap();
        }
        let removed = catalog.list()[0].id();
        catalog.remove(removed);

        let mut profile = PreferenceProfile::new();
        profile.update(ProfileUpdate::new().style("business").budget(250.0)).unwrap();
        (catalog, profile)
    }

    fn assert_round_trip(store: &dyn WardrobeStore) {
        let (catalog, profile) = populated();
        assert!(store.load().unwrap().is_none());

        store.save(&WardrobeSnapshot::capture(&catalog, &profile)).unwrap();
        let loaded = store.load().unwrap().unwrap();

        let mut restored_catalog = GarmentCatalog::new();
        let mut restored_profile = PreferenceProfile::new();
        loaded.apply(&mut restored_catalog, &mut restored_profile).unwrap();

        assert_eq!(restored_catalog.list(), catalog.list());
        assert_eq!(restored_catalog.next_id(), 3);
        assert_eq!(restored_profile.current().style, StyleTag::Business);
        assert_eq!(restored_profile.current().budget_ceiling, Some(250.0));
    }

    #[test]
    fn test_memory_store_round_trip() {
        assert_round_trip(&MemoryStore::new());
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("wardrobe.json"));
        assert_round_trip(&store);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wardrobe.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(JsonFileStore::new(&path).load(), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let (catalog, profile) = populated();
        let mut snapshot = WardrobeSnapshot::capture(&catalog, &profile);
        snapshot.garments.push(snapshot.garments[0].clone());

        let mut target_catalog = GarmentCatalog::new();
        let mut target_profile = PreferenceProfile::new();
        let err = snapshot.apply(&mut target_catalog, &mut target_profile).unwrap_err();

        assert!(matches!(err, StoreError::Corrupt(_)));
        assert!(target_catalog.is_empty());
        assert_eq!(target_catalog.version(), 0);
        assert_eq!(target_profile.version(), 0);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let (catalog, profile) = populated();
        let mut snapshot = WardrobeSnapshot::capture(&catalog, &profile);
        snapshot.format = 99;

        let result = snapshot.apply(&mut GarmentCatalog::new(), &mut PreferenceProfile::new());
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
