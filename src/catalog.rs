//! Garment Catalog - versioned, insertion-ordered garment storage
//!
//! Garments live in an `Arc<Vec<_>>` so the composer can take an O(1) snapshot;
//! a mutation while a snapshot is alive copies the vector instead of disturbing
//! the snapshot. Ids are looked up through an `FxHashMap` index.
//!
//! Every successful mutation bumps `version`, which is how the suggestion
//! session notices that cached outfits may reference stale garments.

use crate::error::ValidationError;
use crate::garment::{Category, Garment, GarmentDraft, GarmentId};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Immutable view of the catalog at one version
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    garments: Arc<Vec<Garment>>,
    version: u64,
}

impl CatalogSnapshot {
    pub fn list(&self) -> &[Garment] {
        &self.garments
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Garment> + '_ {
        self.garments.iter().filter(move |g| g.category() == category)
    }

    pub fn get(&self, id: GarmentId) -> Option<&Garment> {
        self.garments.iter().find(|g| g.id() == id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.garments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.garments.is_empty()
    }
}

/// The session's garment collection
#[derive(Debug, Clone, Default)]
pub struct GarmentCatalog {
    garments: Arc<Vec<Garment>>,
    index: FxHashMap<GarmentId, usize>,
    next_id: u64,
    version: u64,
}

impl GarmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add one garment, returning its new id
    pub fn add(&mut self, draft: GarmentDraft) -> Result<GarmentId, ValidationError> {
        let next_id = self.next_id.checked_add(1).ok_or(ValidationError::IdExhausted)?;
        let garment = draft.validate(GarmentId::new(self.next_id))?;
        let id = garment.id();

        self.insert(garment);
        self.next_id = next_id;
        self.version += 1;

        tracing::debug!(%id, version = self.version, "garment added");
        Ok(id)
    }

    /// Add a batch of garments atomically
    ///
    /// All drafts are validated before any is inserted. On failure the error
    /// carries the index of the first bad draft and the catalog is unchanged.
    pub fn add_many(&mut self, drafts: &[GarmentDraft]) -> Result<Vec<GarmentId>, ValidationError> {
        let next_id = self
            .next_id
            .checked_add(drafts.len() as u64)
            .ok_or(ValidationError::IdExhausted)?;
        let validated = drafts
            .iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate(GarmentId::new(self.next_id + index as u64))
                    .map_err(|source| ValidationError::InBatch {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if validated.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<GarmentId> = validated.iter().map(Garment::id).collect();
        for garment in validated {
            self.insert(garment);
        }
        self.next_id = next_id;
        self.version += 1;

        tracing::debug!(count = ids.len(), version = self.version, "garments added in batch");
        Ok(ids)
    }

    fn insert(&mut self, garment: Garment) {
        let garments = Arc::make_mut(&mut self.garments);
        self.index.insert(garment.id(), garments.len());
        garments.push(garment);
    }

    /// Remove a garment; removing an absent id is a no-op
    pub fn remove(&mut self, id: GarmentId) -> Option<Garment> {
        let position = self.index.remove(&id)?;
        let garments = Arc::make_mut(&mut self.garments);
        let removed = garments.remove(position);

        // Shift the index for everything after the hole
        for garment in &garments[position..] {
            if let Some(slot) = self.index.get_mut(&garment.id()) {
                *slot -= 1;
            }
        }
        self.version += 1;

        tracing::debug!(%id, version = self.version, "garment removed");
        Some(removed)
    }

    /// All garments in insertion order
    pub fn list(&self) -> &[Garment] {
        &self.garments
    }

    /// Garments of one category in insertion order
    pub fn by_category(&self, category: Category) -> Vec<&Garment> {
        self.garments
            .iter()
            .filter(|g| g.category() == category)
            .collect()
    }

    pub fn get(&self, id: GarmentId) -> Option<&Garment> {
        self.index.get(&id).map(|&pos| &self.garments[pos])
    }

    pub fn contains(&self, id: GarmentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.garments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.garments.is_empty()
    }

    /// Incremented on every successful mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Id the next added garment will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            garments: Arc::clone(&self.garments),
            version: self.version,
        }
    }

    /// Replace the contents with previously stored garments
    ///
    /// Ids are kept as stored. `next_id` is raised past the largest stored id
    /// so restored ids are never reissued.
    pub(crate) fn restore(&mut self, garments: Vec<Garment>, next_id: u64) -> Result<(), ValidationError> {
        let mut index = FxHashMap::default();
        for (pos, garment) in garments.iter().enumerate() {
            garment.check()?;
            if index.insert(garment.id(), pos).is_some() {
                return Err(ValidationError::DuplicateId(garment.id()));
            }
        }

        let mut max_id = 0;
        for garment in &garments {
            let after = garment.id().get().checked_add(1).ok_or(ValidationError::IdExhausted)?;
            max_id = max_id.max(after);
        }

        self.garments = Arc::new(garments);
        self.index = index;
        self.next_id = next_id.max(max_id);
        self.version += 1;
        Ok(())
    }
}
