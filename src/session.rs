//! Suggestion Session - owns the wardrobe state and caches suggestions
//!
//! A session is the single writer for one catalog and one profile. The last
//! computed `SuggestionSet` is kept behind an `Arc` together with the
//! fingerprint it was computed for:
//!
//! ```text
//! (catalog version, profile version, epoch, limit)
//! ```
//!
//! A request whose fingerprint matches gets the same `Arc` back without
//! recomputation. Any catalog or profile mutation bumps a version, and
//! `invalidate` bumps the epoch, so a cached set never outlives the state it
//! was built from.

use crate::catalog::GarmentCatalog;
use crate::composer::{OutfitComposer, SuggestionSet};
use crate::config::SuggestionConfig;
use crate::error::{IngestError, StoreError, ValidationError};
use crate::garment::{Garment, GarmentDraft, GarmentId};
use crate::ingest::{self, GarmentClassifier};
use crate::profile::{PreferenceProfile, ProfileUpdate};
use crate::storage::{WardrobeSnapshot, WardrobeStore};
use std::sync::Arc;
use std::time::Instant;

/// Inputs a cached suggestion set was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub catalog_version: u64,
    pub profile_version: u64,
    pub epoch: u64,
    pub limit: usize,
}

/// Cache state, as seen between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing cached
    Idle,
    /// A cached set matches the current catalog, profile and epoch
    Cached,
    /// A cached set exists but something changed since it was computed
    Stale,
}

/// Hit/miss counters for the suggestion cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CachedSuggestions {
    fingerprint: Fingerprint,
    set: Arc<SuggestionSet>,
}

#[derive(Debug, Default)]
pub struct SuggestionSession {
    catalog: GarmentCatalog,
    profile: PreferenceProfile,
    composer: OutfitComposer,
    cache: Option<CachedSuggestions>,
    epoch: u64,
    stats: CacheStats,
}

impl SuggestionSession {
    /// Empty catalog, default profile, default scoring configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails if the config does not validate
    pub fn with_config(config: SuggestionConfig) -> anyhow::Result<Self> {
        Ok(Self::with_composer(OutfitComposer::new(config)?))
    }

    pub fn with_composer(composer: OutfitComposer) -> Self {
        Self {
            composer,
            ..Self::default()
        }
    }

    /// Rebuild a session from a store; an empty store gives an empty session
    pub fn load(store: &dyn WardrobeStore, composer: OutfitComposer) -> Result<Self, StoreError> {
        let mut session = Self::with_composer(composer);
        if let Some(snapshot) = store.load()? {
            snapshot.apply(&mut session.catalog, &mut session.profile)?;
            tracing::info!(garments = session.catalog.len(), "session restored from store");
        }
        Ok(session)
    }

    pub fn save(&self, store: &dyn WardrobeStore) -> Result<(), StoreError> {
        store.save(&WardrobeSnapshot::capture(&self.catalog, &self.profile))
    }

    /// Replace the current catalog and profile with the stored ones
    ///
    /// Returns `false`, changing nothing, when the store is empty.
    pub fn reload(&mut self, store: &dyn WardrobeStore) -> Result<bool, StoreError> {
        let Some(snapshot) = store.load()? else {
            return Ok(false);
        };
        snapshot.apply(&mut self.catalog, &mut self.profile)?;
        self.cache = None;
        Ok(true)
    }

    pub fn catalog(&self) -> &GarmentCatalog {
        &self.catalog
    }

    /// Direct catalog access; every mutation made through it bumps the
    /// catalog version and so stales the cache
    pub fn catalog_mut(&mut self) -> &mut GarmentCatalog {
        &mut self.catalog
    }

    pub fn profile(&self) -> &PreferenceProfile {
        &self.profile
    }

    pub fn composer(&self) -> &OutfitComposer {
        &self.composer
    }

    pub fn add_garment(&mut self, draft: GarmentDraft) -> Result<GarmentId, ValidationError> {
        self.catalog.add(draft)
    }

    pub fn add_garments(&mut self, drafts: &[GarmentDraft]) -> Result<Vec<GarmentId>, ValidationError> {
        self.catalog.add_many(drafts)
    }

    /// Remove a garment and drop any cached set that uses it
    pub fn remove_garment(&mut self, id: GarmentId) -> Option<Garment> {
        let removed = self.catalog.remove(id)?;
        if self.cache.as_ref().is_some_and(|cached| cached.set.references(id)) {
            self.cache = None;
        }
        Some(removed)
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<(), ValidationError> {
        self.profile.update(update)
    }

    /// Classify and add a batch of images; all-or-nothing
    pub fn upload_images<C>(&mut self, classifier: &C, image_refs: &[String]) -> Result<Vec<GarmentId>, IngestError>
    where
        C: GarmentClassifier + ?Sized,
    {
        ingest::upload(&mut self.catalog, classifier, image_refs)
    }

    /// Force the next request to recompute
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.cache = None;
        tracing::debug!(epoch = self.epoch, "suggestion cache invalidated");
    }

    pub fn state(&self) -> SessionState {
        match &self.cache {
            None => SessionState::Idle,
            Some(cached) => {
                let fp = cached.fingerprint;
                let current = self.fingerprint(fp.limit);
                if fp == current {
                    SessionState::Cached
                } else {
                    SessionState::Stale
                }
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    /// Up to `limit` ranked outfit suggestions
    ///
    /// Repeated calls with no mutation in between return the same `Arc`.
    pub fn request_suggestions(&mut self, limit: usize) -> Arc<SuggestionSet> {
        self.request_suggestions_until(limit, None)
    }

    /// Like `request_suggestions`, but stops scoring once `deadline` passes
    ///
    /// A set that was cut short by the deadline is returned but not cached, so
    /// the next request gets another chance at a complete answer.
    pub fn request_suggestions_until(&mut self, limit: usize, deadline: Option<Instant>) -> Arc<SuggestionSet> {
        let fingerprint = self.fingerprint(limit);

        if let Some(cached) = &self.cache {
            if cached.fingerprint == fingerprint {
                self.stats.hits += 1;
                tracing::trace!(?fingerprint, "suggestion cache hit");
                return Arc::clone(&cached.set);
            }
        }

        self.stats.misses += 1;
        tracing::debug!(?fingerprint, "computing outfit suggestions");

        let set = Arc::new(self.composer.compose_until(
            &self.catalog.snapshot(),
            &self.profile.current(),
            limit,
            deadline,
        ));

        let cut_short = set.degradation().is_some_and(|d| d.deadline_exceeded);
        if !cut_short {
            self.cache = Some(CachedSuggestions {
                fingerprint,
                set: Arc::clone(&set),
            });
        }
        set
    }

    fn fingerprint(&self, limit: usize) -> Fingerprint {
        Fingerprint {
            catalog_version: self.catalog.version(),
            profile_version: self.profile.version(),
            epoch: self.epoch,
            limit,
        }
    }
}
