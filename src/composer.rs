//! Outfit Composer - builds and ranks outfit candidates
//!
//! An outfit takes exactly one top, bottom and footwear, plus zero or one
//! outerwear and zero or one accessory. Only garments inside the profile's
//! formality band take part, and no outfit may cost more than the budget
//! ceiling.
//!
//! **Search space**: every combination is addressed by a single mixed-radix
//! index (one digit per slot; optional slots get an extra "none" digit), so the
//! space can be split into fixed-size chunks and scored in parallel with Rayon
//! without materializing it.
//!
//! **Bounded work**:
//!   - space <= `enumeration_ceiling`: exhaustive
//!   - space > `enumeration_ceiling`: `sample_size` distinct indices drawn from
//!     a seeded RNG; the result is flagged as sampled
//!   - optional deadline: chunks that have not started when it passes are
//!     skipped and the best-so-far is returned, flagged as cut short
//!   - setup is linear in the catalog: pair color scores are tabulated per
//!     distinct color, and only while the palette stays small
//!
//! **Ranking**: composite score descending, then total cost ascending, then the
//! sorted garment id list ascending. Distinct combinations never share an id
//! list, so the order is total and results are deterministic.

use crate::catalog::CatalogSnapshot;
use crate::config::SuggestionConfig;
use crate::garment::{Category, Color, Garment, GarmentId};
use crate::metrics::color_harmony::mean_pair_score;
use crate::metrics::{calculate_budget_fit, calculate_formality_spread, ColorMatrix, ScoreBreakdown};
use crate::profile::ProfileSnapshot;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::time::Instant;

/// Largest number of distinct colors whose pair scores are tabulated up front
const DENSE_PALETTE_LIMIT: usize = 256;

/// Sample draws between deadline checks
const SAMPLE_DEADLINE_STRIDE: usize = 1_024;

/// Slot order of garments inside a candidate
pub const SLOT_ORDER: [Category; 5] = [
    Category::Top,
    Category::Bottom,
    Category::Footwear,
    Category::Outerwear,
    Category::Accessory,
];

/// One proposed outfit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutfitCandidate {
    garments: SmallVec<[GarmentId; 5]>,
    composite_score: f64,
    total_cost: f64,
    breakdown: ScoreBreakdown,
}

impl OutfitCandidate {
    /// Garment ids in slot order (top, bottom, footwear, then any outerwear and accessory)
    pub fn garments(&self) -> &[GarmentId] {
        &self.garments
    }

    pub fn composite_score(&self) -> f64 {
        self.composite_score
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn contains(&self, id: GarmentId) -> bool {
        self.garments.contains(&id)
    }

    fn sorted_ids(&self) -> SmallVec<[GarmentId; 5]> {
        let mut ids = self.garments.clone();
        ids.sort_unstable();
        ids
    }
}

/// Ranking order: best first
pub fn rank_candidates(a: &OutfitCandidate, b: &OutfitCandidate) -> Ordering {
    b.composite_score
        .total_cmp(&a.composite_score)
        .then_with(|| a.total_cost.total_cmp(&b.total_cost))
        .then_with(|| a.sorted_ids().cmp(&b.sorted_ids()))
}

/// How a result set falls short of exhaustive search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    /// The space exceeded the enumeration ceiling and was sampled
    pub sampled: bool,
    /// The deadline passed before every scheduled combination was scored
    pub deadline_exceeded: bool,
    /// Combinations actually scored
    pub explored: u64,
    /// Size of the full combination space
    pub total: u64,
}

/// Ranked candidates plus how they were obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionSet {
    candidates: Vec<OutfitCandidate>,
    degradation: Option<Degradation>,
    catalog_version: u64,
    profile: ProfileSnapshot,
    /// Combinations scored
    considered: u64,
    /// Scored combinations that were within budget
    feasible: u64,
}

impl SuggestionSet {
    fn empty(catalog: &CatalogSnapshot, profile: &ProfileSnapshot) -> Self {
        Self {
            candidates: Vec::new(),
            degradation: None,
            catalog_version: catalog.version(),
            profile: *profile,
            considered: 0,
            feasible: 0,
        }
    }

    pub fn candidates(&self) -> &[OutfitCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn degradation(&self) -> Option<&Degradation> {
        self.degradation.as_ref()
    }

    /// True when the candidates are approximate (sampled or cut short)
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Catalog version the candidates were computed from
    pub fn catalog_version(&self) -> u64 {
        self.catalog_version
    }

    pub fn profile(&self) -> &ProfileSnapshot {
        &self.profile
    }

    pub fn considered(&self) -> u64 {
        self.considered
    }

    pub fn feasible(&self) -> u64 {
        self.feasible
    }

    /// Whether any candidate uses the garment
    pub fn references(&self, id: GarmentId) -> bool {
        self.candidates.iter().any(|c| c.contains(id))
    }
}

/// Eligible garments for one slot, as indices into `Search::entries`
struct Slot {
    members: Vec<usize>,
    optional: bool,
}

impl Slot {
    /// Number of digit values: one per member, plus "none" for optional slots
    fn radix(&self) -> u64 {
        self.members.len() as u64 + u64::from(self.optional)
    }
}

/// When composition stops starting new chunks
enum Cutoff {
    At(Instant),
    /// Let exactly `limit` chunks start
    #[cfg(test)]
    AfterChunks { limit: u64, started: AtomicU64 },
}

/// Per-request search state shared read-only across Rayon workers
struct Search<'a> {
    entries: Vec<&'a Garment>,
    slots: Vec<Slot>,
    /// Palette index of each entry's color
    colors: Vec<usize>,
    palette: Vec<&'a Color>,
    /// Row-major pair scores over the palette; `None` when the palette is too large
    pair_table: Option<Vec<f64>>,
    matrix: &'a ColorMatrix,
    profile: &'a ProfileSnapshot,
    config: &'a SuggestionConfig,
    cutoff: Option<Cutoff>,
    expired: AtomicBool,
    explored: AtomicU64,
    feasible: AtomicU64,
}

impl<'a> Search<'a> {
    fn space(&self) -> u64 {
        self.slots
            .iter()
            .map(Slot::radix)
            .try_fold(1u64, |acc, radix| acc.checked_mul(radix))
            .unwrap_or(u64::MAX)
    }

    /// Called once per chunk before it starts; latches so later chunks skip the clock
    fn out_of_time(&self) -> bool {
        if self.expired.load(AtomicOrdering::Relaxed) {
            return true;
        }
        let expired = match &self.cutoff {
            None => false,
            Some(Cutoff::At(deadline)) => Instant::now() >= *deadline,
            #[cfg(test)]
            Some(Cutoff::AfterChunks { limit, started }) => started.fetch_add(1, AtomicOrdering::Relaxed) >= *limit,
        };
        if expired {
            self.expired.store(true, AtomicOrdering::Relaxed);
        }
        expired
    }

    /// Clock-only check that does not count as starting a chunk
    fn past_deadline(&self) -> bool {
        if let Some(Cutoff::At(deadline)) = &self.cutoff {
            if Instant::now() >= *deadline {
                self.expired.store(true, AtomicOrdering::Relaxed);
            }
        }
        self.expired.load(AtomicOrdering::Relaxed)
    }

    fn pair_score(&self, a: usize, b: usize) -> f64 {
        let (ca, cb) = (self.colors[a], self.colors[b]);
        match &self.pair_table {
            Some(table) => table[ca * self.palette.len() + cb],
            None => self.matrix.pair_score(self.palette[ca], self.palette[cb]),
        }
    }

    fn decode(&self, mut index: u64, out: &mut SmallVec<[usize; 5]>) {
        for slot in &self.slots {
            let radix = slot.radix();
            let digit = (index % radix) as usize;
            index /= radix;

            if slot.optional {
                if digit > 0 {
                    out.push(slot.members[digit - 1]);
                }
            } else {
                out.push(slot.members[digit]);
            }
        }
    }

    /// Score one combination; `None` when it breaks the budget
    fn evaluate(&self, index: u64) -> Option<OutfitCandidate> {
        let mut picks: SmallVec<[usize; 5]> = SmallVec::new();
        self.decode(index, &mut picks);

        // Summed in slot order, the same order `metrics::total_cost` uses
        let total_cost: f64 = picks.iter().map(|&e| self.entries[e].price()).sum();
        if let Some(ceiling) = self.profile.budget_ceiling {
            if total_cost > ceiling {
                return None;
            }
        }

        let formality: SmallVec<[u8; 5]> = picks
            .iter()
            .map(|&e| self.entries[e].formality().value())
            .collect();

        let breakdown = ScoreBreakdown {
            color_harmony: mean_pair_score(picks.len(), |i, j| self.pair_score(picks[i], picks[j])),
            formality_spread: calculate_formality_spread(&formality),
            budget_fit: calculate_budget_fit(total_cost, self.profile.budget_ceiling),
        };

        Some(OutfitCandidate {
            garments: picks.iter().map(|&e| self.entries[e].id()).collect(),
            composite_score: breakdown.composite(&self.config.weights),
            total_cost,
            breakdown,
        })
    }

    /// Score a run of indices into `best`, pruning it to `limit` as it grows
    fn score_into(&self, indices: impl Iterator<Item = u64>, best: &mut Vec<OutfitCandidate>, limit: usize) {
        let mut scored = 0u64;
        let mut kept = 0u64;
        let prune_at = limit.saturating_mul(2).max(64);

        for index in indices {
            scored += 1;
            if let Some(candidate) = self.evaluate(index) {
                kept += 1;
                best.push(candidate);
                if best.len() >= prune_at {
                    truncate_ranked(best, limit);
                }
            }
        }

        self.explored.fetch_add(scored, AtomicOrdering::Relaxed);
        self.feasible.fetch_add(kept, AtomicOrdering::Relaxed);
    }
}

fn truncate_ranked(candidates: &mut Vec<OutfitCandidate>, limit: usize) {
    candidates.sort_unstable_by(rank_candidates);
    candidates.truncate(limit);
}

fn merge_ranked(mut a: Vec<OutfitCandidate>, b: Vec<OutfitCandidate>, limit: usize) -> Vec<OutfitCandidate> {
    a.extend(b);
    truncate_ranked(&mut a, limit);
    a
}

/// Produces ranked outfit candidates from a catalog and profile snapshot
#[derive(Debug, Clone)]
pub struct OutfitComposer {
    config: SuggestionConfig,
    matrix: ColorMatrix,
}

impl Default for OutfitComposer {
    fn default() -> Self {
        Self::from_valid(SuggestionConfig::default())
    }
}

impl OutfitComposer {
    /// Build a composer, rejecting configs that could not score or bound work
    /// (zero chunk size, all-zero weights, out-of-range table scores, ...)
    pub fn new(config: SuggestionConfig) -> Result<Self> {
        config.validate().context("Invalid suggestion config")?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: SuggestionConfig) -> Self {
        let matrix = ColorMatrix::from_table(&config.colors);
        Self { config, matrix }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn color_matrix(&self) -> &ColorMatrix {
        &self.matrix
    }

    /// Compose up to `limit` ranked candidates
    pub fn compose(&self, catalog: &CatalogSnapshot, profile: &ProfileSnapshot, limit: usize) -> SuggestionSet {
        self.compose_until(catalog, profile, limit, None)
    }

    /// Compose with an optional deadline, returning best-so-far if it passes
    pub fn compose_until(
        &self,
        catalog: &CatalogSnapshot,
        profile: &ProfileSnapshot,
        limit: usize,
        deadline: Option<Instant>,
    ) -> SuggestionSet {
        self.compose_with(catalog, profile, limit, deadline.map(Cutoff::At))
    }

    fn compose_with(
        &self,
        catalog: &CatalogSnapshot,
        profile: &ProfileSnapshot,
        limit: usize,
        cutoff: Option<Cutoff>,
    ) -> SuggestionSet {
        let started = Instant::now();

        if limit == 0 {
            return SuggestionSet::empty(catalog, profile);
        }
        let Some(search) = self.prepare(catalog, profile, cutoff) else {
            tracing::debug!(style = %profile.style, "no combination can satisfy the hard constraints");
            return SuggestionSet::empty(catalog, profile);
        };

        let space = search.space();
        let chunk = self.config.chunk_size.max(1) as u64;
        let sampled = space > self.config.enumeration_ceiling && (self.config.sample_size as u64) < space;

        let mut best = if sampled {
            let indices = self.sample_indices(&search, space);
            indices
                .par_chunks(self.config.chunk_size.max(1))
                .fold(Vec::new, |mut acc, run| {
                    if !search.out_of_time() {
                        search.score_into(run.iter().copied(), &mut acc, limit);
                    }
                    acc
                })
                .reduce(Vec::new, |a, b| merge_ranked(a, b, limit))
        } else {
            (0..space.div_ceil(chunk))
                .into_par_iter()
                .fold(Vec::new, |mut acc, c| {
                    if !search.out_of_time() {
                        let start = c * chunk;
                        let end = (start + chunk).min(space);
                        search.score_into(start..end, &mut acc, limit);
                    }
                    acc
                })
                .reduce(Vec::new, |a, b| merge_ranked(a, b, limit))
        };
        truncate_ranked(&mut best, limit);

        let explored = search.explored.load(AtomicOrdering::Relaxed);
        let deadline_exceeded = search.expired.load(AtomicOrdering::Relaxed);
        let degradation = (sampled || deadline_exceeded).then_some(Degradation {
            sampled,
            deadline_exceeded,
            explored,
            total: space,
        });

        if let Some(d) = &degradation {
            tracing::warn!(
                sampled = d.sampled,
                deadline_exceeded = d.deadline_exceeded,
                explored = d.explored,
                total = d.total,
                "outfit suggestions are approximate"
            );
        }
        tracing::info!(
            space,
            explored,
            candidates = best.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composed outfit suggestions"
        );

        SuggestionSet {
            candidates: best,
            degradation,
            catalog_version: catalog.version(),
            profile: *profile,
            considered: explored,
            feasible: search.feasible.load(AtomicOrdering::Relaxed),
        }
    }

    /// Filter garments into slots and precompute pair scores
    ///
    /// Returns `None` when some mandatory slot ends up empty, i.e. when no
    /// combination can meet the category, band and budget constraints.
    fn prepare<'a>(
        &'a self,
        catalog: &'a CatalogSnapshot,
        profile: &'a ProfileSnapshot,
        cutoff: Option<Cutoff>,
    ) -> Option<Search<'a>> {
        let band = self.config.band(profile.style);

        let mut by_slot: Vec<Vec<&Garment>> = SLOT_ORDER
            .iter()
            .map(|&category| {
                catalog
                    .by_category(category)
                    .filter(|g| band.contains(g.formality().value()))
                    .collect()
            })
            .collect();

        if SLOT_ORDER
            .iter()
            .zip(&by_slot)
            .any(|(category, members)| category.is_mandatory() && members.is_empty())
        {
            return None;
        }

        if let Some(ceiling) = profile.budget_ceiling {
            // Cheapest possible spend on each slot (optional slots can stay empty)
            let floors: Vec<f64> = SLOT_ORDER
                .iter()
                .zip(&by_slot)
                .map(|(category, members)| {
                    if category.is_mandatory() {
                        members.iter().map(|g| g.price()).fold(f64::INFINITY, f64::min)
                    } else {
                        0.0
                    }
                })
                .collect();
            let floor_total: f64 = floors.iter().sum();
            let slack = 1e-9 * ceiling.max(1.0);

            for (members, floor) in by_slot.iter_mut().zip(&floors) {
                members.retain(|g| g.price() + (floor_total - floor) <= ceiling + slack);
            }

            if SLOT_ORDER
                .iter()
                .zip(&by_slot)
                .any(|(category, members)| category.is_mandatory() && members.is_empty())
            {
                return None;
            }
        }

        let mut entries = Vec::new();
        let mut slots = Vec::with_capacity(SLOT_ORDER.len());
        for (category, members) in SLOT_ORDER.iter().zip(by_slot) {
            let start = entries.len();
            entries.extend(members);
            slots.push(Slot {
                members: (start..entries.len()).collect(),
                optional: !category.is_mandatory(),
            });
        }

        let mut palette: Vec<&Color> = Vec::new();
        let mut palette_index: FxHashMap<&str, usize> = FxHashMap::default();
        let colors: Vec<usize> = entries
            .iter()
            .copied()
            .map(|g| {
                *palette_index.entry(g.color().as_str()).or_insert_with(|| {
                    palette.push(g.color());
                    palette.len() - 1
                })
            })
            .collect();

        let pair_table = (palette.len() <= DENSE_PALETTE_LIMIT).then(|| {
            let k = palette.len();
            let mut table = vec![0.0; k * k];
            for i in 0..k {
                for j in i..k {
                    let score = self.matrix.pair_score(palette[i], palette[j]);
                    table[i * k + j] = score;
                    table[j * k + i] = score;
                }
            }
            table
        });

        Some(Search {
            entries,
            slots,
            colors,
            palette,
            pair_table,
            matrix: &self.matrix,
            profile,
            config: &self.config,
            cutoff,
            expired: AtomicBool::new(false),
            explored: AtomicU64::new(0),
            feasible: AtomicU64::new(0),
        })
    }

    /// Distinct indices in `0..space`, reproducible for a given seed
    ///
    /// Stops early, with fewer indices, once the deadline passes.
    fn sample_indices(&self, search: &Search<'_>, space: u64) -> Vec<u64> {
        let target = self.config.sample_size.min(usize::try_from(space).unwrap_or(usize::MAX));
        let mut rng = StdRng::seed_from_u64(self.config.sample_seed);

        // Dense sample: space < 2 * target, so the whole range fits next to the sample
        if (target as u64).saturating_mul(2) > space {
            let mut all: Vec<u64> = (0..space).collect();
            let (picked, _) = all.partial_shuffle(&mut rng, target);
            return picked.to_vec();
        }

        let mut seen: FxHashSet<u64> = FxHashSet::default();
        let mut indices = Vec::with_capacity(target);
        let mut draws = 0usize;

        while indices.len() < target {
            if draws % SAMPLE_DEADLINE_STRIDE == 0 && search.past_deadline() {
                break;
            }
            draws += 1;

            let index = rng.gen_range(0..space);
            if seen.insert(index) {
                indices.push(index);
            }
        }
        indices
    }
}
