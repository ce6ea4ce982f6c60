//! Parquet-backed wardrobe store
//!
//! Layout inside the store directory:
//!   - `garments.parquet`: one row per garment (id, category, color,
//!     formality, price, image_ref), ZSTD compressed
//!   - `wardrobe.json`: format, next_id and the profile
//!
//! The sidecar is written last and read first; a directory without it counts
//! as empty.

use super::{WardrobeSnapshot, WardrobeStore};
use crate::error::StoreError;
use crate::garment::{Category, Garment, GarmentDraft, GarmentId};
use crate::profile::ProfileSnapshot;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const GARMENTS_FILE: &str = "garments.parquet";
const META_FILE: &str = "wardrobe.json";

#[derive(Debug, Serialize, Deserialize)]
struct WardrobeMeta {
    format: u32,
    next_id: u64,
    profile: ProfileSnapshot,
}

#[derive(Debug, Clone)]
pub struct ParquetStore {
    dir: PathBuf,
}

impl ParquetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn garments_path(&self) -> PathBuf {
        self.dir.join(GARMENTS_FILE)
    }

    fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    fn write_garments(&self, garments: &[Garment]) -> Result<(), StoreError> {
        let ids: Vec<i64> = garments.iter().map(|g| g.id().get() as i64).collect();
        let categories: Vec<&str> = garments.iter().map(|g| g.category().as_str()).collect();
        let colors: Vec<&str> = garments.iter().map(|g| g.color().as_str()).collect();
        let formality: Vec<i64> = garments.iter().map(|g| g.formality().value() as i64).collect();
        let prices: Vec<f64> = garments.iter().map(Garment::price).collect();
        let images: Vec<&str> = garments.iter().map(|g| g.image_ref().as_str()).collect();

        let mut df = DataFrame::new(vec![
            Series::new("id".into(), ids).into(),
            Series::new("category".into(), categories).into(),
            Series::new("color".into(), colors).into(),
            Series::new("formality".into(), formality).into(),
            Series::new("price".into(), prices).into(),
            Series::new("image_ref".into(), images).into(),
        ])?;

        let file = fs::File::create(self.garments_path())?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Zstd(None))
            .finish(&mut df)?;
        Ok(())
    }

    fn read_garments(&self) -> Result<Vec<Garment>, StoreError> {
        let df = LazyFrame::scan_parquet(self.garments_path(), Default::default())?
            .select([
                col("id"),
                col("category"),
                col("color"),
                col("formality"),
                col("price"),
                col("image_ref"),
            ])
            .collect()?;

        let ids = df.column("id")?.i64()?;
        let categories = df.column("category")?.str()?;
        let colors = df.column("color")?.str()?;
        let formality = df.column("formality")?.i64()?;
        let prices = df.column("price")?.f64()?;
        let images = df.column("image_ref")?.str()?;

        let mut garments = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let raw_id = ids
                .get(row)
                .ok_or_else(|| StoreError::Corrupt(format!("row {}: missing id", row)))?;
            let id = u64::try_from(raw_id)
                .map_err(|_| StoreError::Corrupt(format!("row {}: negative id {}", row, raw_id)))?;

            let category = match categories.get(row) {
                Some(raw) => Some(raw.parse::<Category>()?),
                None => None,
            };
            let draft = GarmentDraft {
                category,
                color: colors.get(row).map(str::to_string),
                formality: formality.get(row),
                price: prices.get(row),
                image_ref: images.get(row).map(str::to_string),
            };
            garments.push(draft.validate(GarmentId::new(id))?);
        }
        Ok(garments)
    }
}

impl WardrobeStore for ParquetStore {
    fn save(&self, snapshot: &WardrobeSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        self.write_garments(&snapshot.garments)?;

        let meta = WardrobeMeta {
            format: snapshot.format,
            next_id: snapshot.next_id,
            profile: snapshot.profile,
        };
        let tmp = self.meta_path().with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&meta)?)?;
        fs::rename(&tmp, self.meta_path())?;

        tracing::debug!(dir = %self.dir.display(), garments = snapshot.garments.len(), "wardrobe saved to parquet");
        Ok(())
    }

    fn load(&self) -> Result<Option<WardrobeSnapshot>, StoreError> {
        let meta_bytes = match fs::read(self.meta_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let meta: WardrobeMeta = serde_json::from_slice(&meta_bytes)?;
        let garments = self.read_garments()?;

        tracing::debug!(dir = %self.dir.display(), garments = garments.len(), "wardrobe loaded from parquet");
        Ok(Some(WardrobeSnapshot {
            format: meta.format,
            next_id: meta.next_id,
            garments,
            profile: meta.profile,
        }))
    }
}
