//! Wardrobe demo: stock a small closet and print ranked outfit suggestions
//!
//! Usage:
//!   wardrobe_demo [STORE_JSON] [CONFIG_JSON]
//!
//! With STORE_JSON the wardrobe is loaded from (and saved back to) that file;
//! a missing file is seeded with the sample closet. Log verbosity follows
//! `RUST_LOG` (e.g. `RUST_LOG=wardrobe_core=debug`).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use wardrobe_core::{
    Category, GarmentDraft, JsonFileStore, MemoryStore, OutfitComposer, ProfileUpdate, SuggestionConfig,
    SuggestionSession, WardrobeStore,
};

fn sample_closet() -> Vec<GarmentDraft> {
    let items: [(Category, &str, i64, f64); 14] = [
        (Category::Top, "white", 3, 25.0),
        (Category::Top, "light blue", 5, 45.0),
        (Category::Top, "red", 2, 18.0),
        (Category::Top, "black", 6, 60.0),
        (Category::Bottom, "navy", 5, 70.0),
        (Category::Bottom, "denim", 2, 40.0),
        (Category::Bottom, "khaki", 4, 35.0),
        (Category::Footwear, "white", 1, 55.0),
        (Category::Footwear, "brown", 6, 120.0),
        (Category::Footwear, "black", 8, 150.0),
        (Category::Outerwear, "camel", 6, 180.0),
        (Category::Outerwear, "olive", 3, 90.0),
        (Category::Accessory, "silver", 5, 30.0),
        (Category::Accessory, "tan", 4, 25.0),
    ];

    items
        .into_iter()
        .map(|(category, color, formality, price)| {
            GarmentDraft::new()
                .category(category)
                .color(color)
                .formality(formality)
                .price(price)
                .image_ref(format!("demo://{}/{}", category, color.replace(' ', "-")))
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let store_path = args.next().map(PathBuf::from);
    let config = match args.next() {
        Some(path) => SuggestionConfig::load(path.as_ref())?,
        None => SuggestionConfig::default(),
    };

    let store: Box<dyn WardrobeStore> = match &store_path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    let composer = OutfitComposer::new(config)?;
    let mut session =
        SuggestionSession::load(store.as_ref(), composer).context("Failed to load wardrobe")?;
    if session.catalog().is_empty() {
        session
            .add_garments(&sample_closet())
            .context("Failed to seed sample closet")?;
    }

    println!("\n{}", "=".repeat(70));
    println!("WARDROBE: {} garments", session.catalog().len());
    println!("{}", "=".repeat(70));
    for category in Category::ALL {
        let colors: Vec<String> = session
            .catalog()
            .by_category(category)
            .iter()
            .map(|g| format!("{} (${:.0})", g.color(), g.price()))
            .collect();
        println!("  {:<10} {}", category, colors.join(", "));
    }

    for (style, budget) in [("casual", Some(200.0)), ("smart-casual", Some(350.0)), ("business", None)] {
        let mut update = ProfileUpdate::new().style(style);
        update = match budget {
            Some(ceiling) => update.budget(ceiling),
            None => update.clear_budget(),
        };
        session.update_profile(update)?;

        let start = Instant::now();
        let set = session.request_suggestions_until(5, Some(Instant::now() + Duration::from_secs(2)));
        let elapsed = start.elapsed();

        println!("\n{}", "-".repeat(70));
        println!(
            "{} / budget {}: {} suggestions from {} combinations ({} within budget) in {:.2?}",
            style,
            budget.map_or_else(|| "none".to_string(), |b| format!("${:.0}", b)),
            set.len(),
            set.considered(),
            set.feasible(),
            elapsed
        );
        if let Some(d) = set.degradation() {
            println!(
                "  approximate: sampled={} deadline_exceeded={} ({}/{} explored)",
                d.sampled, d.deadline_exceeded, d.explored, d.total
            );
        }
        println!("{}", "-".repeat(70));

        for (rank, candidate) in set.candidates().iter().enumerate() {
            let pieces: Vec<String> = candidate
                .garments()
                .iter()
                .filter_map(|id| session.catalog().get(*id))
                .map(|g| format!("{} {}", g.color(), g.category()))
                .collect();
            let b = candidate.breakdown();
            println!(
                "  #{} {:>6.2}  ${:<7.2} color={:.2} spread={:.2} budget={:.2}  {}",
                rank + 1,
                candidate.composite_score(),
                candidate.total_cost(),
                b.color_harmony,
                b.formality_spread,
                b.budget_fit,
                pieces.join(" + ")
            );
        }
    }

    if store_path.is_some() {
        session.save(store.as_ref()).context("Failed to save wardrobe")?;
    }
    println!();
    Ok(())
}
