// Suggestion flow integration tests
//
// Purpose: drive the public API the way an app shell would (upload, edit
// preferences, request suggestions, persist) and check the end-to-end guarantees.
// Run with: cargo test --test suggestion_flow_tests

use approx::assert_relative_eq;
use std::collections::BTreeSet;
use std::sync::Arc;
use wardrobe_core::{
    Category, GarmentDraft, GarmentId, JsonFileStore, OutfitComposer, ProfileUpdate, SessionState, ScoreWeights,
    StyleTag, SuggestionConfig, SuggestionSession, ValidationError,
};

fn draft(category: Category, color: &str, formality: i64, price: f64) -> GarmentDraft {
    GarmentDraft::new()
        .category(category)
        .color(color)
        .formality(formality)
        .price(price)
        .image_ref(format!("photos/{}-{}.jpg", category, color))
}

// Helper: the three-piece closet from the product walkthrough
fn walkthrough_session() -> (SuggestionSession, [GarmentId; 3]) {
    let mut session = SuggestionSession::new();
    let a = session.add_garment(draft(Category::Top, "blue", 2, 20.0)).unwrap();
    let b = session.add_garment(draft(Category::Bottom, "navy", 2, 15.0)).unwrap();
    let c = session.add_garment(draft(Category::Footwear, "white", 2, 40.0)).unwrap();
    session
        .update_profile(ProfileUpdate::new().style("casual").budget_text("$100"))
        .unwrap();
    (session, [a, b, c])
}

// Helper: a closet with enough variety to exercise every constraint
fn varied_session() -> SuggestionSession {
    let mut session = SuggestionSession::new();
    let items = [
        (Category::Top, "white", 1, 15.0),
        (Category::Top, "red", 3, 22.0),
        (Category::Top, "grey", 4, 35.0),
        (Category::Top, "black", 8, 90.0),
        (Category::Bottom, "denim", 2, 40.0),
        (Category::Bottom, "khaki", 4, 38.0),
        (Category::Bottom, "charcoal", 8, 120.0),
        (Category::Footwear, "white", 1, 60.0),
        (Category::Footwear, "brown", 4, 85.0),
        (Category::Outerwear, "olive", 3, 70.0),
        (Category::Outerwear, "camel", 7, 200.0),
        (Category::Accessory, "pink", 2, 10.0),
        (Category::Accessory, "gold", 4, 25.0),
    ];
    let drafts: Vec<GarmentDraft> = items
        .into_iter()
        .map(|(category, color, formality, price)| draft(category, color, formality, price))
        .collect();
    session.add_garments(&drafts).unwrap();
    session
}

// =========================================================================
// Section 1: Walkthrough scenarios
// =========================================================================

#[test]
fn test_walkthrough_single_outfit_within_budget() {
    let (mut session, [a, b, c]) = walkthrough_session();

    let set = session.request_suggestions(1);

    assert_eq!(set.len(), 1);
    assert!(!set.is_degraded());
    let outfit = &set.candidates()[0];
    let ids: BTreeSet<GarmentId> = outfit.garments().iter().copied().collect();
    assert_eq!(ids, BTreeSet::from([a, b, c]));
    assert_relative_eq!(outfit.total_cost(), 75.0);
}

#[test]
fn test_walkthrough_lower_budget_gives_empty_result() {
    let (mut session, _) = walkthrough_session();
    session.update_profile(ProfileUpdate::new().budget(50.0)).unwrap();

    let set = session.request_suggestions(1);

    assert!(set.is_empty());
    assert!(!set.is_degraded());
}

// =========================================================================
// Section 2: Hard constraints
// =========================================================================

#[test]
fn test_no_candidate_breaks_budget_or_misses_a_slot() {
    let mut session = varied_session();

    for (style, budget) in [("casual", 150.0), ("casual", 220.0), ("smart-casual", 260.0), ("business", 400.0)] {
        session
            .update_profile(ProfileUpdate::new().style(style).budget(budget))
            .unwrap();
        let set = session.request_suggestions(50);
        let band = session.composer().config().band(style.parse::<StyleTag>().unwrap());

        for candidate in set.candidates() {
            let garments: Vec<_> = candidate
                .garments()
                .iter()
                .map(|id| session.catalog().get(*id).expect("candidate references live garment"))
                .collect();

            assert!(candidate.total_cost() <= budget, "{} > {}", candidate.total_cost(), budget);
            let summed: f64 = garments.iter().map(|g| g.price()).sum();
            assert_relative_eq!(candidate.total_cost(), summed, epsilon = 1e-9);

            for mandatory in [Category::Top, Category::Bottom, Category::Footwear] {
                assert_eq!(garments.iter().filter(|g| g.category() == mandatory).count(), 1);
            }
            for optional in [Category::Outerwear, Category::Accessory] {
                assert!(garments.iter().filter(|g| g.category() == optional).count() <= 1);
            }
            assert!(garments.iter().all(|g| band.contains(g.formality().value())));
        }
    }
}

#[test]
fn test_results_are_sorted_and_scores_bounded() {
    let mut session = varied_session();
    let set = session.request_suggestions(25);
    assert!(!set.is_empty());

    for pair in set.candidates().windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        assert!(
            first.composite_score() > second.composite_score()
                || (first.composite_score() == second.composite_score()
                    && first.total_cost() <= second.total_cost())
        );
    }
    for candidate in set.candidates() {
        assert!((0.0..=100.0).contains(&candidate.composite_score()));
    }
}

// =========================================================================
// Section 3: Catalog and profile contracts
// =========================================================================

#[test]
fn test_add_then_remove_restores_listing() {
    let mut session = varied_session();
    let before = session.catalog().list().to_vec();

    let id = session.add_garment(draft(Category::Accessory, "silver", 5, 18.0)).unwrap();
    session.remove_garment(id);
    session.remove_garment(id);

    assert_eq!(session.catalog().list(), before.as_slice());
}

#[test]
fn test_invalid_inputs_change_nothing() {
    let mut session = varied_session();
    let catalog_version = session.catalog().version();
    let profile = session.profile().current();

    let mut missing_price = draft(Category::Top, "teal", 3, 10.0);
    missing_price.price = None;
    assert_eq!(session.add_garment(missing_price), Err(ValidationError::MissingField("price")));
    assert!(matches!(
        session.update_profile(ProfileUpdate::new().style("goth").budget(10.0)),
        Err(ValidationError::UnknownStyle(_))
    ));
    assert!(matches!(
        session.update_profile(ProfileUpdate::new().budget_text("lots")),
        Err(ValidationError::InvalidBudget(_))
    ));

    assert_eq!(session.catalog().version(), catalog_version);
    assert_eq!(session.profile().current(), profile);
}

// =========================================================================
// Section 4: Caching
// =========================================================================

#[test]
fn test_repeat_requests_are_served_from_cache() {
    let mut session = varied_session();

    let first = session.request_suggestions(10);
    let second = session.request_suggestions(10);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(session.state(), SessionState::Cached);
}

#[test]
fn test_profile_update_between_requests_recomputes() {
    let mut session = varied_session();
    let casual = session.request_suggestions(10);

    session
        .update_profile(ProfileUpdate::new().style("business"))
        .unwrap();
    let business = session.request_suggestions(10);

    assert!(!Arc::ptr_eq(&casual, &business));
    assert_eq!(business.profile().style, StyleTag::Business);
    assert_eq!(session.cache_stats().misses, 2);
}

#[test]
fn test_removed_garment_never_served() {
    let mut session = varied_session();
    let set = session.request_suggestions(5);
    let used = set.candidates()[0].garments()[0];

    session.remove_garment(used);
    let after = session.request_suggestions(5);

    assert!(!after.references(used));
    assert_eq!(after.catalog_version(), session.catalog().version());
}

// =========================================================================
// Section 5: Sampling and persistence
// =========================================================================

#[test]
fn test_large_closet_is_sampled_and_flagged() {
    let config = SuggestionConfig {
        enumeration_ceiling: 20,
        sample_size: 40,
        ..SuggestionConfig::default()
    };
    let mut session = SuggestionSession::with_config(config).unwrap();
    // 72 casual combinations: 3 tops x 2 bottoms x 2 shoes x (1+1) outerwear x (2+1) accessories
    let drafts: Vec<GarmentDraft> = varied_session()
        .catalog()
        .list()
        .iter()
        .map(|g| draft(g.category(), g.color().as_str(), g.formality().value() as i64, g.price()))
        .collect();
    session.add_garments(&drafts).unwrap();

    let set = session.request_suggestions(10);
    let degradation = set.degradation().expect("sampled result is flagged");

    assert!(degradation.sampled);
    assert!(!degradation.deadline_exceeded);
    assert!(degradation.explored <= 40);
    assert_eq!(degradation.total, 72);
}

#[test]
fn test_unusable_config_is_rejected_before_any_request() {
    let zero_chunks = SuggestionConfig { chunk_size: 0, ..SuggestionConfig::default() };
    assert!(SuggestionSession::with_config(zero_chunks).is_err());

    let zero_weights = SuggestionConfig {
        weights: ScoreWeights { color: 0.0, formality: 0.0, budget: 0.0 },
        ..SuggestionConfig::default()
    };
    assert!(OutfitComposer::new(zero_weights).is_err());
}

#[test]
fn test_json_store_round_trip_preserves_suggestions() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("wardrobe.json"));

    let mut session = varied_session();
    session
        .update_profile(ProfileUpdate::new().style("smart casual").budget(300.0))
        .unwrap();
    let expected = session.request_suggestions(10);
    session.save(&store).unwrap();

    let mut restored = SuggestionSession::load(&store, OutfitComposer::default()).unwrap();
    let actual = restored.request_suggestions(10);

    assert_eq!(actual.candidates(), expected.candidates());
}
