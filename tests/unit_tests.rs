// Unit tests for Estate Match scoring

use estate_match::core::{
    criteria::{
        evaluate_price, evaluate_required_features, evaluate_size, within_bounds, Evaluation, Gate, GATES,
        SCORED_CRITERIA,
    },
    scoring::calculate_match_score,
};
use estate_match::models::{Property, PropertyStatus, PropertyType, PurchaseProfile, ScoringWeights};

fn create_property() -> Property {
    Property {
        id: "property-1".to_string(),
        property_type: PropertyType::Office,
        status: PropertyStatus::Active,
        price: Some(2_000_000.0),
        size_m2: Some(400.0),
        bedrooms: None,
        bathrooms: None,
        city: "Berlin".to_string(),
        features: vec!["parking".to_string(), "elevator".to_string()],
        updated_at: None,
    }
}

fn create_profile() -> PurchaseProfile {
    PurchaseProfile {
        id: "profile-1".to_string(),
        client_id: "client-1".to_string(),
        property_types: vec![PropertyType::Office],
        locations: vec!["Berlin".to_string()],
        min_price: Some(1_500_000.0),
        max_price: Some(2_500_000.0),
        min_size: Some(300.0),
        max_size: Some(500.0),
        min_bedrooms: None,
        max_bedrooms: None,
        min_bathrooms: None,
        max_bathrooms: None,
        required_features: vec!["parking".to_string()],
        desired_features: vec!["elevator".to_string(), "cafeteria".to_string()],
        is_active: true,
    }
}

fn bare_profile() -> PurchaseProfile {
    PurchaseProfile {
        min_price: None,
        max_price: None,
        min_size: None,
        max_size: None,
        required_features: vec![],
        desired_features: vec![],
        ..create_profile()
    }
}

#[test]
fn test_default_weights_sum_to_scale() {
    let weights = ScoringWeights::default();
    let gates: f64 = [weights.property_type, weights.location].iter().sum();
    let scored: f64 = SCORED_CRITERIA.iter().map(|c| c.max_points(&weights)).sum();

    assert_eq!(gates + scored, 100.0);
    assert!(weights.validate().is_ok());
}

#[test]
fn test_gates_run_type_first() {
    assert_eq!(GATES[0], Gate::PropertyType);
    assert_eq!(GATES[1], Gate::Location);
}

#[test]
fn test_score_within_range() {
    let weights = ScoringWeights::default();
    let mut property = create_property();

    for price in [0.0, 1_000.0, 1_500_000.0, 2_600_000.0, 9_000_000_000.0] {
        property.price = Some(price);
        let breakdown = calculate_match_score(&property, &create_profile(), &weights);
        assert!(breakdown.score <= 100);
    }
}

#[test]
fn test_property_type_gate() {
    let weights = ScoringWeights::default();
    let mut property = create_property();
    property.property_type = PropertyType::Land;

    let breakdown = calculate_match_score(&property, &create_profile(), &weights);
    assert_eq!(breakdown.score, 0);
    assert!(breakdown.reasons.is_empty());
}

#[test]
fn test_location_gate_is_case_insensitive() {
    let weights = ScoringWeights::default();
    let mut profile = create_profile();
    profile.locations = vec!["  berlin ".to_string()];

    let breakdown = calculate_match_score(&create_property(), &profile, &weights);
    assert_eq!(breakdown.score, 80);

    profile.locations = vec!["Munich".to_string()];
    let breakdown = calculate_match_score(&create_property(), &profile, &weights);
    assert_eq!(breakdown.score, 0);
    assert!(breakdown.reasons.is_empty());
}

#[test]
fn test_scoring_is_idempotent() {
    let weights = ScoringWeights::default();
    let property = create_property();
    let profile = create_profile();

    let first = calculate_match_score(&property, &profile, &weights);
    let second = calculate_match_score(&property, &profile, &weights);
    assert_eq!(first, second);
}

#[test]
fn test_more_desired_features_never_lower_score() {
    let weights = ScoringWeights::default();
    let profile = create_profile();
    let mut property = create_property();

    let before = calculate_match_score(&property, &profile, &weights).score;
    property.features.push("cafeteria".to_string());
    let after = calculate_match_score(&property, &profile, &weights).score;

    assert!(after >= before);
    assert_eq!(after, 85);
}

#[test]
fn test_matching_a_required_feature_never_lowers_score() {
    let weights = ScoringWeights::default();
    let mut profile = create_profile();
    profile.required_features = vec!["parking".to_string(), "sprinkler".to_string()];
    let mut property = create_property();

    let before = calculate_match_score(&property, &profile, &weights);
    // 15 + 20 + 15 + 10 + 7.5 + 5
    assert_eq!(before.score, 73);
    assert!(before.concerns.iter().any(|c| c.starts_with("Missing required features")));

    property.features.push("sprinkler".to_string());
    let after = calculate_match_score(&property, &profile, &weights);

    assert!(after.score >= before.score);
    assert_eq!(after.score, 80);
    assert!(!after.concerns.iter().any(|c| c.starts_with("Missing required features")));
}

#[test]
fn test_unconstrained_profile_scores_gates_only() {
    let weights = ScoringWeights::default();
    let breakdown = calculate_match_score(&create_property(), &bare_profile(), &weights);

    assert_eq!(breakdown.score, 35);
    assert_eq!(breakdown.reasons.len(), 2);
    assert!(breakdown.concerns.is_empty());
}

#[test]
fn test_price_tolerance_band() {
    let weights = ScoringWeights::default();
    let property = create_property();
    let mut profile = create_profile();

    profile.max_price = Some(1_800_000.0);
    let outside = evaluate_price(&property, &profile, &weights);
    assert_eq!(outside, Evaluation::not_applicable());

    profile.max_price = Some(1_900_000.0);
    let partial = evaluate_price(&property, &profile, &weights);
    assert_eq!(partial.points, 5.0);
    assert!(partial.reason.is_none());
    assert!(partial.concern.is_some());
}

#[test]
fn test_price_below_minimum_uses_same_band() {
    let weights = ScoringWeights::default();
    let mut property = create_property();
    property.price = Some(1_400_000.0);

    // 1.4M is ~6.7% under the 1.5M floor
    let partial = evaluate_price(&property, &create_profile(), &weights);
    assert_eq!(partial.points, 5.0);
}

#[test]
fn test_missing_size_is_not_applicable() {
    let weights = ScoringWeights::default();
    let mut property = create_property();
    property.size_m2 = None;

    let evaluation = evaluate_size(&property, &create_profile(), &weights);
    assert_eq!(evaluation.points, 0.0);
    assert!(evaluation.reason.is_none());
    assert!(evaluation.concern.is_none());
}

#[test]
fn test_required_features_partial_credit() {
    let weights = ScoringWeights::default();
    let mut profile = create_profile();
    profile.required_features = vec!["Parking".to_string(), "sprinkler".to_string()];

    let evaluation = evaluate_required_features(&create_property(), &profile, &weights);
    assert_eq!(evaluation.points, 7.5);
    assert!(evaluation.reason.is_some());
    assert_eq!(evaluation.concern.as_deref(), Some("Missing required features: sprinkler"));
}

#[test]
fn test_within_bounds_inclusive() {
    assert!(within_bounds(300.0, Some(300.0), Some(500.0)));
    assert!(within_bounds(500.0, Some(300.0), Some(500.0)));
    assert!(!within_bounds(500.1, Some(300.0), Some(500.0)));
    assert!(within_bounds(3u32, None, None));
}

#[test]
fn test_bedrooms_and_bathrooms_scored() {
    let weights = ScoringWeights::default();
    let mut property = create_property();
    property.property_type = PropertyType::Residential;
    property.bedrooms = Some(3);
    property.bathrooms = Some(1);

    let mut profile = bare_profile();
    profile.property_types = vec![PropertyType::Residential];
    profile.min_bedrooms = Some(2);
    profile.max_bedrooms = Some(4);
    profile.min_bathrooms = Some(2);

    let breakdown = calculate_match_score(&property, &profile, &weights);
    // 15 + 20 + 10 bedrooms, bathrooms below minimum
    assert_eq!(breakdown.score, 45);
}
