use std::collections::HashSet;
use std::fmt::Display;
use crate::models::{Property, PurchaseProfile, ScoringWeights};

/// Contribution of a single criterion to a match score
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    pub points: f64,
    pub reason: Option<String>,
    pub concern: Option<String>,
}

impl Evaluation {
    /// Criterion does not apply to this pair
    pub fn not_applicable() -> Self {
        Self::default()
    }

    fn awarded(points: f64, reason: String) -> Self {
        Self {
            points,
            reason: Some(reason),
            concern: None,
        }
    }
}

/// Must-match criteria. A failing gate zeroes the whole score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    PropertyType,
    Location,
}

/// Gates in evaluation order
pub const GATES: [Gate; 2] = [Gate::PropertyType, Gate::Location];

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::PropertyType => "property_type",
            Gate::Location => "location",
        }
    }

    /// Returns `None` when the gate fails
    pub fn evaluate(
        &self,
        property: &Property,
        profile: &PurchaseProfile,
        weights: &ScoringWeights,
    ) -> Option<Evaluation> {
        match self {
            Gate::PropertyType => evaluate_property_type(property, profile, weights),
            Gate::Location => evaluate_location(property, profile, weights),
        }
    }
}

/// Soft criteria that add points but never reject a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Price,
    Size,
    Bedrooms,
    Bathrooms,
    RequiredFeatures,
    DesiredFeatures,
}

/// Scored criteria in evaluation order; reasons follow this order
pub const SCORED_CRITERIA: [Criterion; 6] = [
    Criterion::Price,
    Criterion::Size,
    Criterion::Bedrooms,
    Criterion::Bathrooms,
    Criterion::RequiredFeatures,
    Criterion::DesiredFeatures,
];

impl Criterion {
    pub fn name(&self) -> &'static str {
        match self {
            Criterion::Price => "price",
            Criterion::Size => "size",
            Criterion::Bedrooms => "bedrooms",
            Criterion::Bathrooms => "bathrooms",
            Criterion::RequiredFeatures => "required_features",
            Criterion::DesiredFeatures => "desired_features",
        }
    }

    pub fn max_points(&self, weights: &ScoringWeights) -> f64 {
        match self {
            Criterion::Price => weights.price,
            Criterion::Size => weights.size,
            Criterion::Bedrooms => weights.bedrooms,
            Criterion::Bathrooms => weights.bathrooms,
            Criterion::RequiredFeatures => weights.required_features,
            Criterion::DesiredFeatures => weights.desired_features,
        }
    }

    pub fn evaluate(
        &self,
        property: &Property,
        profile: &PurchaseProfile,
        weights: &ScoringWeights,
    ) -> Evaluation {
        match self {
            Criterion::Price => evaluate_price(property, profile, weights),
            Criterion::Size => evaluate_size(property, profile, weights),
            Criterion::Bedrooms => evaluate_bedrooms(property, profile, weights),
            Criterion::Bathrooms => evaluate_bathrooms(property, profile, weights),
            Criterion::RequiredFeatures => evaluate_required_features(property, profile, weights),
            Criterion::DesiredFeatures => evaluate_desired_features(property, profile, weights),
        }
    }
}

#[inline]
pub fn evaluate_property_type(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Option<Evaluation> {
    if !profile.property_types.contains(&property.property_type) {
        return None;
    }

    Some(Evaluation::awarded(
        weights.property_type,
        format!("Property type {} is wanted", property.property_type),
    ))
}

#[inline]
pub fn evaluate_location(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Option<Evaluation> {
    let city = normalize(&property.city);
    if city.is_empty() || !profile.locations.iter().any(|l| normalize(l) == city) {
        return None;
    }

    Some(Evaluation::awarded(
        weights.location,
        format!("Located in {}", property.city.trim()),
    ))
}

/// Price check with a tolerance band around the nearer bound
///
/// Inside the range awards `weights.price`. Outside the range but within
/// `weights.price_tolerance` of the violated bound awards
/// `weights.price_partial` and records a concern instead of a reason.
pub fn evaluate_price(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    let Some(price) = property.price else {
        return Evaluation::not_applicable();
    };
    let (min, max) = (profile.min_price, profile.max_price);
    if min.is_none() && max.is_none() {
        return Evaluation::not_applicable();
    }

    if within_bounds(price, min, max) {
        return Evaluation::awarded(
            weights.price,
            format!("Price {} is {}", price, describe_range(min, max, "")),
        );
    }

    let tolerance = weights.price_tolerance;

    if let Some(max) = max {
        if price > max && price <= max * (1.0 + tolerance) {
            return Evaluation {
                points: weights.price_partial,
                reason: None,
                concern: Some(format!(
                    "Price {} is {:.1}% above the maximum budget of {}",
                    price,
                    deviation_percent(price, max),
                    max
                )),
            };
        }
    }

    if let Some(min) = min {
        if price < min && price >= min * (1.0 - tolerance) {
            return Evaluation {
                points: weights.price_partial,
                reason: None,
                concern: Some(format!(
                    "Price {} is {:.1}% below the minimum budget of {}",
                    price,
                    deviation_percent(price, min),
                    min
                )),
            };
        }
    }

    Evaluation::not_applicable()
}

#[inline]
pub fn evaluate_size(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    range_criterion(
        "Size",
        " m²",
        property.size_m2,
        profile.min_size,
        profile.max_size,
        weights.size,
    )
}

#[inline]
pub fn evaluate_bedrooms(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    range_criterion(
        "Bedrooms",
        "",
        property.bedrooms,
        profile.min_bedrooms,
        profile.max_bedrooms,
        weights.bedrooms,
    )
}

#[inline]
pub fn evaluate_bathrooms(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    range_criterion(
        "Bathrooms",
        "",
        property.bathrooms,
        profile.min_bathrooms,
        profile.max_bathrooms,
        weights.bathrooms,
    )
}

/// Proportional credit for required features; missing ones become a concern
pub fn evaluate_required_features(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    let required = unique_features(&profile.required_features);
    if required.is_empty() {
        return Evaluation::not_applicable();
    }

    let available = feature_set(&property.features);
    let (present, missing): (Vec<&str>, Vec<&str>) = required
        .iter()
        .copied()
        .partition(|feature| available.contains(&normalize(feature)));

    let points = weights.required_features * present.len() as f64 / required.len() as f64;

    let reason = if missing.is_empty() {
        Some(format!("All required features present: {}", present.join(", ")))
    } else if !present.is_empty() {
        Some(format!(
            "{} of {} required features present: {}",
            present.len(),
            required.len(),
            present.join(", ")
        ))
    } else {
        None
    };

    let concern = (!missing.is_empty())
        .then(|| format!("Missing required features: {}", missing.join(", ")));

    Evaluation {
        points,
        reason,
        concern,
    }
}

/// Proportional credit for desired features
pub fn evaluate_desired_features(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> Evaluation {
    let desired = unique_features(&profile.desired_features);
    if desired.is_empty() {
        return Evaluation::not_applicable();
    }

    let available = feature_set(&property.features);
    let present: Vec<&str> = desired
        .iter()
        .copied()
        .filter(|feature| available.contains(&normalize(feature)))
        .collect();

    if present.is_empty() {
        return Evaluation::not_applicable();
    }

    Evaluation::awarded(
        weights.desired_features * present.len() as f64 / desired.len() as f64,
        format!(
            "{} of {} desired features present: {}",
            present.len(),
            desired.len(),
            present.join(", ")
        ),
    )
}

/// All-or-nothing range check shared by size and room counts
fn range_criterion<T>(
    label: &str,
    unit: &str,
    value: Option<T>,
    min: Option<T>,
    max: Option<T>,
    points: f64,
) -> Evaluation
where
    T: PartialOrd + Display + Copy,
{
    let Some(value) = value else {
        return Evaluation::not_applicable();
    };
    if min.is_none() && max.is_none() {
        return Evaluation::not_applicable();
    }

    if within_bounds(value, min, max) {
        Evaluation::awarded(
            points,
            format!("{} {}{} is {}", label, value, unit, describe_range(min, max, unit)),
        )
    } else {
        Evaluation::not_applicable()
    }
}

#[inline]
pub fn within_bounds<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn describe_range<T: Display>(min: Option<T>, max: Option<T>, unit: &str) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("within {}{} to {}{}", min, unit, max, unit),
        (Some(min), None) => format!("at least {}{}", min, unit),
        (None, Some(max)) => format!("at most {}{}", max, unit),
        (None, None) => "unconstrained".to_string(),
    }
}

fn deviation_percent(value: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        (value - bound).abs() / bound * 100.0
    } else {
        0.0
    }
}

/// Case-insensitive, whitespace-trimmed comparison key
#[inline]
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn feature_set(features: &[String]) -> HashSet<String> {
    features
        .iter()
        .map(|f| normalize(f))
        .filter(|f| !f.is_empty())
        .collect()
}

/// Deduplicates by normalized key, keeping the first spelling and order
fn unique_features(features: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    features
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty() && seen.insert(f.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PropertyStatus, PropertyType};

    fn create_property(price: Option<f64>, features: &[&str]) -> Property {
        Property {
            id: "property-1".to_string(),
            property_type: PropertyType::Office,
            status: PropertyStatus::Active,
            price,
            size_m2: Some(400.0),
            bedrooms: None,
            bathrooms: Some(2),
            city: "Berlin".to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
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
            min_size: None,
            max_size: None,
            min_bedrooms: None,
            max_bedrooms: None,
            min_bathrooms: None,
            max_bathrooms: None,
            required_features: vec![],
            desired_features: vec![],
            is_active: true,
        }
    }

    #[test]
    fn test_type_gate() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &[]);
        let mut profile = create_profile();

        let pass = evaluate_property_type(&property, &profile, &weights).unwrap();
        assert_eq!(pass.points, 15.0);

        profile.property_types = vec![PropertyType::Retail, PropertyType::Hotel];
        assert!(evaluate_property_type(&property, &profile, &weights).is_none());
    }

    #[test]
    fn test_location_gate_ignores_case() {
        let weights = ScoringWeights::default();
        let mut property = create_property(None, &[]);
        property.city = "  berlin ".to_string();
        let profile = create_profile();

        let pass = evaluate_location(&property, &profile, &weights).unwrap();
        assert_eq!(pass.points, 20.0);
        assert_eq!(pass.reason.as_deref(), Some("Located in berlin"));
    }

    #[test]
    fn test_empty_city_fails_location_gate() {
        let weights = ScoringWeights::default();
        let mut property = create_property(None, &[]);
        property.city = String::new();

        assert!(evaluate_location(&property, &create_profile(), &weights).is_none());
    }

    #[test]
    fn test_price_in_range() {
        let weights = ScoringWeights::default();
        let eval = evaluate_price(&create_property(Some(2_000_000.0), &[]), &create_profile(), &weights);

        assert_eq!(eval.points, 15.0);
        assert!(eval.reason.is_some());
        assert!(eval.concern.is_none());
    }

    #[test]
    fn test_price_tolerance_band() {
        let weights = ScoringWeights::default();
        let property = create_property(Some(2_000_000.0), &[]);
        let mut profile = create_profile();

        profile.max_price = Some(1_900_000.0);
        profile.min_price = None;
        let near = evaluate_price(&property, &profile, &weights);
        assert_eq!(near.points, 5.0);
        assert!(near.reason.is_none());
        assert_eq!(
            near.concern.as_deref(),
            Some("Price 2000000 is 5.3% above the maximum budget of 1900000")
        );

        profile.max_price = Some(1_800_000.0);
        let far = evaluate_price(&property, &profile, &weights);
        assert_eq!(far, Evaluation::not_applicable());
    }

    #[test]
    fn test_price_below_minimum_within_tolerance() {
        let weights = ScoringWeights::default();
        let property = create_property(Some(1_400_000.0), &[]);
        let eval = evaluate_price(&property, &create_profile(), &weights);

        assert_eq!(eval.points, 5.0);
        assert!(eval.concern.unwrap().contains("below the minimum"));
    }

    #[test]
    fn test_price_unlisted_or_unconstrained() {
        let weights = ScoringWeights::default();
        let unlisted = evaluate_price(&create_property(None, &[]), &create_profile(), &weights);
        assert_eq!(unlisted, Evaluation::not_applicable());

        let mut profile = create_profile();
        profile.min_price = None;
        profile.max_price = None;
        let open = evaluate_price(&create_property(Some(1.0), &[]), &profile, &weights);
        assert_eq!(open, Evaluation::not_applicable());
    }

    #[test]
    fn test_half_open_size_bound() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &[]);
        let mut profile = create_profile();
        profile.min_size = Some(350.0);

        let eval = evaluate_size(&property, &profile, &weights);
        assert_eq!(eval.points, 10.0);
        assert_eq!(eval.reason.as_deref(), Some("Size 400 m² is at least 350 m²"));

        profile.min_size = Some(450.0);
        assert_eq!(evaluate_size(&property, &profile, &weights).points, 0.0);
    }

    #[test]
    fn test_room_counts() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &[]);
        let mut profile = create_profile();
        profile.min_bathrooms = Some(1);
        profile.max_bathrooms = Some(3);
        profile.min_bedrooms = Some(2);

        assert_eq!(evaluate_bathrooms(&property, &profile, &weights).points, 5.0);
        // property lists no bedrooms
        assert_eq!(evaluate_bedrooms(&property, &profile, &weights), Evaluation::not_applicable());
    }

    #[test]
    fn test_required_features_partial() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &["Parking", "elevator"]);
        let mut profile = create_profile();
        profile.required_features = vec!["parking".into(), "Elevator".into(), "sprinkler".into()];

        let eval = evaluate_required_features(&property, &profile, &weights);
        assert!((eval.points - 10.0).abs() < 1e-9);
        assert_eq!(
            eval.reason.as_deref(),
            Some("2 of 3 required features present: parking, Elevator")
        );
        assert_eq!(eval.concern.as_deref(), Some("Missing required features: sprinkler"));
    }

    #[test]
    fn test_required_features_duplicates_count_once() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &["parking"]);
        let mut profile = create_profile();
        profile.required_features = vec!["parking".into(), " PARKING".into()];

        let eval = evaluate_required_features(&property, &profile, &weights);
        assert_eq!(eval.points, 15.0);
        assert!(eval.concern.is_none());
    }

    #[test]
    fn test_empty_feature_sets_not_applicable() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &["parking"]);
        let profile = create_profile();

        assert_eq!(evaluate_required_features(&property, &profile, &weights), Evaluation::not_applicable());
        assert_eq!(evaluate_desired_features(&property, &profile, &weights), Evaluation::not_applicable());
    }

    #[test]
    fn test_desired_features_proportional() {
        let weights = ScoringWeights::default();
        let property = create_property(None, &["elevator"]);
        let mut profile = create_profile();
        profile.desired_features = vec!["elevator".into(), "cafeteria".into()];

        let eval = evaluate_desired_features(&property, &profile, &weights);
        assert_eq!(eval.points, 5.0);
        assert!(eval.concern.is_none());
    }

    #[test]
    fn test_within_bounds() {
        assert!(within_bounds(5, Some(1), Some(5)));
        assert!(within_bounds(5, None, None));
        assert!(!within_bounds(6, None, Some(5)));
        assert!(!within_bounds(0, Some(1), None));
    }

    #[test]
    fn test_criteria_max_points_match_weights() {
        let weights = ScoringWeights::default();
        let scored: f64 = SCORED_CRITERIA.iter().map(|c| c.max_points(&weights)).sum();
        assert_eq!(scored + weights.property_type + weights.location, weights.max_total());
    }
}
