use crate::models::{Property, PurchaseProfile};

/// One property/profile pair handed to the scorer
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub property: &'a Property,
    pub profile: &'a PurchaseProfile,
}

/// Profiles eligible for matching; inactive ones are never candidates
pub fn active_profiles<'a, I>(profiles: I) -> impl Iterator<Item = &'a PurchaseProfile>
where
    I: IntoIterator<Item = &'a PurchaseProfile>,
{
    profiles.into_iter().filter(|profile| profile.is_active)
}

/// Listings eligible for matching
pub fn active_properties<'a, I>(properties: I) -> impl Iterator<Item = &'a Property>
where
    I: IntoIterator<Item = &'a Property>,
{
    properties.into_iter().filter(|property| property.is_active())
}

/// Anchor a property: pair it with every active profile
pub fn pairs_for_property<'a, I>(property: &'a Property, profiles: I) -> Vec<CandidatePair<'a>>
where
    I: IntoIterator<Item = &'a PurchaseProfile>,
{
    active_profiles(profiles)
        .map(|profile| CandidatePair { property, profile })
        .collect()
}

/// Anchor a set of profiles: pair each active profile with every active property
///
/// Pairs are grouped by profile, in input order.
pub fn pairs_for_profiles<'a, P, Q>(profiles: P, properties: Q) -> Vec<CandidatePair<'a>>
where
    P: IntoIterator<Item = &'a PurchaseProfile>,
    Q: IntoIterator<Item = &'a Property>,
{
    let properties: Vec<&Property> = active_properties(properties).collect();

    active_profiles(profiles)
        .flat_map(|profile| {
            properties
                .iter()
                .map(move |&property| CandidatePair { property, profile })
        })
        .collect()
}
