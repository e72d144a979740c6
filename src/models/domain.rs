use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

/// Property category used by the type gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Office,
    Retail,
    Industrial,
    Logistics,
    Residential,
    Mixed,
    Hotel,
    Healthcare,
    Land,
    Other,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::Office => "office",
            PropertyType::Retail => "retail",
            PropertyType::Industrial => "industrial",
            PropertyType::Logistics => "logistics",
            PropertyType::Residential => "residential",
            PropertyType::Mixed => "mixed",
            PropertyType::Hotel => "hotel",
            PropertyType::Healthcare => "healthcare",
            PropertyType::Land => "land",
            PropertyType::Other => "other",
        };
        f.write_str(name)
    }
}

/// Listing status; only active listings are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Active,
    Inactive,
}

/// Property listing as stored in the CRM
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Property {
    #[validate(length(min = 1))]
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    #[serde(rename = "propertyType")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "sizeM2", default)]
    pub size_m2: Option<f64>,
    #[serde(default)]
    pub bedrooms: Option<u32>,
    #[serde(default)]
    pub bathrooms: Option<u32>,
    pub city: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(rename = "$updatedAt", alias = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    pub fn is_active(&self) -> bool {
        self.status == PropertyStatus::Active
    }
}

/// A client's purchase criteria
///
/// Every bound is optional on its own; a missing bound removes that side of
/// the range check.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_profile_bounds"))]
pub struct PurchaseProfile {
    #[validate(length(min = 1))]
    #[serde(rename = "$id", alias = "id")]
    pub id: String,
    #[validate(length(min = 1))]
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[validate(length(min = 1))]
    #[serde(rename = "propertyTypes")]
    pub property_types: Vec<PropertyType>,
    #[validate(length(min = 1))]
    pub locations: Vec<String>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "minPrice", default)]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxPrice", default)]
    pub max_price: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "minSize", default)]
    pub min_size: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxSize", default)]
    pub max_size: Option<f64>,
    #[serde(rename = "minBedrooms", default)]
    pub min_bedrooms: Option<u32>,
    #[serde(rename = "maxBedrooms", default)]
    pub max_bedrooms: Option<u32>,
    #[serde(rename = "minBathrooms", default)]
    pub min_bathrooms: Option<u32>,
    #[serde(rename = "maxBathrooms", default)]
    pub max_bathrooms: Option<u32>,
    #[serde(rename = "requiredFeatures", default)]
    pub required_features: Vec<String>,
    #[serde(rename = "desiredFeatures", default)]
    pub desired_features: Vec<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool { true }

fn validate_profile_bounds(profile: &PurchaseProfile) -> Result<(), ValidationError> {
    check_bounds("price", profile.min_price, profile.max_price)?;
    check_bounds("size", profile.min_size, profile.max_size)?;
    check_bounds("bedrooms", profile.min_bedrooms, profile.max_bedrooms)?;
    check_bounds("bathrooms", profile.min_bathrooms, profile.max_bathrooms)
}

fn check_bounds<T>(name: &'static str, min: Option<T>, max: Option<T>) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Display + Copy,
{
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            let mut error = ValidationError::new("inverted_bounds");
            error.message = Some(Cow::from(format!(
                "minimum {} ({}) exceeds maximum ({})",
                name, min, max
            )));
            Err(error)
        }
        _ => Ok(()),
    }
}

/// Outcome of scoring one (property, profile) pair
///
/// Produced fresh on every run; persistence happens downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub score: u8,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// Which record kind a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Property,
    Profile,
}

/// A record that was skipped during a batch instead of aborting it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchWarning {
    pub entity: EntityKind,
    #[serde(rename = "entityId")]
    pub entity_id: String,
    pub message: String,
}

/// CRM-managed lifecycle of a persisted match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
    Contacted,
}
