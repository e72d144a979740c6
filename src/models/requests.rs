use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Property, PurchaseProfile};

/// Request to match one listing against every active purchase profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchPropertyRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "property_id", rename = "propertyId")]
    pub property_id: String,
    #[validate(range(max = 100))]
    #[serde(alias = "min_score", rename = "minScore", default)]
    pub min_score: Option<u8>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

/// Request to match a client's active profiles against every active listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchClientRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "client_id", rename = "clientId")]
    pub client_id: String,
    #[validate(range(max = 100))]
    #[serde(alias = "min_score", rename = "minScore", default)]
    pub min_score: Option<u8>,
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

/// Score a single inline pair without touching storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePairRequest {
    pub property: Property,
    pub profile: PurchaseProfile,
}
