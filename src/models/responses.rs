use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, MatchStatus, MatchWarning};

/// Response for both batch matching endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<MatchResult>,
    pub warnings: Vec<MatchWarning>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub persisted: usize,
    pub notification: Option<String>,
    /// Set when matches were computed but could not be stored
    #[serde(rename = "persistError", skip_serializing_if = "Option::is_none")]
    pub persist_error: Option<String>,
}

/// Persisted match as read back from the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMatch {
    pub id: uuid::Uuid,
    #[serde(flatten)]
    pub result: MatchResult,
    pub status: MatchStatus,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
