// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod weights;

pub use domain::{Property, PropertyType, PropertyStatus, PurchaseProfile, MatchResult, MatchWarning, MatchStatus, EntityKind};
pub use requests::{MatchPropertyRequest, MatchClientRequest, ScorePairRequest};
pub use responses::{FindMatchesResponse, StoredMatch, HealthResponse, ErrorResponse};
pub use weights::{ScoringWeights, WeightsError, SCORE_SCALE};
