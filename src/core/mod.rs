// Core algorithm exports
pub mod candidates;
pub mod criteria;
pub mod matcher;
pub mod scoring;
pub mod validation;

pub use candidates::{active_profiles, active_properties, pairs_for_profiles, pairs_for_property, CandidatePair};
pub use criteria::{Criterion, Evaluation, Gate, GATES, SCORED_CRITERIA};
pub use matcher::{Matcher, MatchBatch, DEFAULT_MIN_SCORE, DEFAULT_PARALLEL_THRESHOLD};
pub use scoring::{calculate_match_score, ScoreBreakdown};
pub use validation::{validate_profile, validate_property, MatchError};
