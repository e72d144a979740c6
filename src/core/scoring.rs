use crate::models::{Property, PurchaseProfile, ScoringWeights, SCORE_SCALE};
use crate::core::criteria::{Evaluation, GATES, SCORED_CRITERIA};

/// Score and justification for one (property, profile) pair
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub reasons: Vec<String>,
    pub concerns: Vec<String>,
}

impl ScoreBreakdown {
    /// A failed must-match gate: zero score, nothing to explain
    pub fn rejected() -> Self {
        Self::default()
    }
}

/// Calculate a match score (0-100) for a property against a purchase profile
///
/// Scoring formula:
/// 1. Gates in order (property type, location); the first failure returns
///    a zero score with no reasons.
/// 2. Gate points plus every scored criterion in order: price, size,
///    bedrooms, bathrooms, required features, desired features.
/// 3. Sum clamped to [0, 100] and rounded to the nearest integer.
pub fn calculate_match_score(
    property: &Property,
    profile: &PurchaseProfile,
    weights: &ScoringWeights,
) -> ScoreBreakdown {
    let mut total = 0.0;
    let mut reasons = Vec::new();
    let mut concerns = Vec::new();

    let mut absorb = |evaluation: Evaluation| {
        total += evaluation.points;
        reasons.extend(evaluation.reason);
        concerns.extend(evaluation.concern);
    };

    for gate in GATES {
        match gate.evaluate(property, profile, weights) {
            Some(evaluation) => absorb(evaluation),
            None => return ScoreBreakdown::rejected(),
        }
    }

    for criterion in SCORED_CRITERIA {
        absorb(criterion.evaluate(property, profile, weights));
    }

    ScoreBreakdown {
        score: clamp_score(total),
        reasons,
        concerns,
    }
}

/// Clamp to the score scale; guards against mis-tuned weight tables
#[inline]
fn clamp_score(total: f64) -> u8 {
    if total.is_nan() {
        return 0;
    }
    total.clamp(0.0, SCORE_SCALE).round() as u8
}
