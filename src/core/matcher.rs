use std::cmp::Ordering;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use crate::models::{MatchResult, MatchWarning, Property, PurchaseProfile, ScoringWeights, WeightsError};
use crate::core::{
    candidates::{active_profiles, active_properties, pairs_for_profiles, pairs_for_property, CandidatePair},
    scoring::calculate_match_score,
    validation::{partition_valid, validate_profile, validate_property, MatchError},
};

/// Default minimum score for a pair to be surfaced
pub const DEFAULT_MIN_SCORE: u8 = 60;

/// Pair count from which scoring runs on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Result of one batch run
#[derive(Debug, Clone, Default)]
pub struct MatchBatch {
    pub matches: Vec<MatchResult>,
    pub warnings: Vec<MatchWarning>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Candidate generation (active records only)
/// 2. Validation; invalid records become warnings
/// 3. Scoring, in parallel for large candidate sets
/// 4. Threshold filter and ranking
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    min_score: u8,
    parallel_threshold: usize,
}

impl Matcher {
    /// Build a matcher after running the weight table self-check
    pub fn new(weights: ScoringWeights) -> Result<Self, WeightsError> {
        weights.validate()?;

        let total = weights.max_total();
        if total < crate::models::SCORE_SCALE {
            tracing::warn!("Weight table sums to {}, scores will never reach 100", total);
        }

        Ok(Self {
            weights,
            min_score: DEFAULT_MIN_SCORE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_score: DEFAULT_MIN_SCORE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_min_score(mut self, min_score: u8) -> Self {
        self.min_score = min_score.min(100);
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Score a single pair, rejecting invalid input
    pub fn score(
        &self,
        property: &Property,
        profile: &PurchaseProfile,
    ) -> Result<MatchResult, MatchError> {
        validate_property(property)?;
        validate_profile(profile)?;

        Ok(self.score_pair(&CandidatePair { property, profile }))
    }

    /// Find matches for a listing among all active purchase profiles
    ///
    /// # Arguments
    /// * `property` - The listing to match
    /// * `profiles` - All purchase profiles; inactive ones are ignored
    ///
    /// # Returns
    /// MatchBatch with results at or above the threshold, best first
    pub fn match_property(&self, property: &Property, profiles: &[PurchaseProfile]) -> MatchBatch {
        let (candidates, mut warnings) = partition_valid(active_profiles(profiles), validate_profile);
        let total_candidates = candidates.len() + warnings.len();

        if let Err(e) = validate_property(property) {
            tracing::warn!("Skipping batch for invalid property: {}", e);
            warnings.insert(0, e.to_warning());
            return MatchBatch {
                matches: vec![],
                warnings,
                total_candidates,
            };
        }

        let pairs = pairs_for_property(property, candidates);
        let matches = self.rank(&pairs);

        tracing::debug!(
            "Property {}: {} matches from {} candidate profiles",
            property.id,
            matches.len(),
            total_candidates
        );

        MatchBatch {
            matches,
            warnings,
            total_candidates,
        }
    }

    /// Find matches for a set of purchase profiles among all active listings
    ///
    /// Typically the active profiles of one client.
    pub fn match_client_profiles(
        &self,
        profiles: &[PurchaseProfile],
        properties: &[Property],
    ) -> MatchBatch {
        let (valid_profiles, mut warnings) = partition_valid(active_profiles(profiles), validate_profile);
        let (valid_properties, property_warnings) =
            partition_valid(active_properties(properties), validate_property);
        warnings.extend(property_warnings);

        let total_candidates = valid_properties.len();
        let pairs = pairs_for_profiles(valid_profiles, valid_properties);
        let matches = self.rank(&pairs);

        tracing::debug!(
            "{} profiles: {} matches from {} pairs",
            profiles.len(),
            matches.len(),
            pairs.len()
        );

        MatchBatch {
            matches,
            warnings,
            total_candidates,
        }
    }

    /// Score, filter by threshold and order the surviving pairs
    ///
    /// Ordering: score descending, then most recently updated property,
    /// then input order.
    fn rank(&self, pairs: &[CandidatePair<'_>]) -> Vec<MatchResult> {
        let scored: Vec<(Option<DateTime<Utc>>, MatchResult)> = if pairs.len() >= self.parallel_threshold {
            pairs
                .par_iter()
                .map(|pair| (pair.property.updated_at, self.score_pair(pair)))
                .collect()
        } else {
            pairs
                .iter()
                .map(|pair| (pair.property.updated_at, self.score_pair(pair)))
                .collect()
        };

        let mut surviving: Vec<_> = scored
            .into_iter()
            .filter(|(_, result)| result.score >= self.min_score)
            .collect();

        surviving.sort_by(|(a_updated, a), (b_updated, b)| {
            b.score
                .cmp(&a.score)
                .then_with(|| compare_recency(a_updated, b_updated))
        });

        surviving.into_iter().map(|(_, result)| result).collect()
    }

    fn score_pair(&self, pair: &CandidatePair<'_>) -> MatchResult {
        let breakdown = calculate_match_score(pair.property, pair.profile, &self.weights);

        MatchResult {
            profile_id: pair.profile.id.clone(),
            property_id: pair.property.id.clone(),
            client_id: pair.profile.client_id.clone(),
            score: breakdown.score,
            reasons: breakdown.reasons,
            concerns: breakdown.concerns,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

/// Newer first; missing timestamps sort last
fn compare_recency(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
