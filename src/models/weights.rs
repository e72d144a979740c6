use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound of the match score scale
pub const SCORE_SCALE: f64 = 100.0;

/// Errors raised by the weight table self-check
#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight `{0}` must be a finite, non-negative number")]
    InvalidWeight(&'static str),

    #[error("maximum weights sum to {0}, which exceeds the score scale of 100")]
    ExceedsScale(f64),

    #[error("partial price credit {partial} exceeds the price weight {price}")]
    PartialAbovePrice { partial: f64, price: f64 },

    #[error("price tolerance {0} must be in [0, 1)")]
    InvalidTolerance(f64),
}

/// Scoring weights
///
/// Each field is the maximum number of points its criterion can award.
/// `price_partial` is awarded when the price misses the range but stays
/// within `price_tolerance` (a fraction) of the nearer bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub property_type: f64,
    pub location: f64,
    pub price: f64,
    pub price_partial: f64,
    pub price_tolerance: f64,
    pub size: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub required_features: f64,
    pub desired_features: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            property_type: 15.0,
            location: 20.0,
            price: 15.0,
            price_partial: 5.0,
            price_tolerance: 0.10,
            size: 10.0,
            bedrooms: 10.0,
            bathrooms: 5.0,
            required_features: 15.0,
            desired_features: 10.0,
        }
    }
}

impl ScoringWeights {
    /// Sum of every criterion's maximum points
    pub fn max_total(&self) -> f64 {
        self.property_type
            + self.location
            + self.price
            + self.size
            + self.bedrooms
            + self.bathrooms
            + self.required_features
            + self.desired_features
    }

    /// Configuration self-check, run once when the matcher is built
    pub fn validate(&self) -> Result<(), WeightsError> {
        let named = [
            ("property_type", self.property_type),
            ("location", self.location),
            ("price", self.price),
            ("price_partial", self.price_partial),
            ("size", self.size),
            ("bedrooms", self.bedrooms),
            ("bathrooms", self.bathrooms),
            ("required_features", self.required_features),
            ("desired_features", self.desired_features),
        ];

        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::InvalidWeight(name));
            }
        }

        if !(0.0..1.0).contains(&self.price_tolerance) {
            return Err(WeightsError::InvalidTolerance(self.price_tolerance));
        }

        if self.price_partial > self.price {
            return Err(WeightsError::PartialAbovePrice {
                partial: self.price_partial,
                price: self.price,
            });
        }

        let total = self.max_total();
        if total > SCORE_SCALE + f64::EPSILON {
            return Err(WeightsError::ExceedsScale(total));
        }

        Ok(())
    }
}
