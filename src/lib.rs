//! Estate Match - property matching service for the commercial real-estate CRM
//!
//! Scores listings against clients' purchase profiles. Property type and
//! location act as hard gates; price, size, rooms and features add weighted
//! points on a 0-100 scale, each with a human-readable reason or concern.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, Matcher, MatchBatch, ScoreBreakdown};
pub use models::{
    FindMatchesResponse, MatchResult, MatchWarning, Property, PropertyType, PurchaseProfile, ScoringWeights,
};
