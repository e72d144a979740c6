use crate::core::MatchBatch;
use crate::services::postgres::{PostgresClient, PostgresError};
use std::sync::Arc;

/// The fixed entity a batch was anchored on
#[derive(Debug, Clone)]
pub enum MatchAnchor {
    Property(String),
    Client(String),
}

/// What the emitter did with a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitReport {
    pub persisted: usize,
    pub new_matches: usize,
    pub notification: Option<String>,
}

/// Hands scored batches to persistence and builds the notification text
///
/// The matching core never calls this; request handlers do, after scoring.
#[derive(Clone)]
pub struct MatchEmitter {
    postgres: Arc<PostgresClient>,
}

impl MatchEmitter {
    pub fn new(postgres: Arc<PostgresClient>) -> Self {
        Self { postgres }
    }

    /// Persist every surviving match and summarize the new ones
    ///
    /// Stops at the first database error; rows written before it stay.
    pub async fn emit(&self, anchor: &MatchAnchor, batch: &MatchBatch) -> Result<EmitReport, PostgresError> {
        for warning in &batch.warnings {
            tracing::warn!(
                "{:?}: skipped {:?} {}: {}",
                anchor,
                warning.entity,
                warning.entity_id,
                warning.message
            );
        }

        let mut report = EmitReport::default();

        for result in &batch.matches {
            if self.postgres.upsert_match(result).await? {
                report.new_matches += 1;
            }
            report.persisted += 1;
        }

        report.notification = notification_message(anchor, report.new_matches);

        if let Some(message) = &report.notification {
            tracing::info!("{}", message);
        }

        Ok(report)
    }
}

/// Summary shown in the CRM, e.g. "3 new matches found for client X"
pub fn notification_message(anchor: &MatchAnchor, new_matches: usize) -> Option<String> {
    if new_matches == 0 {
        return None;
    }

    let noun = if new_matches == 1 { "match" } else { "matches" };
    let message = match anchor {
        MatchAnchor::Property(id) => format!("{} new {} found for property {}", new_matches, noun, id),
        MatchAnchor::Client(id) => format!("{} new {} found for client {}", new_matches, noun, id),
    };

    Some(message)
}
