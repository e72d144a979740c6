use crate::models::{MatchResult, MatchStatus, StoredMatch};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Database mirror of `MatchStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum DbMatchStatus {
    Pending,
    Approved,
    Rejected,
    Contacted,
}

impl From<DbMatchStatus> for MatchStatus {
    fn from(value: DbMatchStatus) -> Self {
        match value {
            DbMatchStatus::Pending => MatchStatus::Pending,
            DbMatchStatus::Approved => MatchStatus::Approved,
            DbMatchStatus::Rejected => MatchStatus::Rejected,
            DbMatchStatus::Contacted => MatchStatus::Contacted,
        }
    }
}

/// PostgreSQL client for persisted match results
///
/// One row per (profile, property) pair. A new run supersedes the score,
/// reasons and concerns of an existing row; the status column belongs to the
/// CRM and is never overwritten here.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Insert or supersede the stored result for a pair
    ///
    /// Returns true when the pair had no stored match yet.
    pub async fn upsert_match(&self, result: &MatchResult) -> Result<bool, PostgresError> {
        let query = r#"
            INSERT INTO property_matches
                (id, profile_id, property_id, client_id, score, reasons, concerns, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NOW(), NOW())
            ON CONFLICT (profile_id, property_id)
            DO UPDATE SET
                client_id = EXCLUDED.client_id,
                score = EXCLUDED.score,
                reasons = EXCLUDED.reasons,
                concerns = EXCLUDED.concerns,
                updated_at = EXCLUDED.updated_at
            RETURNING (xmax = 0) AS inserted
        "#;

        let row = sqlx::query(query)
            .bind(uuid::Uuid::new_v4())
            .bind(&result.profile_id)
            .bind(&result.property_id)
            .bind(&result.client_id)
            .bind(i16::from(result.score))
            .bind(Json(&result.reasons))
            .bind(Json(&result.concerns))
            .fetch_one(&self.pool)
            .await?;

        let inserted: bool = row.get("inserted");

        tracing::debug!(
            "Stored match {} -> {} (score {}, new: {})",
            result.profile_id,
            result.property_id,
            result.score,
            inserted
        );

        Ok(inserted)
    }

    /// Stored matches for a client, best first
    pub async fn get_client_matches(
        &self,
        client_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredMatch>, PostgresError> {
        let query = r#"
            SELECT id, profile_id, property_id, client_id, score, reasons, concerns, status, updated_at
            FROM property_matches
            WHERE client_id = $1
            ORDER BY score DESC, updated_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(client_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let matches = rows
            .iter()
            .map(|row| {
                let score: i16 = row.get("score");
                let reasons: Json<Vec<String>> = row.get("reasons");
                let concerns: Json<Vec<String>> = row.get("concerns");
                let status: DbMatchStatus = row.get("status");

                StoredMatch {
                    id: row.get("id"),
                    result: MatchResult {
                        profile_id: row.get("profile_id"),
                        property_id: row.get("property_id"),
                        client_id: row.get("client_id"),
                        score: score.clamp(0, 100) as u8,
                        reasons: reasons.0,
                        concerns: concerns.0,
                    },
                    status: status.into(),
                    updated_at: row.get("updated_at"),
                }
            })
            .collect();

        Ok(matches)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
