use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use validator::Validate;
use crate::core::{MatchBatch, Matcher};
use crate::models::{
    ErrorResponse, FindMatchesResponse, HealthResponse, MatchClientRequest, MatchPropertyRequest,
    MatchWarning, ScorePairRequest,
};
use crate::services::{
    AppwriteClient, AppwriteError, CacheKey, CacheManager, DocumentSet, MatchAnchor, MatchEmitter,
    PostgresClient,
};

/// Default number of stored matches returned by the listing endpoint
const DEFAULT_STORED_LIMIT: usize = 50;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub appwrite: Arc<AppwriteClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub emitter: MatchEmitter,
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::get().to(get_client_matches))
        .route("/matches/property", web::post().to(match_property))
        .route("/matches/client", web::post().to(match_client))
        .route("/matches/score", web::post().to(score_pair))
        .route("/cache/invalidate", web::post().to(invalidate_cache));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Match a listing against every active purchase profile
///
/// POST /api/v1/matches/property
///
/// Request body:
/// ```json
/// {
///   "propertyId": "string",
///   "minScore": 60,
///   "persist": true
/// }
/// ```
async fn match_property(
    state: web::Data<AppState>,
    req: web::Json<MatchPropertyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match_property request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    tracing::info!("Finding matches for property: {}", req.property_id);

    let property = match state.appwrite.get_property(&req.property_id).await {
        Ok(property) => property,
        Err(AppwriteError::NotFound(message)) => {
            return error_response(StatusCode::NOT_FOUND, "Property not found", message);
        }
        Err(e) => {
            tracing::error!("Failed to fetch property {}: {}", req.property_id, e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch property", e.to_string());
        }
    };

    let profiles = match load_cached(&state.cache, CacheKey::active_profiles(), || {
        state.appwrite.list_active_profiles()
    })
    .await
    {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("Failed to load purchase profiles: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to load purchase profiles", e.to_string());
        }
    };

    let matcher = threshold_matcher(&state.matcher, req.min_score);
    let DocumentSet { items, warnings } = profiles;
    let batch = match web::block(move || matcher.match_property(&property, &items)).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("Matching task failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Matching failed", e.to_string());
        }
    };

    let anchor = MatchAnchor::Property(req.property_id);
    respond_with_batch(&state, anchor, batch, warnings, req.persist).await
}

/// Match a client's active purchase profiles against every active listing
///
/// POST /api/v1/matches/client
///
/// Request body:
/// ```json
/// {
///   "clientId": "string",
///   "minScore": 60,
///   "persist": true
/// }
/// ```
async fn match_client(
    state: web::Data<AppState>,
    req: web::Json<MatchClientRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match_client request: {:?}", errors);
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    tracing::info!("Finding matches for client: {}", req.client_id);

    let profiles = match load_cached(&state.cache, CacheKey::client_profiles(&req.client_id), || {
        state.appwrite.list_client_profiles(&req.client_id)
    })
    .await
    {
        Ok(profiles) => profiles,
        Err(e) => {
            tracing::error!("Failed to load profiles for client {}: {}", req.client_id, e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to load purchase profiles", e.to_string());
        }
    };

    let properties = match load_cached(&state.cache, CacheKey::active_properties(), || {
        state.appwrite.list_active_properties()
    })
    .await
    {
        Ok(properties) => properties,
        Err(e) => {
            tracing::error!("Failed to load properties: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to load properties", e.to_string());
        }
    };

    let mut warnings = profiles.warnings;
    warnings.extend(properties.warnings);

    let matcher = threshold_matcher(&state.matcher, req.min_score);
    let (profile_items, property_items) = (profiles.items, properties.items);
    let batch = match web::block(move || matcher.match_client_profiles(&profile_items, &property_items)).await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("Matching task failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Matching failed", e.to_string());
        }
    };

    let anchor = MatchAnchor::Client(req.client_id);
    respond_with_batch(&state, anchor, batch, warnings, req.persist).await
}

/// Score one inline property/profile pair
///
/// POST /api/v1/matches/score
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScorePairRequest>,
) -> impl Responder {
    match state.matcher.score(&req.property, &req.profile) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, "Invalid input", e.to_string()),
    }
}

/// Stored matches for a client
///
/// GET /api/v1/matches?clientId={clientId}&limit={limit}
async fn get_client_matches(
    state: web::Data<AppState>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let client_id = match query.get("clientId") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing clientId parameter",
                "clientId query parameter is required".to_string(),
            );
        }
    };

    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(DEFAULT_STORED_LIMIT)
        .min(500);

    match state.postgres.get_client_matches(client_id, limit).await {
        Ok(matches) => HttpResponse::Ok().json(serde_json::json!({
            "clientId": client_id,
            "matches": matches,
            "count": matches.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to fetch stored matches for {}: {}", client_id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch matches", e.to_string())
        }
    }
}

/// Drop cached candidate sets after CRM edits
///
/// POST /api/v1/cache/invalidate
async fn invalidate_cache(state: web::Data<AppState>) -> impl Responder {
    match state.cache.invalidate_all().await {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({ "removed": removed })),
        Err(e) => {
            tracing::error!("Failed to invalidate cache: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to invalidate cache", e.to_string())
        }
    }
}

/// Persist (if asked) and build the response for a finished batch
async fn respond_with_batch(
    state: &AppState,
    anchor: MatchAnchor,
    batch: MatchBatch,
    load_warnings: Vec<MatchWarning>,
    persist: bool,
) -> HttpResponse {
    let mut warnings = load_warnings;
    warnings.extend(batch.warnings.iter().cloned());

    let mut response = FindMatchesResponse {
        matches: vec![],
        warnings,
        total_candidates: batch.total_candidates,
        persisted: 0,
        notification: None,
        persist_error: None,
    };

    if persist && !batch.matches.is_empty() {
        match state.emitter.emit(&anchor, &batch).await {
            Ok(report) => {
                response.persisted = report.persisted;
                response.notification = report.notification;
            }
            Err(e) => {
                tracing::error!("Failed to persist matches for {:?}: {}", anchor, e);
                response.persist_error = Some(e.to_string());
            }
        }
    }

    tracing::info!(
        "Returning {} matches for {:?} (from {} candidates, {} warnings)",
        batch.matches.len(),
        anchor,
        batch.total_candidates,
        response.warnings.len()
    );

    response.matches = batch.matches;
    HttpResponse::Ok().json(response)
}

/// Per-request threshold override on top of the configured matcher
fn threshold_matcher(matcher: &Matcher, min_score: Option<u8>) -> Matcher {
    match min_score {
        Some(min_score) => matcher.clone().with_min_score(min_score),
        None => matcher.clone(),
    }
}

/// Read a candidate set through the cache, falling back to Appwrite
///
/// Cache failures only degrade to a direct load.
async fn load_cached<T, F, Fut>(
    cache: &CacheManager,
    key: String,
    load: F,
) -> Result<DocumentSet<T>, AppwriteError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<DocumentSet<T>, AppwriteError>>,
{
    match cache.get::<DocumentSet<T>>(&key).await {
        Ok(Some(set)) => return Ok(set),
        Ok(None) => {}
        Err(e) => tracing::warn!("Cache read failed for {}, loading from Appwrite: {}", key, e),
    }

    let set = load().await?;

    if let Err(e) = cache.set(&key, &set).await {
        tracing::warn!("Failed to cache {}: {}", key, e);
    }

    Ok(set)
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_matcher_override() {
        let base = Matcher::with_default_weights();

        assert_eq!(threshold_matcher(&base, None).min_score(), 60);
        assert_eq!(threshold_matcher(&base, Some(85)).min_score(), 85);
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(StatusCode::NOT_FOUND, "Property not found", "p1".to_string());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
