use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use estate_match::config::{LoggingSettings, Settings};
use estate_match::core::Matcher;
use estate_match::routes::{self, matches::AppState};
use estate_match::services::{AppwriteClient, AppwriteCollections, CacheManager, MatchEmitter, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Malformed request bodies, including unknown property types or statuses
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// LOG_LEVEL / LOG_FORMAT win over the `[logging]` section; RUST_LOG wins over both
fn init_tracing(logging: &LoggingSettings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(what: &str, e: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", what, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", what, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured from settings, so nothing is listening yet
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting estate-match service...");

    // Weights are checked once here so a bad table never serves a request
    let weights = settings.scoring_weights();
    let matcher = Matcher::new(weights)
        .map_err(|e| startup_error("Invalid scoring weights", e))?
        .with_min_score(settings.matching.min_score)
        .with_parallel_threshold(settings.matching.parallel_threshold);

    info!(
        "Matcher initialized (min score: {}, weights: {:?})",
        matcher.min_score(),
        matcher.weights()
    );

    let appwrite_collections = AppwriteCollections {
        properties: settings.collection.properties.clone(),
        purchase_profiles: settings.collection.purchase_profiles.clone(),
    };

    let appwrite = Arc::new(
        AppwriteClient::new(
            settings.appwrite.endpoint.clone(),
            settings.appwrite.api_key.clone(),
            settings.appwrite.project_id.clone(),
            settings.appwrite.database_id.clone(),
            appwrite_collections,
            Duration::from_secs(settings.appwrite.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| startup_error("Failed to build Appwrite client", e))?,
    );

    info!("Appwrite client initialized");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = Arc::new(
        CacheManager::new(&settings.cache.redis_url, l1_cache_size, cache_ttl)
            .await
            .map_err(|e| startup_error("Failed to connect to Redis", e))?,
    );

    info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);

    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            Some(db_max_conn),
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let app_state = AppState {
        appwrite,
        cache,
        emitter: MatchEmitter::new(postgres.clone()),
        postgres,
        matcher,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
