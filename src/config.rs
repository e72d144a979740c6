use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::{DEFAULT_MIN_SCORE, DEFAULT_PARALLEL_THRESHOLD};
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub appwrite: AppwriteSettings,
    pub collection: CollectionSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppwriteSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionSettings {
    pub properties: String,
    pub purchase_profiles: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: u8,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_min_score() -> u8 { DEFAULT_MIN_SCORE }
fn default_parallel_threshold() -> usize { DEFAULT_PARALLEL_THRESHOLD }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    /// Missing keys fall back to the reference table
    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ESTATE__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ESTATE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("ESTATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ESTATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        self.scoring.weights
    }
}

/// Apply well-known environment overrides on top of the layered config
///
/// `DATABASE_URL` wins over `database.url`; Appwrite credentials are read
/// from `ESTATE_APPWRITE__*` so they can be injected as deployment secrets.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }

    let appwrite_overrides = [
        ("ESTATE_APPWRITE__ENDPOINT", "appwrite.endpoint"),
        ("ESTATE_APPWRITE__API_KEY", "appwrite.api_key"),
        ("ESTATE_APPWRITE__PROJECT_ID", "appwrite.project_id"),
        ("ESTATE_APPWRITE__DATABASE_ID", "appwrite.database_id"),
    ];

    for (var, key) in appwrite_overrides {
        if let Ok(value) = env::var(var) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ScoringSettings::default().weights;
        assert_eq!(weights, ScoringWeights::default());
        assert_eq!(weights.price_partial, 5.0);
        assert_eq!(weights.price_tolerance, 0.10);
    }

    #[test]
    fn test_default_matching() {
        let matching = MatchingSettings::default();
        assert_eq!(matching.min_score, 60);
        assert_eq!(matching.parallel_threshold, 256);
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("estate-match-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[appwrite]
endpoint = "https://appwrite.test/v1"
api_key = "key"
project_id = "project"
database_id = "crm"

[collection]
properties = "properties"
purchase_profiles = "purchase_profiles"

[database]
url = "postgres://localhost/estate"

[cache]
redis_url = "redis://127.0.0.1:6379"

[matching]
min_score = 70

[scoring.weights]
bathrooms = 0.0
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.matching.min_score, 70);
        assert_eq!(settings.matching.parallel_threshold, 256);
        assert_eq!(settings.scoring_weights().bathrooms, 0.0);
        assert_eq!(settings.scoring_weights().location, 20.0);
        assert_eq!(settings.logging.level, "info");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
