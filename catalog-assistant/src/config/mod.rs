pub mod entities;

use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

pub use entities::{EntityMappings, EntitySource, PRODUCTS_ENTITY};

const DEFAULT_MODEL_DEPLOYMENT: &str = "gpt-5-mini";
const DEFAULT_MODEL_API_VERSION: &str = "2024-10-21";
const DEFAULT_MODEL_TIMEOUT_SECONDS: u64 = 120;
const DEFAULT_ENTITY_SERVICE_URL: &str = "http://localhost:5000";
const DEFAULT_ENTITY_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_SEARCH_PROCEDURE: &str = "get_similar_items";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Browser origins allowed to call the API (local frontend dev servers).
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    pub entity_service: EntityServiceConfig,
    pub frontend_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(format!("Unknown ENVIRONMENT '{}', expected dev or prod", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connection_string: Secret<String>,
    /// Similarity procedure, optionally schema-qualified.
    pub search_procedure: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub endpoint: String,
    pub api_key: Secret<String>,
    pub deployment: String,
    pub api_version: String,
    pub timeout_seconds: u64,
}

/// The generated entity REST layer (Data API builder).
#[derive(Debug, Clone)]
pub struct EntityServiceConfig {
    pub url: String,
    pub timeout_seconds: u64,
    /// Path of the entity mapping document (`dab-config.json`).
    pub mapping_path: PathBuf,
}

impl AssistantConfig {
    /// Load `.env` files, the shared base config, then the service settings
    /// from the process environment. Missing required values are fatal.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::from_filename("../.env").ok();
        dotenvy::dotenv().ok();

        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Assemble the config from an arbitrary key lookup.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvLookup(lookup);

        let environment: Environment = env
            .or_default("ENVIRONMENT", "dev")
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let search_procedure = env.or_default("SEARCH_PROCEDURE", DEFAULT_SEARCH_PROCEDURE);
        if !is_sql_identifier(&search_procedure) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SEARCH_PROCEDURE '{}' is not a valid procedure name",
                search_procedure
            )));
        }

        Ok(AssistantConfig {
            common,
            environment,
            service_name: env.or_default("SERVICE_NAME", "catalog-assistant"),
            log_level: env.or_default("LOG_LEVEL", "info"),
            otlp_endpoint: env.get("OTLP_ENDPOINT"),
            database: DatabaseConfig {
                connection_string: Secret::new(env.required("SERVER_CONNECTION_STRING")?),
                search_procedure,
                max_connections: env.parsed("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            },
            model: ModelConfig {
                endpoint: env.required_any(&["AZURE_OPENAI_ENDPOINT", "MODEL_ENDPOINT_URL"])?,
                api_key: Secret::new(env.required("MODEL_API_KEY")?),
                deployment: env.or_default("MODEL_DEPLOYMENT", DEFAULT_MODEL_DEPLOYMENT),
                api_version: env.or_default("MODEL_API_VERSION", DEFAULT_MODEL_API_VERSION),
                timeout_seconds: env
                    .parsed("MODEL_TIMEOUT_SECONDS", DEFAULT_MODEL_TIMEOUT_SECONDS)?,
            },
            entity_service: EntityServiceConfig {
                url: env
                    .or_default("DAB_URL", DEFAULT_ENTITY_SERVICE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                timeout_seconds: env
                    .parsed("DAB_TIMEOUT_SECONDS", DEFAULT_ENTITY_TIMEOUT_SECONDS)?,
                mapping_path: PathBuf::from(env.or_default("DAB_CONFIG_PATH", "../dab-config.json")),
            },
            frontend_dir: PathBuf::from(env.or_default("FRONTEND_DIR", "../frontend")),
            allowed_origins: ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        })
    }
}

struct EnvLookup<F>(F);

impl<F> EnvLookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, AppError> {
        self.get(key).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        })
    }

    /// First key that is set wins.
    fn required_any(&self, keys: &[&str]) -> Result<String, AppError> {
        keys.iter().find_map(|key| self.get(key)).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                keys.join(" or ")
            ))
        })
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, AppError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
            }),
            None => Ok(default),
        }
    }
}

/// `name` or `schema.name`, each part a plain unquoted identifier.
fn is_sql_identifier(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
