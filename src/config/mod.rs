use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Which persistence backend the service runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!("Unknown STORAGE_BACKEND: {}", other)),
        }
    }
}

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration: i64,
    pub bcrypt_cost: u32,
    pub request_timeout: u64,
    pub idempotency_ttl: u64,
    pub log_format: LogFormat,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let storage_backend: StorageBackend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL environment variable is required when STORAGE_BACKEND=postgres"
            ));
        }

        let config = Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            storage_backend,
            database_url,
            max_connections: env::var("MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiration: env::var("JWT_EXPIRATION_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| bcrypt::DEFAULT_COST.to_string())
                .parse()
                .unwrap_or(bcrypt::DEFAULT_COST),
            request_timeout: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            idempotency_ttl: env::var("IDEMPOTENCY_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that are unsafe outside development
    pub fn validate(&self) -> Result<()> {
        if self.is_production() && self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 bytes in production"
            ));
        }
        if self.is_production() && self.storage_backend == StorageBackend::Memory {
            return Err(anyhow::anyhow!(
                "STORAGE_BACKEND=memory is not allowed in production"
            ));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(anyhow::anyhow!("BCRYPT_COST must be between 4 and 31"));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Configuration used by tests and local tooling: memory storage, cheap hashing
    pub fn for_tests() -> Self {
        Config {
            environment: "test".to_string(),
            port: 0,
            storage_backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 1,
            jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            jwt_expiration: 3600,
            bcrypt_cost: 4,
            request_timeout: 30,
            idempotency_ttl: 3600,
            log_format: LogFormat::Pretty,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
