/// Configuration management for Content Service
///
/// Loaded from environment variables (optionally seeded from a `.env` file by
/// the binary).
use serde::{Deserialize, Serialize};

const MIN_PRODUCTION_SECRET_LEN: usize = 32;
const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Token validation settings
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, test, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Emit JSON logs instead of the human-readable format
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; the post cache is disabled when unset
    pub url: Option<String>,
    /// TTL of cached posts
    pub post_ttl_secs: u64,
}

/// JWT validation settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .finish()
    }
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let is_production = app_env.eq_ignore_ascii_case("production");

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("CONTENT_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("CONTENT_SERVICE_PORT", 3000)?,
                json_logs: std::env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/blog".to_string()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            cache: CacheConfig {
                url: std::env::var("REDIS_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
                post_ttl_secs: parse_env_or_default("POST_CACHE_TTL_SECS", 300)?,
            },
            auth: {
                let jwt_secret = match std::env::var("JWT_SECRET") {
                    Ok(value) => value,
                    Err(_) if is_production => {
                        return Err("JWT_SECRET must be set in production".to_string())
                    }
                    Err(_) => DEVELOPMENT_JWT_SECRET.to_string(),
                };

                if is_production && jwt_secret.len() < MIN_PRODUCTION_SECRET_LEN {
                    return Err(format!(
                        "JWT_SECRET must be at least {} bytes in production",
                        MIN_PRODUCTION_SECRET_LEN
                    ));
                }

                AuthConfig {
                    jwt_secret,
                    jwt_issuer: std::env::var("JWT_ISSUER")
                        .unwrap_or_else(|_| "blog-api".to_string()),
                    jwt_audience: std::env::var("JWT_AUDIENCE")
                        .unwrap_or_else(|_| "blog-clients".to_string()),
                }
            },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
