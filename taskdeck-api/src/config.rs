/// Configuration management for the API server
///
/// Everything comes from environment variables; a `.env` file is loaded first
/// when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: enables HSTS (default: false)
/// - `RUN_MIGRATIONS`: apply pending migrations at startup (default: true)
/// - `SESSION_SECRET`: HS256 signing secret, at least 32 characters (required)
/// - `SESSION_TTL_HOURS`: session lifetime (default: 24)
/// - `RUST_LOG`: log filter (default: taskdeck_api=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for JSON log lines
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use taskdeck_shared::auth::session::DEFAULT_SESSION_TTL_HOURS;

/// Minimum length of `SESSION_SECRET`
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound for `SESSION_TTL_HOURS` (one year)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,

    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Session lifetime in hours
    pub ttl_hours: i64,
}

impl SessionConfig {
    /// Session lifetime; falls back to the default for out-of-range values,
    /// which [`Config::validate`] rejects
    pub fn ttl(&self) -> Duration {
        Duration::try_hours(self.ttl_hours)
            .filter(|_| (1..=MAX_SESSION_TTL_HOURS).contains(&self.ttl_hours))
            .unwrap_or_else(|| Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value '{}': {}", name, raw, e)),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing, a value does not parse, or
    /// the session secret is too short.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var::<u16>("API_PORT", 8080)?;
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()));
        let production = parse_var::<bool>("PRODUCTION", false)?;
        let run_migrations = parse_var::<bool>("RUN_MIGRATIONS", true)?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = parse_var::<u32>("DATABASE_MAX_CONNECTIONS", 10)?;

        let secret = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        let ttl_hours = parse_var::<i64>("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?;

        let config = Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
                run_migrations,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig { secret, ttl_hours },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that `from_env` cannot express through parsing
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("SESSION_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session.ttl_hours) {
            anyhow::bail!("SESSION_TTL_HOURS must be between 1 and {}", MAX_SESSION_TTL_HOURS);
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(())
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether CORS should allow any origin
    pub fn cors_permissive(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
