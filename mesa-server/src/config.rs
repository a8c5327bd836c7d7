//! Server configuration

use shared::models::SettlementRules;

use crate::auth::jwt::MIN_SECRET_LEN;
use crate::live::DEFAULT_CHANNEL_CAPACITY;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded from the environment (after `.env`)
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite URL, e.g. `sqlite:mesa.db`
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for staff tokens
    pub jwt_secret: String,
    pub jwt_expiration_minutes: i64,
    pub log_level: String,
    /// Daily rolling log files are written here when the directory exists
    pub log_dir: Option<String>,
    /// Per-topic broadcast buffer
    pub live_channel_capacity: usize,
    /// Rates applied to tenants without stored settlement rules (percent)
    pub default_tax_rate: f64,
    pub default_service_charge_rate: f64,
}

impl Config {
    /// JWT secret: required and at least 32 chars outside development
    fn require_jwt_secret(environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var("JWT_SECRET") {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("JWT_SECRET must be set in {environment} environment").into());
                }
                "dev-JWT_SECRET-not-for-production-0000".to_string()
            }
        };
        if val.len() < MIN_SECRET_LEN && environment != "development" {
            return Err(format!("JWT_SECRET must be at least {MIN_SECRET_LEN} characters long").into());
        }
        Ok(val)
    }

    fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:mesa.db".into()),
            http_port: Self::parse_env("HTTP_PORT", 3000),
            jwt_secret: Self::require_jwt_secret(&environment)?,
            environment,
            jwt_expiration_minutes: Self::parse_env("JWT_EXPIRATION_MINUTES", 1440),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            live_channel_capacity: Self::parse_env("LIVE_CHANNEL_CAPACITY", DEFAULT_CHANNEL_CAPACITY),
            default_tax_rate: Self::parse_env("DEFAULT_TAX_RATE", 0.0),
            default_service_charge_rate: Self::parse_env("DEFAULT_SERVICE_CHARGE_RATE", 0.0),
        };

        if !config.default_tax_rate.is_finite()
            || config.default_tax_rate < 0.0
            || !config.default_service_charge_rate.is_finite()
            || config.default_service_charge_rate < 0.0
        {
            return Err("DEFAULT_TAX_RATE / DEFAULT_SERVICE_CHARGE_RATE must be non-negative".into());
        }
        Ok(config)
    }

    /// Configuration for tests: in-memory database, fixed secret
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt_secret: "test-secret-key-that-is-long-enough-1234".into(),
            jwt_expiration_minutes: 60,
            log_level: "debug".into(),
            log_dir: None,
            live_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            default_tax_rate: 0.0,
            default_service_charge_rate: 0.0,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Settlement rules for tenants that never stored their own
    pub fn default_settlement_rules(&self) -> SettlementRules {
        SettlementRules::new(self.default_tax_rate, self.default_service_charge_rate)
    }
}
