//! Application state

use shared::error::AppError;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::{JwtConfig, JwtService};
use crate::config::Config;
use crate::db::DbService;
use crate::live::{EventPublisher, LiveHub};
use crate::orders::OrderLifecycle;
use crate::settlement::SettlementService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    /// Fan-out hub; WS connections subscribe here
    pub live: LiveHub,
    pub lifecycle: OrderLifecycle,
    pub settlement: SettlementService,
}

impl AppState {
    /// Open the configured database and wire the engines to a live hub
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::with_pool(config, db.pool))
    }

    /// Wire the engines over an existing pool, publishing to a fresh hub
    pub fn with_pool(config: &Config, pool: SqlitePool) -> Self {
        let live = LiveHub::new(config.live_channel_capacity);
        let publisher: Arc<dyn EventPublisher> = Arc::new(live.clone());
        Self::with_publisher(config, pool, live, publisher)
    }

    /// Wire the engines with an explicit publisher (tests inject a recorder)
    pub fn with_publisher(
        config: &Config,
        pool: SqlitePool,
        live: LiveHub,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(JwtConfig {
            secret: config.jwt_secret.clone(),
            expiration_minutes: config.jwt_expiration_minutes,
        }));

        Self {
            lifecycle: OrderLifecycle::new(pool.clone(), publisher.clone()),
            settlement: SettlementService::new(
                pool.clone(),
                publisher,
                config.default_settlement_rules(),
            ),
            pool,
            jwt_service,
            live,
        }
    }
}
