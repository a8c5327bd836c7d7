//! mesa-server: multi-tenant restaurant order service
//!
//! # Modules
//!
//! - [`orders`]: order lifecycle engine, transition tables, kitchen view
//! - [`settlement`]: invoice computation and the single payment per order
//! - [`live`]: tenant-scoped real-time fan-out
//! - [`db`]: SQLite store (orders, items, payments, catalog and table lookups)
//! - [`auth`]: JWT staff tokens and the `CurrentUser` extractor
//! - [`api`]: HTTP + WebSocket routes
//!
//! # Data flow
//!
//! ```text
//! HTTP handler ─▶ OrderLifecycle / SettlementService ─▶ SQLite (one transaction)
//!                          │
//!                          └─▶ EventPublisher (LiveHub) ─▶ WS connections by role
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod live;
pub mod orders;
pub mod settlement;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;

/// Security event log, recorded under the `security` target
///
/// ```ignore
/// security_log!("WARN", "auth_failed", uri = format!("{:?}", parts.uri));
/// ```
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
