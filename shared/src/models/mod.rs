//! Data models
//!
//! Shared between mesa-server and its clients (via API and real-time events).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes; tenant ids are opaque strings.

pub mod dining_table;
pub mod dish;
pub mod kitchen;
pub mod order;
pub mod payment;
pub mod role;
pub mod settlement;

// Re-exports
pub use dining_table::*;
pub use dish::*;
pub use kitchen::*;
pub use order::*;
pub use payment::*;
pub use role::*;
pub use settlement::*;
