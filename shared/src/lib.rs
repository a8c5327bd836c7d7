//! Shared types for mesa
//!
//! Domain models, the unified error system, the real-time event catalog and
//! small utilities used by the server and its clients.

pub mod error;
pub mod models;
pub mod realtime;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use realtime::{Channel, LiveEnvelope, RealtimeEvent};
