//! Authentication
//!
//! - [`jwt`]: token issuing / validation and the `CurrentUser` context
//! - [`extractor`]: axum extractor reading `Authorization: Bearer <jwt>`

pub mod extractor;
pub mod jwt;

pub use extractor::authenticate;
pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
