//! JWT Extractor
//!
//! Validates the bearer token of a request and yields the `CurrentUser`
//! whose tenant scopes every query of the handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::{AppError, ErrorCode};

use super::jwt::{CurrentUser, JwtError, JwtService};
use crate::security_log;
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::not_authenticated());
            }
        };

        let user = authenticate(&state.jwt_service, token).inspect_err(|_| {
            security_log!("WARN", "auth_failed", uri = format!("{:?}", parts.uri));
        })?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Validate a raw token into a user (shared by the REST extractor and the WS handshake)
pub fn authenticate(jwt: &JwtService, token: &str) -> Result<CurrentUser, AppError> {
    let claims = jwt.validate_token(token).map_err(|e| {
        tracing::debug!(target: "security", error = %e, "Token rejected");
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;
    CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))
}

impl CurrentUser {
    /// Reject non-admin callers
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            security_log!(
                "WARN",
                "admin_required",
                user_id = self.id,
                tenant_id = self.tenant_id.as_str()
            );
            Err(AppError::new(ErrorCode::AdminRequired))
        }
    }
}
