use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::jwt::{Claims, JwtKeys};
use crate::db::AppState;
use crate::error::AuthError;

/// Extracts and verifies the bearer token, handing verified claims to the
/// handler. Rejection codes: 401 when no token is presented, 403 when the
/// token is invalid or expired, 500 when the codec itself is broken.
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        // Anything other than "Bearer <token>" counts as no token supplied.
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token)?;
        Ok(AuthUser(claims))
    }
}
