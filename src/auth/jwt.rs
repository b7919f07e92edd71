use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::db::AppState;

/// Tokens are valid for 24 hours from issuance. There is no refresh or
/// revocation: rotating the secret invalidates all outstanding tokens.
pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed payload or expired token.
    #[error("invalid or expired token")]
    InvalidOrExpired,
    /// The signing secret is empty; a deployment defect.
    #[error("signing secret is not configured")]
    Misconfigured,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// JWT payload: the user's identity plus issuance and expiry timestamps.
/// Only `id` is trusted by downstream code; `/me` re-fetches the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// Holds the HS256 signing and verification keys derived from the
/// process-wide secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secret_present: bool,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt_secret)
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            secret_present: !secret.is_empty(),
        }
    }

    /// Sign a token for the given user with a 24-hour expiry.
    pub fn sign(&self, user: &User) -> Result<String, TokenError> {
        if !self.secret_present {
            return Err(TokenError::Misconfigured);
        }
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::hours(TOKEN_TTL_HOURS);
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Other(anyhow::Error::new(e)))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if !self.secret_present {
            return Err(TokenError::Misconfigured);
        }
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::InvalidOrExpired,
                _ => TokenError::Other(anyhow::Error::new(e)),
            },
        )?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            password_hash: "$2b$12$irrelevant".into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = JwtKeys::new("dev-secret");
        let user = sample_user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = JwtKeys::new("dev-secret");
        let other = JwtKeys::new("another-secret");
        let token = other.sign(&sample_user()).expect("sign");
        assert!(matches!(
            keys.verify(&token),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn verify_rejects_garbage_token() {
        let keys = JwtKeys::new("dev-secret");
        assert!(matches!(
            keys.verify("not.a.jwt"),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = JwtKeys::new("dev-secret");
        let user = sample_user();
        let now = OffsetDateTime::now_utc();
        // Well past the default validation leeway.
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            iat: (now - Duration::hours(25)).unix_timestamp() as usize,
            exp: (now - Duration::hours(1)).unix_timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert!(matches!(
            keys.verify(&token),
            Err(TokenError::InvalidOrExpired)
        ));
    }

    #[test]
    fn empty_secret_is_misconfigured() {
        let keys = JwtKeys::new("");
        assert!(matches!(
            keys.sign(&sample_user()),
            Err(TokenError::Misconfigured)
        ));
        assert!(matches!(
            keys.verify("whatever"),
            Err(TokenError::Misconfigured)
        ));
    }
}
