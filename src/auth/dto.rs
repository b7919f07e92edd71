use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Full public projection of a user, returned by register and `/me`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Slim projection returned alongside a freshly issued token.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_profile_serializes_rfc3339_timestamp() {
        let profile = UserProfile {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
            created_at: time::macros::datetime!(2024-05-01 12:00:00 UTC),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn session_user_has_no_created_at() {
        let user = SessionUser {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "a@x.com".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("created_at").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
