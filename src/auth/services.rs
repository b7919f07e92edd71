//! Core auth operations: registration, login and the current-user lookup.
//!
//! Validation runs before any I/O. Storage, hashing and token failures are
//! mapped to the [`AuthError`] taxonomy here; handlers only translate the
//! result to HTTP.

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;
use uuid::Uuid;

use crate::auth::dto::{LoginRequest, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password;
use crate::auth::repo_types::User;
use crate::db::AppState;
use crate::error::{AuthError, FieldError};

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Shape checks for registration. Collects one message per violated field.
pub(crate) fn validate_register(req: &RegisterRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let username_len = req.username.chars().count();
    if username_len < 3 {
        errors.push(FieldError {
            field: "username",
            message: "Username must be at least 3 characters long",
        });
    } else if username_len > 50 {
        errors.push(FieldError {
            field: "username",
            message: "Username must be less than 50 characters",
        });
    }
    if !is_valid_email(&req.email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email format",
        });
    }
    let password_len = req.password.chars().count();
    if password_len < 6 {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters long",
        });
    } else if password_len > 100 {
        errors.push(FieldError {
            field: "password",
            message: "Password must be less than 100 characters",
        });
    }
    errors
}

/// Shape checks for login.
pub(crate) fn validate_login(req: &LoginRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_valid_email(&req.email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email format",
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }
    errors
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Two concurrent registrations can both pass the existence check; the
/// unique constraint decides, and the loser must see a conflict rather than
/// a raw storage error.
fn map_insert_error(err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err) {
        warn!("registration lost insert race");
        AuthError::Conflict
    } else {
        AuthError::internal(err)
    }
}

/// Register a new user. Exactly one row is inserted on success, zero on any
/// failure path.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, AuthError> {
    let errors = validate_register(&req);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let existing = User::find_by_email_or_username(&state.db, &req.email, &req.username)
        .await
        .map_err(AuthError::internal)?;
    if existing.is_some() {
        warn!(email = %req.email, "registration conflict");
        return Err(AuthError::Conflict);
    }

    let password_hash = password::hash_password(&req.password)?;

    User::create(&state.db, &req.username, &req.email, &password_hash)
        .await
        .map_err(map_insert_error)
}

/// Verify credentials and issue a signed token.
///
/// An unknown email and a wrong password produce the same error, so the
/// response does not reveal which emails are registered.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<(String, User), AuthError> {
    let errors = validate_login(&req);
    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    let user = User::find_by_email(&state.db, &req.email)
        .await
        .map_err(AuthError::internal)?
        .ok_or_else(|| {
            warn!(email = %req.email, "login with unknown email");
            AuthError::InvalidCredentials
        })?;

    let ok = password::verify_password(&req.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(&user)?;
    Ok((token, user))
}

/// Re-fetch the record behind verified claims. Only the id from the token is
/// trusted; everything else comes from the store.
pub async fn current_user(state: &AppState, user_id: Uuid) -> Result<User, AuthError> {
    User::find_by_id(&state.db, user_id)
        .await
        .map_err(AuthError::internal)?
        .ok_or(AuthError::NotFound)
}


#[cfg(test)]
mod insert_error_tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct StubDbError {
        unique: bool,
    }

    impl std::fmt::Display for StubDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "stub database error")
        }
    }

    impl std::error::Error for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(StubDbError { unique }))
    }

    #[test]
    fn unique_violation_is_detected() {
        assert!(is_unique_violation(&db_error(true)));
        assert!(!is_unique_violation(&db_error(false)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn race_loser_maps_to_conflict_not_internal() {
        assert!(matches!(map_insert_error(db_error(true)), AuthError::Conflict));
        assert!(matches!(
            map_insert_error(db_error(false)),
            AuthError::Internal(_)
        ));
        assert!(matches!(
            map_insert_error(sqlx::Error::RowNotFound),
            AuthError::Internal(_)
        ));
    }
}
