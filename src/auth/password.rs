use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

/// Hash a plaintext password with bcrypt at cost 12.
///
/// The salt is generated per call and embedded in the output, so two hashes
/// of the same plaintext differ.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    hash(plain, DEFAULT_COST).map_err(|e| {
        error!(error = %e, "bcrypt hash error");
        anyhow::anyhow!(e)
    })
}

/// Check a plaintext password against a stored hash.
///
/// Returns `Ok(false)` on mismatch; an `Err` means the hash could not be
/// parsed or compared, which callers must treat as an internal failure, not
/// as bad credentials.
pub fn verify_password(plain: &str, hashed: &str) -> anyhow::Result<bool> {
    verify(plain, hashed).map_err(|e| {
        error!(error = %e, "bcrypt verify error");
        anyhow::anyhow!(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hashed = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hashed).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hashed = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hashed).expect("verify should not error"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-input").unwrap();
        let b = hash_password("same-input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn hash_never_equals_plaintext() {
        let hashed = hash_password("secret1").unwrap();
        assert!(!hashed.is_empty());
        assert_ne!(hashed, "secret1");
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
