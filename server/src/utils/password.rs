use crate::error::{ApiError, ApiResult};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::OnceLock;

/// Hashes a password with Argon2id and a fresh random salt.
/// The result is a PHC string, so the salt and parameters travel with the hash.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Returns `false` for a wrong password and also for a stored hash that doesn't parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// A throwaway hash used when the username doesn't exist, so a miss costs as much
/// as a real verification.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        // Hashing a constant can't fail with default params; an empty string
        // just makes every verification fail, which is what we want anyway.
        hash_password("tareas-dummy-password").unwrap_or_default()
    })
}

/// Argon2 is deliberately slow, so keep it off the async workers.
pub async fn hash_password_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Hashing(e.to_string()))
}

/// Verifies `password` against `stored_hash`, or against the dummy hash when the
/// account doesn't exist. Both paths do the same amount of work.
pub async fn verify_password_blocking(password: String, stored_hash: Option<String>) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_password(&password, dummy_hash());
            false
        }
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))
}
