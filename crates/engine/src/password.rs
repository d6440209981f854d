//! Password hashing with Argon2id.
//!
//! Argon2 is CPU and memory bound; async callers go through
//! [`hash_in_background`] and [`verify_in_background`], which run it on
//! tokio's blocking pool.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{EngineError, ResultEngine};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Reject passwords the identity provider would not accept.
pub fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(EngineError::InvalidPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

pub(crate) fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::InvalidPassword(format!("failed to hash password: {err}")))
}

/// `Ok(false)` on a wrong password; `Err` only for a corrupt stored hash.
pub(crate) fn verify_password(password: &str, hash: &str) -> ResultEngine<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| EngineError::InvalidCredentials("stored password is unreadable".to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(_) => Err(EngineError::InvalidCredentials(
            "password verification failed".to_string(),
        )),
    }
}

pub(crate) async fn hash_in_background(password: String) -> ResultEngine<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| EngineError::InvalidPassword(format!("failed to hash password: {err}")))?
}

pub(crate) async fn verify_in_background(password: String, hash: String) -> ResultEngine<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|err| {
            EngineError::InvalidCredentials(format!("password verification failed: {err}"))
        })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn corrupt_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn verification_leaves_the_runtime_thread_free() {
        let hash = hash_password("hunter22").unwrap();

        let verify = verify_in_background("hunter22".to_string(), hash);
        tokio::pin!(verify);
        let first_poll = tokio::select! {
            biased;
            verified = &mut verify => Some(verified),
            () = std::future::ready(()) => None,
        };
        assert!(first_poll.is_none());
        assert!(verify.await.unwrap());

        let hash = hash_in_background("hunter22".to_string()).await.unwrap();
        assert!(!verify_in_background("hunter23".to_string(), hash).await.unwrap());
    }
}
