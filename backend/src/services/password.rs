use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing error")]
    HashingError,
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// The returned PHC string embeds algorithm, parameters and salt, so
/// [`verify_password`] needs nothing else.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingError)
}

/// `false` on mismatch and on a stored hash that cannot be parsed.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let password = "test_password123";
        let hash = hash_password(password).unwrap();

        assert_ne!(hash, password);
        assert!(verify_password(&hash, password));
        assert!(!verify_password(&hash, "wrong_password"));
    }

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password(&first, "secret1"));
        assert!(verify_password(&second, "secret1"));
    }

    #[test]
    fn test_empty_password_hashes() {
        let hash = hash_password("").unwrap();

        assert!(verify_password(&hash, ""));
        assert!(!verify_password(&hash, " "));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "secret1"));
        assert!(!verify_password("secret1", "secret1"));
    }
}
