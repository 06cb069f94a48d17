use argon2::{Algorithm, Argon2, Params, Version};
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::error::{Error, Result};

const ARGON2_MEMORY: u32 = 19 * 1024; // 19 MiB
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

const SALT_BYTES: usize = 16;
const KEY_BYTES: usize = 64;

/// Salted password hashing stored as `hex(salt):hex(key)`.
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(KEY_BYTES),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill(&mut salt);

        let key = self.derive(password, &salt)?;
        Ok(format!("{}:{}", hex::encode(salt), hex::encode(key)))
    }

    /// Checks a password against a stored hash. Malformed hashes and empty
    /// input never match.
    #[must_use]
    pub fn verify(&self, stored: &str, password: &str) -> bool {
        if stored.is_empty() || password.is_empty() {
            return false;
        }

        let Some((salt_hex, key_hex)) = stored.split_once(':') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(key_hex)) else {
            return false;
        };
        if salt.is_empty() || expected.len() != KEY_BYTES {
            return false;
        }

        match self.derive(password, &salt) {
            Ok(actual) => actual.as_slice().ct_eq(expected.as_slice()).into(),
            Err(e) => {
                tracing::error!("Failed to verify password: {e}");
                false
            }
        }
    }

    fn derive(&self, password: &str, salt: &[u8]) -> Result<[u8; KEY_BYTES]> {
        let mut key = [0u8; KEY_BYTES];
        self.argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("longenough1").unwrap();

        let (salt, key) = hash.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_BYTES * 2);
        assert_eq!(key.len(), KEY_BYTES * 2);
        assert!(hash.chars().all(|c| c == ':' || c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_verify_correct_password() {
        let hasher = PasswordHasher::new();
        for password in ["longenough1", "pässwörd with spaces", "x"] {
            let hash = hasher.hash(password).unwrap();
            assert!(hasher.verify(&hash, password));
        }
    }

    #[test]
    fn test_verify_wrong_password() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("longenough1").unwrap();

        assert!(!hasher.verify(&hash, "longenough2"));
        assert!(!hasher.verify(&hash, "LONGENOUGH1"));
        assert!(!hasher.verify(&hash, ""));
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("changeMe123").unwrap();
        let second = hasher.hash("changeMe123").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "changeMe123"));
        assert!(hasher.verify(&second, "changeMe123"));
    }

    #[test]
    fn test_malformed_hashes_fail() {
        let hasher = PasswordHasher::new();
        let valid = hasher.hash("secret-pass").unwrap();
        let (salt, key) = valid.split_once(':').unwrap();

        assert!(!hasher.verify("", "secret-pass"));
        assert!(!hasher.verify("no-separator", "secret-pass"));
        assert!(!hasher.verify(&format!("zz{}:{key}", &salt[2..]), "secret-pass"));
        assert!(!hasher.verify(&format!("{salt}:not-hex"), "secret-pass"));
        assert!(!hasher.verify(&format!(":{key}"), "secret-pass"));
        assert!(!hasher.verify(&format!("{salt}:{}", &key[..64]), "secret-pass"));
        assert!(!hasher.verify(&format!("$argon2id${salt}"), "secret-pass"));
    }
}
