//! Password hashing using Argon2id

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::config::HashingConfig;
use crate::domain::DomainError;

/// Trait for password hashing operations
///
/// Both operations are CPU-bound; async callers run them on the blocking pool.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password into a self-describing digest
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a digest; a malformed digest never verifies
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id password hasher with configurable work factors
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher from configured work factors
    pub fn from_config(config: &HashingConfig) -> Result<Self, DomainError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| DomainError::configuration(format!("Invalid hashing parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Parameters embedded in the digest take precedence over ours
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
