//! Password hashing for the identity store
use argon2::{self, Config as Argon2Config};
use failure::Error as FailureError;
use rand::{thread_rng, Rng};

pub trait PasswordHasher: Send + Sync {
    /// Returns self-describing digest of the password
    fn hash(&self, password: &str) -> Result<String, FailureError>;

    /// Checks password against digest produced by `hash`
    fn verify(&self, password: &str, digest: &str) -> Result<bool, FailureError>;

    /// Well-formed digest matching no password, verified when the account is unknown
    fn dummy_digest(&self) -> &str;
}

const ARGON2_DUMMY_DIGEST: &str = "$argon2i$v=19$m=4096,t=3,p=1$3iyK/yMlCVBlofGFvijbgw$6H/uSdWPxdZ0fMORAZOiGnIugV4Kz8SlqwNHj3ei2CM";

/// Argon2 encoded hashes with random 16 byte salt
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, FailureError> {
        let salt: [u8; 16] = thread_rng().gen();
        argon2::hash_encoded(password.as_bytes(), &salt, &Argon2Config::default()).map_err(|e| format_err!("Password hashing failed: {}", e))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, FailureError> {
        argon2::verify_encoded(digest, password.as_bytes()).map_err(|e| format_err!("Password verification failed: {}", e))
    }

    fn dummy_digest(&self) -> &str {
        ARGON2_DUMMY_DIGEST
    }
}
