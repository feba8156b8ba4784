//! Password hashing utilities

use bcrypt::{hash, verify};

/// Cost used when nothing else is configured.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Hash a password using bcrypt
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}
