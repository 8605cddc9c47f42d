use crate::error::AppError;
use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

/// bcrypt only reads this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes `password` at the given cost. Passwords bcrypt would truncate are
/// rejected instead of being silently shortened.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::ValidationError(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Compares `password` against a bcrypt hash. bcrypt's comparison is constant time
/// with respect to the stored hash.
///
/// An over-long password never matches, but is still run through bcrypt so the
/// work done does not depend on its length.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    let matched = verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))?;
    Ok(matched && password.len() <= MAX_PASSWORD_BYTES)
}
