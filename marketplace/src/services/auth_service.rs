// artisan_market/src/services/auth_service.rs

//! Password hashing and verification with Argon2.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a plain-text password with a fresh random salt and default Argon2 parameters.
///
/// Returns the PHC-formatted hash string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  match Argon2::default().hash_password(password.as_bytes(), &salt) {
    Ok(password_hash_obj) => {
      debug!("Password hashed successfully.");
      Ok(password_hash_obj.to_string())
    }
    Err(argon_err) => {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      Err(AppError::Internal(format!("Password hashing process failed: {}", argon_err)))
    }
  }
}

/// Verifies a plain-text password against a stored Argon2 hash.
///
/// `Ok(false)` means the password simply did not match. An unparseable
/// stored hash is an internal error, not a failed login.
#[instrument(
  name = "auth_service::verify_password",
  skip(hashed_password_str, provided_password),
  err(Display),
  fields(hash_len = hashed_password_str.len())
)]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse battery").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "correct horse battery").unwrap());
    assert!(!verify_password(&hash, "wrong horse battery").unwrap());
  }

  #[test]
  fn same_password_gets_distinct_salts() {
    let a = hash_password("pottery-wheel").unwrap();
    let b = hash_password("pottery-wheel").unwrap();
    assert_ne!(a, b);
  }

  #[test]
  fn empty_inputs() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
    let hash = hash_password("something-long").unwrap();
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn corrupt_stored_hash_is_internal() {
    assert!(matches!(verify_password("not-a-phc-string", "whatever1"), Err(AppError::Internal(_))));
  }
}
