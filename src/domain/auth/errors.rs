use thiserror::Error;

use super::value_objects::ValueObjectError;

/// Main authentication error type
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("Invalid email and/or password")]
  InvalidCredentials,

  #[error("Email already exists")]
  EmailAlreadyExists,

  #[error("User not found")]
  UserNotFound,

  #[error("This account is locked")]
  AccountLocked,

  #[error("Invalid or expired authentication token")]
  InvalidAuthToken,

  #[error("Invalid reset token")]
  InvalidResetToken,

  #[error("User email and reset token are a mismatch")]
  EmailMismatch,

  #[error("Repository error: {0}")]
  Repository(#[from] RepositoryError),

  #[error("Hash error: {0}")]
  Hash(#[from] HashError),

  #[error("Token error: {0}")]
  Token(#[from] TokenError),

  #[error("Value object error: {0}")]
  ValueObject(#[from] ValueObjectError),
}

/// Repository-related errors
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("Record not found")]
  NotFound,

  #[error("Duplicate key violation: {0}")]
  DuplicateKey(String),

  #[error("Record was modified concurrently")]
  Conflict,

  #[error("Storage error: {0}")]
  Storage(String),
}

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum HashError {
  #[error("Failed to hash password: {0}")]
  HashingFailed(String),

  #[error("Invalid hashing parameters: {0}")]
  InvalidParams(String),

  #[error("Invalid hash format: {0}")]
  InvalidFormat(String),
}

/// Token encoding and decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
  #[error("Token signature is invalid")]
  InvalidSignature,

  #[error("Token is malformed: {0}")]
  Malformed(String),

  #[error("Token has expired")]
  Expired,

  #[error("Token was not issued for this purpose")]
  WrongPurpose,

  #[error("Invalid secret key: {0}")]
  InvalidKey(String),

  #[error("Token encryption failed: {0}")]
  EncryptionFailed(String),
}

impl From<argon2::password_hash::Error> for HashError {
  fn from(error: argon2::password_hash::Error) -> Self {
    use argon2::password_hash::Error;
    match error {
      Error::PhcStringField
      | Error::PhcStringTrailingData
      | Error::B64Encoding(_)
      | Error::Algorithm
      | Error::Version
      | Error::ParamNameDuplicated
      | Error::ParamNameInvalid
      | Error::ParamValueInvalid(_)
      | Error::ParamsMaxExceeded
      | Error::SaltInvalid(_)
      | Error::OutputSize { .. } => HashError::InvalidFormat(error.to_string()),
      _ => HashError::HashingFailed(error.to_string()),
    }
  }
}
