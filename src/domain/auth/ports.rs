use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::entities::User;
use super::errors::{AuthError, HashError, TokenError};
use super::value_objects::{Email, Password, PasswordHash};

/// Repository trait for user persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Creates a new user in the repository
  async fn create(&self, user: User) -> Result<User, AuthError>;

  /// Finds a user by their unique identifier
  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;

  /// Finds a user by their email address
  async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError>;

  /// Updates an existing user and bumps its version
  ///
  /// Fails with `RepositoryError::Conflict` if the stored version differs
  /// from `user.version`, i.e. the user was updated since it was read.
  async fn update(&self, user: User) -> Result<User, AuthError>;
}

/// Service trait for password hashing operations.
///
/// Hashing is deliberately CPU and memory heavy; implementations are
/// synchronous and callers on an async runtime should offload them.
pub trait PasswordHasher: Send + Sync {
  /// Hashes a plain text password with a fresh random salt
  fn hash(&self, password: &Password) -> Result<PasswordHash, HashError>;

  /// Verifies a plain text password against an encoded hash
  ///
  /// Returns `HashError::InvalidFormat` if the encoded hash cannot be parsed.
  fn verify(&self, password: &Password, hashed_password: &PasswordHash) -> Result<bool, HashError>;

  /// Whether the hash was produced with parameters other than the current ones
  fn needs_rehash(&self, hashed_password: &PasswordHash) -> Result<bool, HashError>;
}

/// Authenticated encryption of opaque token payloads
pub trait TokenSealer: Send + Sync {
  /// Encrypts and authenticates `plaintext`, embedding the creation time
  fn seal(&self, plaintext: &[u8]) -> Result<String, TokenError>;

  /// Authenticates and decrypts `token`, rejecting it once `ttl` has elapsed
  /// since its embedded creation time
  fn open(&self, token: &str, ttl: Duration) -> Result<Vec<u8>, TokenError>;
}

/// Source of the current time
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}
