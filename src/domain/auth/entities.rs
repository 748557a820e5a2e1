use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::TokenHash;
use crate::domain::pagination::Identifiable;

/// User entity representing an account on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  /// Unique identifier for the user
  pub id: Uuid,
  /// Timestamp when the user was created
  pub created_on: DateTime<Utc>,
  /// Timestamp when the user was last updated
  pub updated_on: DateTime<Utc>,
  /// User's email address (unique)
  pub email: String,
  /// Display name
  pub name: String,
  pub bio: String,
  pub profile_photo_id: Option<String>,
  /// Encoded Argon2 password hash
  pub password_hash: String,
  /// Consecutive failed sign-in attempts since the last success
  pub sign_in_attempts: u32,
  /// False once the account is locked
  pub is_active: bool,
  /// Digest of the outstanding password reset token, if one was issued
  pub account_reset_token: Option<TokenHash>,
  /// Bumped by the repository on every stored update
  pub version: u64,
}

impl User {
  /// Creates a new active user with the given details
  pub fn new(email: String, name: String, password_hash: String, now: DateTime<Utc>) -> Self {
    Self {
      id: Uuid::new_v4(),
      created_on: now,
      updated_on: now,
      email,
      name,
      bio: String::new(),
      profile_photo_id: None,
      password_hash,
      sign_in_attempts: 0,
      is_active: true,
      account_reset_token: None,
      version: 0,
    }
  }

  /// Records a failed sign-in and locks the account once `max_attempts` is reached.
  ///
  /// Returns true if this failure locked the account.
  pub fn record_failed_sign_in(&mut self, max_attempts: u32, now: DateTime<Utc>) -> bool {
    self.sign_in_attempts = self.sign_in_attempts.saturating_add(1);
    self.updated_on = now;

    if self.is_active && self.sign_in_attempts >= max_attempts {
      self.is_active = false;
      return true;
    }

    false
  }

  /// Whether a successful sign-in has leftover state to clear
  pub fn needs_sign_in_reset(&self) -> bool {
    self.sign_in_attempts > 0 || self.account_reset_token.is_some()
  }

  /// Clears failed attempts and any pending reset after a successful sign-in
  pub fn record_successful_sign_in(&mut self, now: DateTime<Utc>) {
    self.sign_in_attempts = 0;
    self.account_reset_token = None;
    self.updated_on = now;
  }

  /// Records the digest of a freshly issued reset token, replacing any earlier one
  pub fn set_account_reset_token(&mut self, marker: TokenHash, now: DateTime<Utc>) {
    self.account_reset_token = Some(marker);
    self.updated_on = now;
  }

  /// Checks that `token` is the outstanding reset token for this account
  pub fn is_account_reset_token_valid(&self, token: &str) -> bool {
    self
      .account_reset_token
      .as_ref()
      .is_some_and(|marker| marker.matches(token))
  }

  /// Stores a new password hash, consumes the reset token and unlocks the account
  pub fn complete_password_reset(&mut self, new_password_hash: String, now: DateTime<Utc>) {
    self.password_hash = new_password_hash;
    self.account_reset_token = None;
    self.sign_in_attempts = 0;
    self.is_active = true;
    self.updated_on = now;
  }
}

impl Identifiable for User {
  type Id = Uuid;

  fn id(&self) -> &Uuid {
    &self.id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, TimeZone};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
  }

  fn user() -> User {
    User::new(
      "poet@example.com".to_string(),
      "Ada".to_string(),
      "hashed_password".to_string(),
      now(),
    )
  }

  #[test]
  fn test_user_creation() {
    let user = user();

    assert_eq!(user.email, "poet@example.com");
    assert_eq!(user.name, "Ada");
    assert!(user.is_active);
    assert_eq!(user.sign_in_attempts, 0);
    assert!(user.account_reset_token.is_none());
    assert!(!user.needs_sign_in_reset());
    assert_eq!(user.created_on, now());
    assert_eq!(user.version, 0);
  }

  #[test]
  fn test_failed_sign_ins_lock_account() {
    let mut user = user();

    assert!(!user.record_failed_sign_in(3, now()));
    assert!(!user.record_failed_sign_in(3, now()));
    assert!(user.is_active);

    let later = now() + Duration::minutes(3);
    assert!(user.record_failed_sign_in(3, later));
    assert!(!user.is_active);
    assert_eq!(user.updated_on, later);

    // Already locked, no second lock event
    assert!(!user.record_failed_sign_in(3, later));
    assert_eq!(user.sign_in_attempts, 4);
  }

  #[test]
  fn test_successful_sign_in_clears_state() {
    let mut user = user();
    user.record_failed_sign_in(5, now());
    user.set_account_reset_token(TokenHash::of("reset-token"), now());
    assert!(user.needs_sign_in_reset());

    user.record_successful_sign_in(now());
    assert_eq!(user.sign_in_attempts, 0);
    assert!(user.account_reset_token.is_none());
  }

  #[test]
  fn test_account_reset_token_is_single_use() {
    let mut user = user();
    user.record_failed_sign_in(1, now());
    assert!(!user.is_active);

    user.set_account_reset_token(TokenHash::of("first"), now());
    user.set_account_reset_token(TokenHash::of("second"), now());
    assert!(!user.is_account_reset_token_valid("first"));
    assert!(user.is_account_reset_token_valid("second"));

    user.complete_password_reset("new_hash".to_string(), now());
    assert!(!user.is_account_reset_token_valid("second"));
    assert_eq!(user.password_hash, "new_hash");
    assert!(user.is_active);
    assert_eq!(user.sign_in_attempts, 0);
  }

  #[test]
  fn test_user_is_identifiable() {
    let user = user();
    assert_eq!(Identifiable::id(&user), &user.id);
  }
}
