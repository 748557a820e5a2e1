use std::sync::Arc;
use uuid::Uuid;

use super::entities::User;
use super::errors::{AuthError, HashError, RepositoryError};
use super::ports::{Clock, PasswordHasher, UserRepository};
use super::tokens::TokenService;
use super::value_objects::{Email, Password, PasswordHash, TokenHash, ValueObjectError};

/// Account policy enforced by the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
  pub password_min_length: usize,
  pub max_sign_in_attempts: u32,
  pub max_name_length: usize,
}

impl Default for AuthServiceConfig {
  fn default() -> Self {
    Self {
      password_min_length: Password::DEFAULT_MIN_LENGTH,
      max_sign_in_attempts: 5,
      max_name_length: 64,
    }
  }
}

/// Authentication service implementing account and token workflows
pub struct AuthService {
  user_repo: Arc<dyn UserRepository>,
  password_hasher: Arc<dyn PasswordHasher>,
  tokens: Arc<TokenService>,
  clock: Arc<dyn Clock>,
  config: AuthServiceConfig,
}

impl AuthService {
  /// Creates a new instance of AuthService
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
  ) -> Self {
    Self {
      user_repo,
      password_hasher,
      tokens,
      clock,
      config,
    }
  }

  pub fn config(&self) -> &AuthServiceConfig {
    &self.config
  }

  /// Registers a new user and issues an auth token
  ///
  /// # Errors
  /// * `AuthError::EmailAlreadyExists` if the email is already registered
  /// * `AuthError::ValueObject` if the name is too long
  pub async fn sign_up(
    &self,
    name: String,
    email: Email,
    password: Password,
  ) -> Result<(User, String), AuthError> {
    let name = name.trim().to_string();
    if name.chars().count() > self.config.max_name_length {
      return Err(
        ValueObjectError::NameTooLong {
          max: self.config.max_name_length,
        }
        .into(),
      );
    }

    if self.user_repo.find_by_email(&email).await?.is_some() {
      return Err(AuthError::EmailAlreadyExists);
    }

    let password_hash = self.hash_password(password).await?;
    let user = User::new(
      email.into_inner(),
      name,
      password_hash.into_inner(),
      self.clock.now(),
    );

    let created_user = match self.user_repo.create(user).await {
      Ok(user) => user,
      Err(AuthError::Repository(RepositoryError::DuplicateKey(_))) => {
        return Err(AuthError::EmailAlreadyExists);
      }
      Err(e) => return Err(e),
    };

    let auth_token = self.tokens.issue_auth_token(&created_user)?;
    tracing::info!("Registered user {}", created_user.id);

    Ok((created_user, auth_token))
  }

  /// Authenticates a user by email and password and issues an auth token
  ///
  /// Every failed attempt is counted; reaching the configured maximum locks
  /// the account until its password is reset. A hash made with outdated
  /// parameters is left in place; only a password reset replaces it.
  ///
  /// # Errors
  /// * `AuthError::InvalidCredentials` for an unknown email, a wrong password
  ///   or an unreadable stored hash
  /// * `AuthError::AccountLocked` if the password is right but the account is locked
  pub async fn sign_in(&self, email: Email, password: Password) -> Result<(User, String), AuthError> {
    let user = self
      .user_repo
      .find_by_email(&email)
      .await?
      .ok_or(AuthError::InvalidCredentials)?;

    let stored_hash = PasswordHash::from_encoded(user.password_hash.clone());
    let is_valid = match self.verify_password(password, stored_hash.clone()).await {
      Ok(is_valid) => is_valid,
      Err(AuthError::Hash(HashError::InvalidFormat(reason))) => {
        tracing::warn!("Stored password hash for user {} is unreadable: {}", user.id, reason);
        false
      }
      Err(e) => return Err(e),
    };

    if !is_valid {
      let max_attempts = self.config.max_sign_in_attempts;
      let now = self.clock.now();
      let mut locked = false;

      let user = self
        .modify_user(user.id, |stored| {
          locked = stored.record_failed_sign_in(max_attempts, now);
          Ok(true)
        })
        .await?;

      if locked {
        tracing::warn!(
          "Locked user {} after {} failed sign-in attempts",
          user.id,
          user.sign_in_attempts
        );
      }
      return Err(AuthError::InvalidCredentials);
    }

    if self.password_hasher.needs_rehash(&stored_hash)? {
      tracing::info!("Password hash for user {} uses outdated parameters", user.id);
    }

    let now = self.clock.now();
    let user = self
      .modify_user(user.id, |stored| {
        // The password was checked against a hash that a reset has since replaced
        if stored.password_hash != stored_hash.as_str() {
          return Err(AuthError::InvalidCredentials);
        }
        if !stored.is_active {
          return Err(AuthError::AccountLocked);
        }
        if !stored.needs_sign_in_reset() {
          return Ok(false);
        }
        stored.record_successful_sign_in(now);
        Ok(true)
      })
      .await?;

    let auth_token = self.tokens.issue_auth_token(&user)?;
    tracing::debug!("User {} signed in", user.id);

    Ok((user, auth_token))
  }

  /// Issues a password reset token and records it as the account's single
  /// outstanding reset marker, replacing any earlier one
  ///
  /// # Errors
  /// Returns `AuthError::UserNotFound` if no account uses `email`
  pub async fn request_password_reset(&self, email: Email) -> Result<(User, String), AuthError> {
    let user = self
      .user_repo
      .find_by_email(&email)
      .await?
      .ok_or(AuthError::UserNotFound)?;

    let reset_token = self.tokens.issue_reset_token(&user)?;
    let marker = TokenHash::of(&reset_token);
    let now = self.clock.now();

    let user = self
      .modify_user(user.id, |stored| {
        stored.set_account_reset_token(marker.clone(), now);
        Ok(true)
      })
      .await?;

    tracing::info!("Issued password reset token for user {}", user.id);

    Ok((user, reset_token))
  }

  /// Consumes a reset token, sets a new password and issues an auth token
  ///
  /// # Errors
  /// * `AuthError::Token` if the reset token fails to decode or is of the wrong kind
  /// * `AuthError::EmailMismatch` if the token was issued for another email, or
  ///   the account's email changed since
  /// * `AuthError::InvalidResetToken` if the token is not the outstanding one
  pub async fn reset_password(
    &self,
    email: Email,
    password: Password,
    reset_token: &str,
  ) -> Result<(User, String), AuthError> {
    let claims = self.tokens.decode_reset_token(reset_token).map_err(|e| {
      tracing::warn!("Rejected reset token: {}", e);
      AuthError::Token(e)
    })?;

    if claims.email != email.as_str() {
      return Err(AuthError::EmailMismatch);
    }

    let user = self
      .user_repo
      .find_by_id(claims.user_id)
      .await?
      .ok_or(AuthError::UserNotFound)?;
    check_reset_target(&user, &claims.email, reset_token)?;

    let password_hash = self.hash_password(password).await?;
    let now = self.clock.now();

    let user = self
      .modify_user(user.id, |stored| {
        check_reset_target(stored, &claims.email, reset_token)?;
        stored.complete_password_reset(password_hash.as_str().to_string(), now);
        Ok(true)
      })
      .await?;

    let auth_token = self.tokens.issue_auth_token(&user)?;
    tracing::info!("Password reset for user {}", user.id);

    Ok((user, auth_token))
  }

  /// Resolves an auth token to its user.
  ///
  /// Besides signature and expiry, the password hash embedded at issuance
  /// must still equal the stored one, so changing the password revokes every
  /// token issued before.
  ///
  /// # Errors
  /// * `AuthError::Token` if the token fails to decode
  /// * `AuthError::InvalidAuthToken` if the user is gone or the password changed
  /// * `AuthError::AccountLocked` if the account is locked
  pub async fn authenticate(&self, auth_token: &str) -> Result<User, AuthError> {
    let claims = self.tokens.decode_auth_token(auth_token).map_err(|e| {
      tracing::debug!("Rejected auth token: {}", e);
      AuthError::Token(e)
    })?;

    let user = self
      .user_repo
      .find_by_id(claims.user_id)
      .await?
      .ok_or(AuthError::InvalidAuthToken)?;

    if claims.secure_text != user.password_hash {
      tracing::debug!("Auth token for user {} predates a password change", user.id);
      return Err(AuthError::InvalidAuthToken);
    }

    if !user.is_active {
      return Err(AuthError::AccountLocked);
    }

    Ok(user)
  }

  /// Issues a new auth token for an already authenticated user, e.g. after a
  /// profile update
  pub fn refresh_auth_token(&self, user: &User) -> Result<String, AuthError> {
    Ok(self.tokens.issue_auth_token(user)?)
  }

  /// Re-reads the user, applies `change` and stores the result, starting
  /// over whenever another writer updated the user in between.
  ///
  /// `change` reports whether it modified the user; an untouched user is
  /// returned without a write.
  async fn modify_user<F>(&self, id: Uuid, mut change: F) -> Result<User, AuthError>
  where
    F: FnMut(&mut User) -> Result<bool, AuthError> + Send,
  {
    loop {
      let mut user = self
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

      if !change(&mut user)? {
        return Ok(user);
      }

      match self.user_repo.update(user).await {
        Err(AuthError::Repository(RepositoryError::Conflict)) => {
          tracing::debug!("User {} was updated concurrently, retrying", id);
        }
        result => return result,
      }
    }
  }

  async fn hash_password(&self, password: Password) -> Result<PasswordHash, AuthError> {
    let hasher = Arc::clone(&self.password_hasher);

    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
      .await
      .map_err(|e| HashError::HashingFailed(format!("Hashing task failed: {}", e)))??;

    Ok(hash)
  }

  async fn verify_password(
    &self,
    password: Password,
    stored_hash: PasswordHash,
  ) -> Result<bool, AuthError> {
    let hasher = Arc::clone(&self.password_hasher);

    let is_valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
      .await
      .map_err(|e| HashError::HashingFailed(format!("Verification task failed: {}", e)))??;

    Ok(is_valid)
  }
}

/// The reset token must be the account's outstanding one and the account
/// must still use the email the token was issued for
fn check_reset_target(user: &User, token_email: &str, reset_token: &str) -> Result<(), AuthError> {
  if user.email != token_email {
    tracing::warn!("Reset token for user {} names a previous email", user.id);
    return Err(AuthError::EmailMismatch);
  }

  if !user.is_account_reset_token_valid(reset_token) {
    tracing::warn!("Reset token for user {} is not the outstanding one", user.id);
    return Err(AuthError::InvalidResetToken);
  }

  Ok(())
}
