use std::sync::Arc;

use super::sign_up_user::AuthSession;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for requesting a password reset
#[derive(Debug, Clone)]
pub struct RequestPasswordResetCommand {
  pub email: String,
}

/// Response carrying the reset token to deliver out of band
#[derive(Debug, Clone)]
pub struct RequestPasswordResetResponse {
  pub email: String,
  pub name: String,
  pub reset_token: String,
}

/// Use case for issuing a password reset token
pub struct RequestPasswordResetUseCase {
  auth_service: Arc<AuthService>,
}

impl RequestPasswordResetUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// # Errors
  /// Returns `AuthError::UserNotFound` if no account uses the email
  pub async fn execute(
    &self,
    command: RequestPasswordResetCommand,
  ) -> Result<RequestPasswordResetResponse, AuthError> {
    let email = Email::new(command.email)?;
    let (user, reset_token) = self.auth_service.request_password_reset(email).await?;

    Ok(RequestPasswordResetResponse {
      email: user.email,
      name: user.name,
      reset_token,
    })
  }
}

/// Command for completing a password reset
#[derive(Debug, Clone)]
pub struct ResetPasswordCommand {
  pub email: String,
  /// New password (plain text, will be hashed)
  pub password: String,
  pub reset_token: String,
}

/// Use case for setting a new password with a reset token
pub struct ResetPasswordUseCase {
  auth_service: Arc<AuthService>,
}

impl ResetPasswordUseCase {
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the reset and signs the user in
  ///
  /// # Errors
  /// Returns `AuthError` if the token is invalid, expired, already used or
  /// issued for another email, or if the new password is rejected
  pub async fn execute(&self, command: ResetPasswordCommand) -> Result<AuthSession, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::with_min_length(
      command.password,
      self.auth_service.config().password_min_length,
    )?;

    let (user, auth_token) = self
      .auth_service
      .reset_password(email, password, &command.reset_token)
      .await?;

    Ok(AuthSession {
      user_id: user.id,
      name: user.name,
      email: user.email,
      auth_token,
    })
  }
}
