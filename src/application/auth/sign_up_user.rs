use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for registering a new user
#[derive(Debug, Clone)]
pub struct SignUpUserCommand {
  /// Display name
  pub name: String,
  /// User's email address
  pub email: String,
  /// User's password (plain text, will be hashed)
  pub password: String,
}

/// Response after a successful sign-up or sign-in
#[derive(Debug, Clone)]
pub struct AuthSession {
  pub user_id: Uuid,
  pub name: String,
  pub email: String,
  /// Sealed auth token for subsequent requests
  pub auth_token: String,
}

/// Use case for registering a new user
pub struct SignUpUserUseCase {
  auth_service: Arc<AuthService>,
}

impl SignUpUserUseCase {
  /// Creates a new instance of SignUpUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the sign-up use case
  ///
  /// # Errors
  /// Returns `AuthError` if registration fails (e.g., email already exists, validation errors)
  pub async fn execute(&self, command: SignUpUserCommand) -> Result<AuthSession, AuthError> {
    let email = Email::new(command.email)?;
    let password = Password::with_min_length(
      command.password,
      self.auth_service.config().password_min_length,
    )?;

    let (user, auth_token) = self
      .auth_service
      .sign_up(command.name, email, password)
      .await?;

    Ok(AuthSession {
      user_id: user.id,
      name: user.name,
      email: user.email,
      auth_token,
    })
  }
}
