use std::sync::Arc;

use super::sign_up_user::AuthSession;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;
use crate::domain::auth::value_objects::{Email, Password};

/// Command for signing in a user
#[derive(Debug, Clone)]
pub struct SignInUserCommand {
  /// User's email address
  pub email: String,
  /// User's password (plain text)
  pub password: String,
}

/// Use case for signing in a user
pub struct SignInUserUseCase {
  auth_service: Arc<AuthService>,
}

impl SignInUserUseCase {
  /// Creates a new instance of SignInUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// Executes the sign-in use case
  ///
  /// A malformed email reads as invalid credentials, same as an unknown one.
  ///
  /// # Errors
  /// Returns `AuthError` if sign-in fails (e.g., invalid credentials, locked account)
  pub async fn execute(&self, command: SignInUserCommand) -> Result<AuthSession, AuthError> {
    let email = Email::new(command.email).map_err(|_| AuthError::InvalidCredentials)?;

    // Stored passwords may predate the current length policy
    let password =
      Password::with_min_length(command.password, 0).map_err(|_| AuthError::InvalidCredentials)?;

    let (user, auth_token) = self.auth_service.sign_in(email, password).await?;

    Ok(AuthSession {
      user_id: user.id,
      name: user.name,
      email: user.email,
      auth_token,
    })
  }
}
