use std::sync::Arc;

use crate::domain::auth::entities::User;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::services::AuthService;

/// Use case for resolving the user behind an auth token
pub struct GetCurrentUserUseCase {
  auth_service: Arc<AuthService>,
}

impl GetCurrentUserUseCase {
  /// Creates a new instance of GetCurrentUserUseCase
  pub fn new(auth_service: Arc<AuthService>) -> Self {
    Self { auth_service }
  }

  /// # Errors
  /// Returns `AuthError` if the token is invalid, expired or stale, or the
  /// account is locked
  pub async fn execute(&self, auth_token: &str) -> Result<User, AuthError> {
    self.auth_service.authenticate(auth_token.trim()).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::application::auth::test_support::{auth_service, register};
  use crate::domain::auth::errors::TokenError;
  use chrono::Duration;

  #[tokio::test]
  async fn test_get_current_user() {
    let (service, _) = auth_service();
    let user = register(&service, "ana@example.com", "plumb-singur").await;
    let token = service.refresh_auth_token(&user).unwrap();

    let use_case = GetCurrentUserUseCase::new(service);
    let current = use_case.execute(&format!(" {} ", token)).await.unwrap();
    assert_eq!(current.id, user.id);
  }

  #[tokio::test]
  async fn test_get_current_user_expired_token() {
    let (service, clock) = auth_service();
    let user = register(&service, "ana@example.com", "plumb-singur").await;
    let token = service.refresh_auth_token(&user).unwrap();

    clock.advance(Duration::days(31));

    let use_case = GetCurrentUserUseCase::new(service);
    assert!(matches!(
      use_case.execute(&token).await,
      Err(AuthError::Token(TokenError::Expired))
    ));
  }
}
