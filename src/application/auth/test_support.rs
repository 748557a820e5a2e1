use base64::{Engine as _, engine::general_purpose};
use chrono::Duration;
use std::sync::Arc;

use crate::domain::auth::entities::User;
use crate::domain::auth::services::{AuthService, AuthServiceConfig};
use crate::domain::auth::tokens::{TokenLifetimes, TokenService};
use crate::domain::auth::value_objects::{Email, Password};
use crate::infrastructure::clock::ManualClock;
use crate::infrastructure::config::HashingConfig;
use crate::infrastructure::persistence::InMemoryUserRepository;
use crate::infrastructure::security::{AesGcmTokenSealer, Argon2PasswordHasher, KeyRing};

/// Auth service over an in-memory repository, cheap hashing and a manual clock
pub fn auth_service() -> (Arc<AuthService>, Arc<ManualClock>) {
  let clock = Arc::new(ManualClock::default());
  let keys = KeyRing::from_base64(&[general_purpose::STANDARD.encode([9u8; 32])]).unwrap();
  let sealer = AesGcmTokenSealer::new(keys, clock.clone(), Duration::seconds(60));
  let tokens = TokenService::new(Arc::new(sealer), clock.clone(), TokenLifetimes::default());

  let hasher = Argon2PasswordHasher::new(&HashingConfig {
    memory_cost_kib: 1024,
    time_cost: 1,
    parallelism: 1,
    ..HashingConfig::default()
  })
  .unwrap();

  let service = AuthService::new(
    Arc::new(InMemoryUserRepository::new()),
    Arc::new(hasher),
    Arc::new(tokens),
    clock.clone(),
    AuthServiceConfig::default(),
  );

  (Arc::new(service), clock)
}

pub async fn register(service: &AuthService, email: &str, password: &str) -> User {
  let (user, _) = service
    .sign_up(
      "Test Poet".to_string(),
      Email::new(email).unwrap(),
      Password::new(password).unwrap(),
    )
    .await
    .unwrap();
  user
}
