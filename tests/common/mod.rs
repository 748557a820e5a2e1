#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use chrono::{Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use cartedepoezii::domain::auth::{
  AuthError, AuthService, AuthServiceConfig, Email, RepositoryError, TokenLifetimes,
  TokenService, User, UserRepository,
};
use cartedepoezii::infrastructure::clock::ManualClock;
use cartedepoezii::infrastructure::config::HashingConfig;
use cartedepoezii::infrastructure::persistence::InMemoryUserRepository;
use cartedepoezii::infrastructure::security::{AesGcmTokenSealer, Argon2PasswordHasher, KeyRing};

pub struct TestApp {
  pub auth: Arc<AuthService>,
  pub tokens: Arc<TokenService>,
  pub users: Arc<InMemoryUserRepository>,
  pub clock: Arc<ManualClock>,
}

type Interloper = Box<dyn FnOnce(&mut User) + Send>;

/// Repository that applies a competing write right before the next update,
/// as if another request had finished first
pub struct RacingRepository {
  inner: Arc<InMemoryUserRepository>,
  interloper: Mutex<Option<Interloper>>,
}

impl RacingRepository {
  pub fn interleave(&self, change: impl FnOnce(&mut User) + Send + 'static) {
    *self.interloper.lock().unwrap() = Some(Box::new(change));
  }
}

#[async_trait]
impl UserRepository for RacingRepository {
  async fn create(&self, user: User) -> Result<User, AuthError> {
    self.inner.create(user).await
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
    self.inner.find_by_id(id).await
  }

  async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
    self.inner.find_by_email(email).await
  }

  async fn update(&self, user: User) -> Result<User, AuthError> {
    let interloper = self.interloper.lock().unwrap().take();
    if let Some(change) = interloper {
      let mut current = self
        .inner
        .find_by_id(user.id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
      change(&mut current);
      self.inner.update(current).await?;
    }

    self.inner.update(user).await
  }
}

pub fn key(byte: u8) -> String {
  general_purpose::STANDARD.encode([byte; 32])
}

pub fn cheap_hashing() -> HashingConfig {
  HashingConfig {
    memory_cost_kib: 1024,
    time_cost: 1,
    parallelism: 1,
    output_len: 32,
    salt_len: 16,
  }
}

pub fn token_service(keys: &[String], clock: Arc<ManualClock>) -> TokenService {
  let ring = KeyRing::from_base64(keys).unwrap();
  let sealer = AesGcmTokenSealer::new(ring, clock.clone(), Duration::seconds(60));
  TokenService::new(Arc::new(sealer), clock, TokenLifetimes::default())
}

pub fn spawn_app(config: AuthServiceConfig) -> TestApp {
  let users = Arc::new(InMemoryUserRepository::new());
  build_app(config, users.clone(), users)
}

/// Like `spawn_app`, with writes going through a `RacingRepository`
pub fn spawn_racing_app(config: AuthServiceConfig) -> (TestApp, Arc<RacingRepository>) {
  let users = Arc::new(InMemoryUserRepository::new());
  let racing = Arc::new(RacingRepository {
    inner: users.clone(),
    interloper: Mutex::new(None),
  });

  (build_app(config, users, racing.clone()), racing)
}

fn build_app(
  config: AuthServiceConfig,
  users: Arc<InMemoryUserRepository>,
  repo: Arc<dyn UserRepository>,
) -> TestApp {
  let clock = Arc::new(ManualClock::new(
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap(),
  ));
  let tokens = Arc::new(token_service(&[key(11)], clock.clone()));
  let hasher = Argon2PasswordHasher::new(&cheap_hashing()).unwrap();

  let auth = AuthService::new(repo, Arc::new(hasher), tokens.clone(), clock.clone(), config);

  TestApp {
    auth: Arc::new(auth),
    tokens,
    users,
    clock,
  }
}
