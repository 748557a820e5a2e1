use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::auth::{
  entities::User,
  errors::{AuthError, RepositoryError},
  ports::UserRepository,
  value_objects::Email,
};

/// Process-local implementation of the UserRepository trait
///
/// Emails are unique across users, matching the constraint a database
/// backed repository would enforce.
#[derive(Default)]
pub struct InMemoryUserRepository {
  users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
  /// Creates a new, empty InMemoryUserRepository
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn len(&self) -> usize {
    self.users.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.users.read().await.is_empty()
  }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Uuid) -> bool {
  users
    .values()
    .any(|existing| existing.id != except && existing.email == email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
  async fn create(&self, user: User) -> Result<User, AuthError> {
    let mut users = self.users.write().await;

    if users.contains_key(&user.id) {
      return Err(RepositoryError::DuplicateKey(format!("user id {}", user.id)).into());
    }
    if email_taken(&users, &user.email, user.id) {
      return Err(RepositoryError::DuplicateKey(format!("email {}", user.email)).into());
    }

    users.insert(user.id, user.clone());
    tracing::debug!("Stored user {}", user.id);

    Ok(user)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
    Ok(self.users.read().await.get(&id).cloned())
  }

  async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AuthError> {
    let users = self.users.read().await;

    Ok(
      users
        .values()
        .find(|user| user.email == email.as_str())
        .cloned(),
    )
  }

  async fn update(&self, mut user: User) -> Result<User, AuthError> {
    let mut users = self.users.write().await;

    let stored_version = users
      .get(&user.id)
      .map(|stored| stored.version)
      .ok_or(RepositoryError::NotFound)?;
    if stored_version != user.version {
      tracing::debug!(
        "Rejected stale update of user {} (version {} != {})",
        user.id,
        user.version,
        stored_version
      );
      return Err(RepositoryError::Conflict.into());
    }
    if email_taken(&users, &user.email, user.id) {
      return Err(RepositoryError::DuplicateKey(format!("email {}", user.email)).into());
    }

    user.version += 1;
    users.insert(user.id, user.clone());

    Ok(user)
  }
}
