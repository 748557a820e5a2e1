use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pagination::Identifiable;

/// Poem entity, a titled list of verses by one author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub title: String,
  pub verses: Vec<String>,
  pub created_on: DateTime<Utc>,
  pub updated_on: DateTime<Utc>,
}

impl Poem {
  /// Create new poem (for creation)
  pub fn new(user_id: Uuid, title: String, verses: Vec<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      title,
      verses,
      created_on: now,
      updated_on: now,
    }
  }
}

/// Comment on a poem, or a reply to another comment when `parent_id` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id: Uuid,
  pub user_id: Uuid,
  pub poem_id: Uuid,
  pub parent_id: Option<Uuid>,
  pub text: String,
  pub created_on: DateTime<Utc>,
}

impl Comment {
  pub fn new(user_id: Uuid, poem_id: Uuid, text: String) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      poem_id,
      parent_id: None,
      text,
      created_on: Utc::now(),
    }
  }

  /// Create a reply to `parent`
  pub fn reply_to(parent: &Comment, user_id: Uuid, text: String) -> Self {
    Self {
      parent_id: Some(parent.id),
      ..Self::new(user_id, parent.poem_id, text)
    }
  }

  pub fn is_reply(&self) -> bool {
    self.parent_id.is_some()
  }
}

/// A user's like on a poem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoemLike {
  pub id: Uuid,
  pub user_id: Uuid,
  pub poem_id: Uuid,
  pub created_on: DateTime<Utc>,
}

impl PoemLike {
  pub fn new(user_id: Uuid, poem_id: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      user_id,
      poem_id,
      created_on: Utc::now(),
    }
  }
}

/// Directed follow edge from `follower_id` to `following_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFollowing {
  pub id: Uuid,
  pub follower_id: Uuid,
  pub following_id: Uuid,
  pub created_on: DateTime<Utc>,
}

impl UserFollowing {
  pub fn new(follower_id: Uuid, following_id: Uuid) -> Self {
    Self {
      id: Uuid::new_v4(),
      follower_id,
      following_id,
      created_on: Utc::now(),
    }
  }
}

impl Identifiable for Poem {
  type Id = Uuid;

  fn id(&self) -> &Uuid {
    &self.id
  }
}

impl Identifiable for Comment {
  type Id = Uuid;

  fn id(&self) -> &Uuid {
    &self.id
  }
}

impl Identifiable for PoemLike {
  type Id = Uuid;

  fn id(&self) -> &Uuid {
    &self.id
  }
}

impl Identifiable for UserFollowing {
  type Id = Uuid;

  fn id(&self) -> &Uuid {
    &self.id
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::pagination::{PageSpec, Span, extract_page};
  use chrono::Duration;

  #[test]
  fn test_comment_reply() {
    let author = Uuid::new_v4();
    let poem = Poem::new(author, "Ode".to_string(), vec!["line".to_string()]);
    let comment = Comment::new(author, poem.id, "lovely".to_string());
    let reply = Comment::reply_to(&comment, Uuid::new_v4(), "agreed".to_string());

    assert!(!comment.is_reply());
    assert!(reply.is_reply());
    assert_eq!(reply.parent_id, Some(comment.id));
    assert_eq!(reply.poem_id, poem.id);
  }

  #[test]
  fn test_poems_page_by_recency() {
    let author = Uuid::new_v4();
    let base = Utc::now();
    let mut poems: Vec<Poem> = (0..5)
      .map(|i| {
        let mut poem = Poem::new(author, format!("Poem {}", i + 1), vec!["verse".to_string()]);
        poem.created_on = base + Duration::minutes(i);
        poem
      })
      .collect();

    // Newest first, as a handler would order them
    poems.sort_by(|a, b| b.created_on.cmp(&a.created_on));
    let anchor = poems[1].id;

    let spec = PageSpec::new(Span::new(2).unwrap(), true).after(anchor);
    let page = extract_page(&poems, &spec).unwrap();

    let titles: Vec<&str> = page.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Poem 3", "Poem 2"]);
  }

  #[test]
  fn test_follow_edges_tail_window() {
    let user = Uuid::new_v4();
    let follows: Vec<UserFollowing> = (0..4)
      .map(|_| UserFollowing::new(Uuid::new_v4(), user))
      .collect();

    let spec = PageSpec::new(Span::new(3).unwrap(), false);
    let page = extract_page(&follows, &spec).unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page[0].id, follows[1].id);
  }
}
