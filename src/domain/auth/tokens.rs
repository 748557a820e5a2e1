//! Authentication and password-reset tokens.
//!
//! Both token kinds are flattened to a string map, serialized as JSON and
//! sealed by a [`TokenSealer`]. Two independent expiry checks apply on
//! decode: the sealer's envelope TTL (measured from the creation time it
//! embeds) and the `expires` field carried in the payload. The payload
//! field lets an issuer pick a shorter lifetime than the envelope window.

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::User;
use super::errors::TokenError;
use super::ports::{Clock, TokenSealer};

/// Layout of the embedded expiry timestamp (UTC, microsecond precision)
pub const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Discriminator carried by every password reset token
pub const RESET_MESSAGE: &str = "password_reset";

const USER_ID_FIELD: &str = "userId";
const EMAIL_FIELD: &str = "email";
const SECURE_TEXT_FIELD: &str = "secureText";
const MESSAGE_FIELD: &str = "message";
const EXPIRES_FIELD: &str = "expires";

/// Which validity window applies to a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Auth,
  Reset,
}

/// A payload that can travel inside a sealed token
pub trait TokenClaims: Sized {
  const KIND: TokenKind;

  fn expires_at(&self) -> DateTime<Utc>;

  fn to_fields(&self) -> BTreeMap<String, String>;

  fn from_fields(fields: BTreeMap<String, String>) -> Result<Self, TokenError>;
}

// ============================================================================
// AuthToken
// ============================================================================

/// Claims proving a signed-in user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
  pub user_id: Uuid,
  pub email: String,
  /// Password hash at issuance; a later password change makes it stale
  pub secure_text: String,
  pub expires_at: DateTime<Utc>,
}

impl AuthToken {
  /// Builds claims for `user` expiring `ttl` after `now`
  pub fn for_user(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
    Self {
      user_id: user.id,
      email: user.email.clone(),
      secure_text: user.password_hash.clone(),
      expires_at: (now + ttl).trunc_subsecs(6),
    }
  }
}

impl TokenClaims for AuthToken {
  const KIND: TokenKind = TokenKind::Auth;

  fn expires_at(&self) -> DateTime<Utc> {
    self.expires_at
  }

  fn to_fields(&self) -> BTreeMap<String, String> {
    BTreeMap::from([
      (USER_ID_FIELD.to_string(), self.user_id.to_string()),
      (EMAIL_FIELD.to_string(), self.email.clone()),
      (SECURE_TEXT_FIELD.to_string(), self.secure_text.clone()),
      (EXPIRES_FIELD.to_string(), format_expiry(self.expires_at)),
    ])
  }

  fn from_fields(mut fields: BTreeMap<String, String>) -> Result<Self, TokenError> {
    Ok(Self {
      user_id: parse_user_id(&take_field(&mut fields, USER_ID_FIELD)?)?,
      email: take_field(&mut fields, EMAIL_FIELD)?,
      secure_text: take_field(&mut fields, SECURE_TEXT_FIELD)?,
      expires_at: parse_expiry(&take_field(&mut fields, EXPIRES_FIELD)?)?,
    })
  }
}

// ============================================================================
// ResetToken
// ============================================================================

/// Claims authorizing a single password reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
  pub user_id: Uuid,
  pub email: String,
  pub message: String,
  pub expires_at: DateTime<Utc>,
}

impl ResetToken {
  /// Builds reset claims for `user` expiring `ttl` after `now`
  pub fn for_user(user: &User, now: DateTime<Utc>, ttl: Duration) -> Self {
    Self {
      user_id: user.id,
      email: user.email.clone(),
      message: RESET_MESSAGE.to_string(),
      expires_at: (now + ttl).trunc_subsecs(6),
    }
  }
}

impl TokenClaims for ResetToken {
  const KIND: TokenKind = TokenKind::Reset;

  fn expires_at(&self) -> DateTime<Utc> {
    self.expires_at
  }

  fn to_fields(&self) -> BTreeMap<String, String> {
    BTreeMap::from([
      (USER_ID_FIELD.to_string(), self.user_id.to_string()),
      (EMAIL_FIELD.to_string(), self.email.clone()),
      (MESSAGE_FIELD.to_string(), self.message.clone()),
      (EXPIRES_FIELD.to_string(), format_expiry(self.expires_at)),
    ])
  }

  fn from_fields(mut fields: BTreeMap<String, String>) -> Result<Self, TokenError> {
    // Checked first so that an auth token is reported as the wrong kind
    let message = fields.remove(MESSAGE_FIELD).unwrap_or_default();
    if message != RESET_MESSAGE {
      return Err(TokenError::WrongPurpose);
    }

    Ok(Self {
      user_id: parse_user_id(&take_field(&mut fields, USER_ID_FIELD)?)?,
      email: take_field(&mut fields, EMAIL_FIELD)?,
      message,
      expires_at: parse_expiry(&take_field(&mut fields, EXPIRES_FIELD)?)?,
    })
  }
}

// ============================================================================
// TokenService
// ============================================================================

/// Envelope validity windows per token kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
  pub auth: Duration,
  pub reset: Duration,
}

impl TokenLifetimes {
  pub fn ttl(&self, kind: TokenKind) -> Duration {
    match kind {
      TokenKind::Auth => self.auth,
      TokenKind::Reset => self.reset,
    }
  }
}

impl Default for TokenLifetimes {
  fn default() -> Self {
    Self {
      auth: Duration::days(30),
      reset: Duration::hours(5),
    }
  }
}

/// Encodes and decodes token claims through a sealer
pub struct TokenService {
  sealer: Arc<dyn TokenSealer>,
  clock: Arc<dyn Clock>,
  lifetimes: TokenLifetimes,
}

impl TokenService {
  pub fn new(sealer: Arc<dyn TokenSealer>, clock: Arc<dyn Clock>, lifetimes: TokenLifetimes) -> Self {
    Self {
      sealer,
      clock,
      lifetimes,
    }
  }

  pub fn lifetimes(&self) -> TokenLifetimes {
    self.lifetimes
  }

  /// Issues a fresh auth token for `user`
  pub fn issue_auth_token(&self, user: &User) -> Result<String, TokenError> {
    let claims = AuthToken::for_user(user, self.clock.now(), self.lifetimes.auth);
    self.encode(&claims)
  }

  /// Issues a fresh reset token for `user`
  pub fn issue_reset_token(&self, user: &User) -> Result<String, TokenError> {
    let claims = ResetToken::for_user(user, self.clock.now(), self.lifetimes.reset);
    self.encode(&claims)
  }

  /// Serializes and seals any claims
  pub fn encode<C: TokenClaims>(&self, claims: &C) -> Result<String, TokenError> {
    let plaintext = serde_json::to_vec(&claims.to_fields())
      .map_err(|e| TokenError::EncryptionFailed(format!("Payload serialization failed: {}", e)))?;

    self.sealer.seal(&plaintext)
  }

  /// Opens, parses and expiry-checks a token of kind `C`
  ///
  /// # Errors
  /// * `TokenError::InvalidSignature` if no key authenticates the token
  /// * `TokenError::Malformed` if the payload is not a string map of the expected shape
  /// * `TokenError::WrongPurpose` if a token of another kind is presented
  /// * `TokenError::Expired` if either the envelope TTL or the embedded expiry has passed
  pub fn decode<C: TokenClaims>(&self, token: &str) -> Result<C, TokenError> {
    let plaintext = self.sealer.open(token, self.lifetimes.ttl(C::KIND))?;

    let fields: BTreeMap<String, String> = serde_json::from_slice(&plaintext)
      .map_err(|e| TokenError::Malformed(format!("Payload is not a string map: {}", e)))?;

    let claims = C::from_fields(fields)?;

    if self.clock.now() > claims.expires_at() {
      return Err(TokenError::Expired);
    }

    Ok(claims)
  }

  pub fn decode_auth_token(&self, token: &str) -> Result<AuthToken, TokenError> {
    self.decode(token)
  }

  pub fn decode_reset_token(&self, token: &str) -> Result<ResetToken, TokenError> {
    self.decode(token)
  }
}

fn take_field(fields: &mut BTreeMap<String, String>, name: &str) -> Result<String, TokenError> {
  fields
    .remove(name)
    .ok_or_else(|| TokenError::Malformed(format!("Missing field '{}'", name)))
}

fn parse_user_id(raw: &str) -> Result<Uuid, TokenError> {
  Uuid::parse_str(raw).map_err(|e| TokenError::Malformed(format!("Invalid user id: {}", e)))
}

fn format_expiry(expires_at: DateTime<Utc>) -> String {
  expires_at.format(EXPIRY_FORMAT).to_string()
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, TokenError> {
  NaiveDateTime::parse_from_str(raw, EXPIRY_FORMAT)
    .map(|naive| naive.and_utc())
    .map_err(|e| TokenError::Malformed(format!("Invalid expiry '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn user() -> User {
    User::new(
      "poet@example.com".to_string(),
      "Ada".to_string(),
      "$argon2id$v=19$m=16,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
      now(),
    )
  }

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 26, 4, 30, 29).unwrap() + Duration::microseconds(988_620)
  }

  #[test]
  fn test_expiry_format() {
    assert_eq!(format_expiry(now()), "2026-03-26T04:30:29.988620");
    assert_eq!(parse_expiry("2026-03-26T04:30:29.988620").unwrap(), now());
    assert!(parse_expiry("26/03/2026").is_err());
  }

  #[test]
  fn test_auth_token_fields_round_trip() {
    let claims = AuthToken::for_user(&user(), now(), Duration::days(30));
    let fields = claims.to_fields();

    assert_eq!(fields.len(), 4);
    assert_eq!(fields["secureText"], user().password_hash);
    assert_eq!(AuthToken::from_fields(fields).unwrap(), claims);
  }

  #[test]
  fn test_auth_token_expiry_truncated_to_micros() {
    let issued = now() + Duration::nanoseconds(123);
    let claims = AuthToken::for_user(&user(), issued, Duration::hours(1));

    assert_eq!(claims.expires_at, now() + Duration::hours(1));
  }

  #[test]
  fn test_reset_token_fields_round_trip() {
    let claims = ResetToken::for_user(&user(), now(), Duration::hours(5));
    assert_eq!(claims.message, RESET_MESSAGE);

    let decoded = ResetToken::from_fields(claims.to_fields()).unwrap();
    assert_eq!(decoded, claims);
  }

  #[test]
  fn test_auth_fields_are_not_a_reset_token() {
    let auth = AuthToken::for_user(&user(), now(), Duration::days(30));

    assert_eq!(
      ResetToken::from_fields(auth.to_fields()),
      Err(TokenError::WrongPurpose)
    );
  }

  #[test]
  fn test_reset_fields_are_not_an_auth_token() {
    let reset = ResetToken::for_user(&user(), now(), Duration::hours(5));

    assert!(matches!(
      AuthToken::from_fields(reset.to_fields()),
      Err(TokenError::Malformed(_))
    ));
  }

  #[test]
  fn test_missing_or_invalid_fields_are_malformed() {
    let mut fields = AuthToken::for_user(&user(), now(), Duration::days(1)).to_fields();
    fields.remove("email");
    assert!(matches!(
      AuthToken::from_fields(fields),
      Err(TokenError::Malformed(_))
    ));

    let mut fields = AuthToken::for_user(&user(), now(), Duration::days(1)).to_fields();
    fields.insert("userId".to_string(), "not-a-uuid".to_string());
    assert!(matches!(
      AuthToken::from_fields(fields),
      Err(TokenError::Malformed(_))
    ));
  }

  #[test]
  fn test_default_lifetimes() {
    let lifetimes = TokenLifetimes::default();

    assert_eq!(lifetimes.ttl(TokenKind::Auth), Duration::days(30));
    assert_eq!(lifetimes.ttl(TokenKind::Reset), Duration::hours(5));
  }
}
