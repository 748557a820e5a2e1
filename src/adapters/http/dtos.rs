use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::application::auth::{
  AuthSession, RequestPasswordResetCommand, ResetPasswordCommand, SignInUserCommand,
  SignUpUserCommand,
};
use crate::domain::pagination::{PageSpec, PaginationError, SpanLimits};

// ============================================================================
// Pagination
// ============================================================================

/// Query string of a paginated listing: `?span=12&after=<id>` or `?before=<id>`
///
/// Empty values count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
  pub span: Option<String>,
  pub after: Option<String>,
  pub before: Option<String>,
}

impl PageQuery {
  /// Builds the page specification for an endpoint
  ///
  /// `pop_top` is chosen by the endpoint, not the client: true for feeds
  /// that read from the head, false for the tail.
  ///
  /// # Errors
  /// * `PaginationError::InvalidSpan` if `span` is not a positive integer
  /// * `PaginationError::InvalidAnchor` if an anchor does not parse as `K`
  pub fn into_page_spec<K: FromStr>(
    self,
    pop_top: bool,
    limits: &SpanLimits,
  ) -> Result<PageSpec<K>, PaginationError> {
    let span = limits.resolve(self.span.as_deref())?;
    let mut spec = PageSpec::new(span, pop_top);

    if let Some(anchor) = parse_anchor(self.after)? {
      spec = spec.after(anchor);
    }
    if let Some(anchor) = parse_anchor(self.before)? {
      spec = spec.before(anchor);
    }

    Ok(spec)
  }
}

fn parse_anchor<K: FromStr>(raw: Option<String>) -> Result<Option<K>, PaginationError> {
  match raw.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(value) => value
      .parse()
      .map(Some)
      .map_err(|_| PaginationError::InvalidAnchor(value.to_string())),
  }
}

/// Listing envelope. A pagination failure is reported as an empty page
/// carrying the error message.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
  pub success: bool,
  pub data: Vec<T>,
  pub message: String,
}

impl<T: Clone> PageResponse<T> {
  pub fn from_result(result: Result<&[T], PaginationError>, message: impl Into<String>) -> Self {
    match result {
      Ok(page) => Self {
        success: true,
        data: page.to_vec(),
        message: message.into(),
      },
      Err(e) => {
        tracing::debug!("Pagination failed: {}", e);
        Self {
          success: false,
          data: Vec::new(),
          message: e.to_string(),
        }
      }
    }
  }
}

// ============================================================================
// Authentication
// ============================================================================

/// Request for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
  pub name: String,
  pub email: String,
  pub password: String,
}

impl From<SignUpRequest> for SignUpUserCommand {
  fn from(request: SignUpRequest) -> Self {
    Self {
      name: request.name,
      email: request.email,
      password: request.password,
    }
  }
}

/// Request for user sign-in
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
  pub email: String,
  pub password: String,
}

impl From<SignInRequest> for SignInUserCommand {
  fn from(request: SignInRequest) -> Self {
    Self {
      email: request.email,
      password: request.password,
    }
  }
}

/// Request for a password reset token
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
  pub email: String,
}

impl From<PasswordResetRequest> for RequestPasswordResetCommand {
  fn from(request: PasswordResetRequest) -> Self {
    Self {
      email: request.email,
    }
  }
}

/// Request completing a password reset
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
  pub email: String,
  pub password: String,
  pub reset_token: String,
}

impl From<ResetPasswordRequest> for ResetPasswordCommand {
  fn from(request: ResetPasswordRequest) -> Self {
    Self {
      email: request.email,
      password: request.password,
      reset_token: request.reset_token,
    }
  }
}

/// Session payload returned after sign-up, sign-in and password reset
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSessionResponse {
  pub user_id: Uuid,
  pub name: String,
  pub email: String,
  pub auth_token: String,
}

impl From<AuthSession> for AuthSessionResponse {
  fn from(session: AuthSession) -> Self {
    Self {
      user_id: session.user_id,
      name: session.name,
      email: session.email,
      auth_token: session.auth_token,
    }
  }
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
  /// Always false
  pub success: bool,

  /// Error type/code
  pub error: String,

  /// Human-readable error message
  pub message: String,
}
