use actix_web::{
  HttpResponse,
  error::ResponseError,
  http::{StatusCode, header::ContentType},
};
use serde::Serialize;
use std::fmt;

use crate::domain::auth::errors::{AuthError, HashError, RepositoryError, TokenError};
use crate::domain::pagination::PaginationError;

use super::dtos::ErrorResponse;

/// API error type that maps domain errors to HTTP responses
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum ApiError {
  /// Validation error (400 Bad Request)
  Validation(String),

  /// Authentication error (401, 403, 404 or 409)
  Auth(AuthErrorKind),

  /// Internal server error (500 Internal Server Error)
  Internal(String),
}

/// Authentication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthErrorKind {
  /// Invalid credentials (401)
  InvalidCredentials,

  /// Auth token invalid, expired or revoked (401)
  InvalidToken,

  /// Reset token invalid, expired or already used (400)
  InvalidResetToken,

  /// Reset token was issued for another email (400)
  EmailMismatch,

  /// Email already exists (409)
  EmailAlreadyExists,

  /// User not found (404)
  UserNotFound,

  /// Account locked after too many failed sign-ins (403)
  AccountLocked,
}

impl AuthErrorKind {
  fn code_and_message(self) -> (&'static str, &'static str) {
    match self {
      AuthErrorKind::InvalidCredentials => {
        ("invalid_credentials", "Invalid email and/or password")
      }
      AuthErrorKind::InvalidToken => (
        "invalid_token",
        "Invalid or missing authorization token",
      ),
      AuthErrorKind::InvalidResetToken => ("invalid_reset_token", "Invalid reset token"),
      AuthErrorKind::EmailMismatch => (
        "email_mismatch",
        "User email and reset token are a mismatch",
      ),
      AuthErrorKind::EmailAlreadyExists => (
        "email_already_exists",
        "An account with this email already exists",
      ),
      AuthErrorKind::UserNotFound => ("user_not_found", "User not found"),
      AuthErrorKind::AccountLocked => (
        "account_locked",
        "This account is locked. Reset your password to unlock it",
      ),
    }
  }
}

impl fmt::Display for ApiError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
      ApiError::Auth(kind) => write!(f, "Authentication error: {:?}", kind),
      ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
    }
  }
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Auth(kind) => match kind {
        AuthErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthErrorKind::InvalidResetToken => StatusCode::BAD_REQUEST,
        AuthErrorKind::EmailMismatch => StatusCode::BAD_REQUEST,
        AuthErrorKind::EmailAlreadyExists => StatusCode::CONFLICT,
        AuthErrorKind::UserNotFound => StatusCode::NOT_FOUND,
        AuthErrorKind::AccountLocked => StatusCode::FORBIDDEN,
      },
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let (error_type, message) = match self {
      ApiError::Validation(msg) => ("validation_error", msg.clone()),
      ApiError::Auth(kind) => {
        let (code, msg) = kind.code_and_message();
        (code, msg.to_string())
      }
      ApiError::Internal(msg) => {
        // Don't expose internal error details in production
        tracing::error!("Internal error: {}", msg);
        ("internal_error", "An internal server error occurred".to_string())
      }
    };

    let error_response = ErrorResponse {
      success: false,
      error: error_type.to_string(),
      message,
    };

    HttpResponse::build(status)
      .content_type(ContentType::json())
      .json(error_response)
  }
}

/// Convert AuthError to ApiError
impl From<AuthError> for ApiError {
  fn from(error: AuthError) -> Self {
    match error {
      AuthError::InvalidCredentials => ApiError::Auth(AuthErrorKind::InvalidCredentials),
      AuthError::EmailAlreadyExists => ApiError::Auth(AuthErrorKind::EmailAlreadyExists),
      AuthError::UserNotFound => ApiError::Auth(AuthErrorKind::UserNotFound),
      AuthError::AccountLocked => ApiError::Auth(AuthErrorKind::AccountLocked),
      AuthError::InvalidAuthToken => ApiError::Auth(AuthErrorKind::InvalidToken),
      AuthError::InvalidResetToken => ApiError::Auth(AuthErrorKind::InvalidResetToken),
      AuthError::EmailMismatch => ApiError::Auth(AuthErrorKind::EmailMismatch),
      AuthError::ValueObject(err) => ApiError::Validation(err.to_string()),
      AuthError::Token(err) => ApiError::from(err),
      AuthError::Hash(err) => ApiError::from(err),
      AuthError::Repository(err) => match err {
        RepositoryError::NotFound => ApiError::Auth(AuthErrorKind::UserNotFound),
        RepositoryError::DuplicateKey(_) => ApiError::Auth(AuthErrorKind::EmailAlreadyExists),
        RepositoryError::Conflict | RepositoryError::Storage(_) => {
          ApiError::Internal(err.to_string())
        }
      },
    }
  }
}

/// Token failures read as unauthenticated; key problems are server faults
impl From<TokenError> for ApiError {
  fn from(error: TokenError) -> Self {
    match error {
      TokenError::InvalidSignature
      | TokenError::Malformed(_)
      | TokenError::Expired
      | TokenError::WrongPurpose => ApiError::Auth(AuthErrorKind::InvalidToken),
      TokenError::InvalidKey(_) | TokenError::EncryptionFailed(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

impl From<HashError> for ApiError {
  fn from(error: HashError) -> Self {
    match error {
      HashError::InvalidFormat(_) => ApiError::Auth(AuthErrorKind::InvalidCredentials),
      HashError::HashingFailed(_) | HashError::InvalidParams(_) => {
        ApiError::Internal(error.to_string())
      }
    }
  }
}

impl From<PaginationError> for ApiError {
  fn from(error: PaginationError) -> Self {
    ApiError::Validation(error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  #[test]
  fn test_api_error_status_codes() {
    assert_eq!(
      ApiError::Validation("test".to_string()).status_code(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::InvalidCredentials).status_code(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::EmailAlreadyExists).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      ApiError::Auth(AuthErrorKind::AccountLocked).status_code(),
      StatusCode::FORBIDDEN
    );
    assert_eq!(
      ApiError::Internal("test".to_string()).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn test_auth_error_conversion() {
    let api_error: ApiError = AuthError::InvalidCredentials.into();
    assert_eq!(api_error.status_code(), StatusCode::UNAUTHORIZED);

    let api_error: ApiError = AuthError::EmailAlreadyExists.into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError = AuthError::Repository(RepositoryError::DuplicateKey("email".into())).into();
    assert_eq!(api_error.status_code(), StatusCode::CONFLICT);

    let api_error: ApiError = AuthError::Repository(RepositoryError::Conflict).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_token_error_conversion() {
    for error in [
      TokenError::InvalidSignature,
      TokenError::Malformed("missing field".to_string()),
      TokenError::Expired,
      TokenError::WrongPurpose,
    ] {
      let api_error: ApiError = AuthError::Token(error).into();
      assert_eq!(api_error.status_code(), StatusCode::UNAUTHORIZED);
    }

    let api_error: ApiError = TokenError::InvalidKey("short".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_hash_error_conversion() {
    let api_error: ApiError = HashError::InvalidFormat("truncated".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::UNAUTHORIZED);

    let api_error: ApiError = HashError::HashingFailed("oom".to_string()).into();
    assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn test_pagination_error_conversion() {
    let api_error: ApiError = PaginationError::AmbiguousAnchor.into();
    assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn test_error_response_body() {
    let response = ApiError::Auth(AuthErrorKind::InvalidToken).error_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "invalid_token");
  }

  #[tokio::test]
  async fn test_internal_error_hides_details() {
    let response = ApiError::Internal("connection refused at 10.0.0.3".to_string()).error_response();

    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "An internal server error occurred");
  }
}
