pub mod dtos;
pub mod errors;

// Re-export commonly used types
pub use dtos::{
  AuthSessionResponse, ErrorResponse, PageQuery, PageResponse, PasswordResetRequest,
  ResetPasswordRequest, SignInRequest, SignUpRequest,
};
pub use errors::{ApiError, AuthErrorKind};
