//! Authentication use cases
//!
//! This module contains all authentication-related use cases that orchestrate
//! domain services to implement application-specific workflows.

mod get_current_user;
mod password_reset;
mod sign_in_user;
mod sign_up_user;

#[cfg(test)]
mod test_support;

pub use get_current_user::GetCurrentUserUseCase;
pub use password_reset::{
  RequestPasswordResetCommand, RequestPasswordResetResponse, RequestPasswordResetUseCase,
  ResetPasswordCommand, ResetPasswordUseCase,
};
pub use sign_in_user::{SignInUserCommand, SignInUserUseCase};
pub use sign_up_user::{AuthSession, SignUpUserCommand, SignUpUserUseCase};
