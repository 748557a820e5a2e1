pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod tokens;
pub mod value_objects;

// Re-export commonly used types
pub use entities::User;
pub use errors::{AuthError, HashError, RepositoryError, TokenError};
pub use ports::{Clock, PasswordHasher, TokenSealer, UserRepository};
pub use services::{AuthService, AuthServiceConfig};
pub use tokens::{AuthToken, ResetToken, TokenClaims, TokenKind, TokenLifetimes, TokenService};
pub use value_objects::{Email, Password, PasswordHash, TokenHash, ValueObjectError};
