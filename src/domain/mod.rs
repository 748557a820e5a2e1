pub mod auth;
pub mod pagination;
pub mod social;

// Re-export auth module for easier access
pub use auth::*;
