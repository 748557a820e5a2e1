//! Carte de Poezii backend core: cursor pagination over ordered listings,
//! sealed auth and password-reset tokens, and Argon2 password hashing.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
