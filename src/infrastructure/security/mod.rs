mod argon2_hasher;
mod token_sealer;

pub use argon2_hasher::{Argon2PasswordHasher, HashParameters};
pub use token_sealer::{AesGcmTokenSealer, KeyRing};
