use argon2::password_hash::{
  Output, PasswordHash as PhcString, PasswordHasher as _, Salt, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::domain::auth::errors::HashError;
use crate::domain::auth::ports::PasswordHasher;
use crate::domain::auth::value_objects::{Password, PasswordHash};
use crate::infrastructure::config::HashingConfig;

const MIN_SALT_LEN: usize = 8;
const MAX_SALT_LEN: usize = 48;

/// Cost parameters recovered from an encoded hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParameters {
  pub algorithm: Algorithm,
  pub version: Version,
  pub memory_cost_kib: u32,
  pub time_cost: u32,
  pub parallelism: u32,
  pub output_len: usize,
}

/// Parsed form of an encoded hash
struct DecodedHash {
  parameters: HashParameters,
  params: Params,
  salt: Vec<u8>,
  expected: Output,
}

/// Argon2id password hasher implementation
///
/// New hashes use the configured cost parameters and a fresh random salt.
/// Verification always uses the parameters encoded in the stored hash, so
/// hashes produced under older settings keep verifying after a change.
pub struct Argon2PasswordHasher {
  argon2: Argon2<'static>,
  params: Params,
  salt_len: usize,
}

impl Argon2PasswordHasher {
  /// Creates a new Argon2PasswordHasher with the specified parameters
  pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
    if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&config.salt_len) {
      return Err(HashError::InvalidParams(format!(
        "salt length must be between {} and {} bytes, got {}",
        MIN_SALT_LEN, MAX_SALT_LEN, config.salt_len
      )));
    }

    let params = Params::new(
      config.memory_cost_kib,
      config.time_cost,
      config.parallelism,
      Some(config.output_len),
    )
    .map_err(|e| HashError::InvalidParams(format!("Failed to create Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone());

    Ok(Self {
      argon2,
      params,
      salt_len: config.salt_len,
    })
  }

  /// Reads the cost parameters of an encoded hash without verifying anything
  pub fn inspect(&self, hashed_password: &PasswordHash) -> Result<HashParameters, HashError> {
    Ok(decode(hashed_password.as_str())?.parameters)
  }
}

impl PasswordHasher for Argon2PasswordHasher {
  /// Hashes a plain text password using Argon2id
  ///
  /// # Returns
  /// * `Ok(PasswordHash)` - `$argon2id$v=19$m=..,t=..,p=..$<salt>$<hash>`
  /// * `Err(HashError)` - If hashing fails
  fn hash(&self, password: &Password) -> Result<PasswordHash, HashError> {
    let mut salt_bytes = vec![0u8; self.salt_len];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
      .map_err(|e| HashError::HashingFailed(format!("Failed to encode salt: {}", e)))?;

    let hash = self
      .argon2
      .hash_password(password.as_str().as_bytes(), &salt)
      .map_err(|e| HashError::HashingFailed(format!("Failed to hash password: {}", e)))?;

    Ok(PasswordHash::from_encoded(hash.to_string()))
  }

  /// Verifies a plain text password against an encoded hash
  ///
  /// Re-derives the key with the stored algorithm, version, costs and salt,
  /// then compares in constant time.
  ///
  /// # Returns
  /// * `Ok(true)` - If the password matches
  /// * `Ok(false)` - If the password does not match
  /// * `Err(HashError::InvalidFormat)` - If the stored hash cannot be parsed
  fn verify(&self, password: &Password, hashed_password: &PasswordHash) -> Result<bool, HashError> {
    let decoded = decode(hashed_password.as_str())?;
    let argon2 = Argon2::new(
      decoded.parameters.algorithm,
      decoded.parameters.version,
      decoded.params,
    );

    let mut derived = Zeroizing::new(vec![0u8; decoded.expected.len()]);
    argon2
      .hash_password_into(password.as_str().as_bytes(), &decoded.salt, &mut derived)
      .map_err(|e| HashError::InvalidFormat(format!("Stored parameters are unusable: {}", e)))?;

    // Output's equality is constant-time
    Ok(Output::new(&derived)? == decoded.expected)
  }

  fn needs_rehash(&self, hashed_password: &PasswordHash) -> Result<bool, HashError> {
    let stored = decode(hashed_password.as_str())?.parameters;

    Ok(
      stored.algorithm != Algorithm::Argon2id
        || stored.version != Version::V0x13
        || stored.memory_cost_kib != self.params.m_cost()
        || stored.time_cost != self.params.t_cost()
        || stored.parallelism != self.params.p_cost()
        || Some(stored.output_len) != self.params.output_len(),
    )
  }
}

fn decode(encoded: &str) -> Result<DecodedHash, HashError> {
  let phc = PhcString::new(encoded)?;

  let algorithm = Algorithm::try_from(phc.algorithm)
    .map_err(|e| HashError::InvalidFormat(format!("Unsupported algorithm: {}", e)))?;

  let version = phc
    .version
    .ok_or_else(|| HashError::InvalidFormat("Missing version".to_string()))
    .and_then(|v| {
      Version::try_from(v).map_err(|e| HashError::InvalidFormat(format!("Bad version: {}", e)))
    })?;

  let memory_cost_kib = required_param(&phc, "m")?;
  let time_cost = required_param(&phc, "t")?;
  let parallelism = required_param(&phc, "p")?;

  let salt = phc
    .salt
    .ok_or_else(|| HashError::InvalidFormat("Missing salt".to_string()))?;
  let expected = phc
    .hash
    .ok_or_else(|| HashError::InvalidFormat("Missing derived key".to_string()))?;

  let mut salt_buf = [0u8; Salt::MAX_LENGTH];
  let salt = salt.decode_b64(&mut salt_buf)?.to_vec();

  let params = Params::new(memory_cost_kib, time_cost, parallelism, Some(expected.len()))
    .map_err(|e| HashError::InvalidFormat(format!("Invalid parameters: {}", e)))?;

  Ok(DecodedHash {
    parameters: HashParameters {
      algorithm,
      version,
      memory_cost_kib,
      time_cost,
      parallelism,
      output_len: expected.len(),
    },
    params,
    salt,
    expected,
  })
}

fn required_param(phc: &PhcString<'_>, name: &str) -> Result<u32, HashError> {
  phc
    .params
    .get_decimal(name)
    .ok_or_else(|| HashError::InvalidFormat(format!("Missing parameter '{}'", name)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use regex::Regex;

  // Produced by an independent Argon2id implementation
  const REFERENCE_HASH: &str =
    "$argon2id$v=19$m=1024,t=1,p=1$Y2FydGVkZXBvZXppaS0xNg$5CCdML6FaQfVQKPSlsunMVfeewHH65zAlKvwLdRnQLE";
  const REFERENCE_PASSWORD: &str = "correct horse battery staple";

  fn cheap_config() -> HashingConfig {
    HashingConfig {
      memory_cost_kib: 1024,
      time_cost: 1,
      parallelism: 1,
      output_len: 32,
      salt_len: 16,
    }
  }

  fn hasher() -> Argon2PasswordHasher {
    Argon2PasswordHasher::new(&cheap_config()).unwrap()
  }

  fn password(raw: &str) -> Password {
    Password::new(raw).unwrap()
  }

  #[test]
  fn test_hash_format() {
    let hash = hasher().hash(&password("test_password_123")).unwrap();

    let format = Regex::new(
      r"^\$argon2id\$v=19\$m=1024,t=1,p=1\$[A-Za-z0-9+/]{22}\$[A-Za-z0-9+/]{43}$",
    )
    .unwrap();
    assert!(format.is_match(hash.as_str()), "unexpected hash {}", hash);
  }

  #[test]
  fn test_verify_correct_password() {
    let hasher = hasher();
    let hash = hasher.hash(&password("test_password_123")).unwrap();

    assert!(hasher.verify(&password("test_password_123"), &hash).unwrap());
  }

  #[test]
  fn test_verify_incorrect_password() {
    let hasher = hasher();
    let hash = hasher.hash(&password("test_password_123")).unwrap();

    assert!(!hasher.verify(&password("wrong_password"), &hash).unwrap());
  }

  #[test]
  fn test_hash_produces_different_salts() {
    let hasher = hasher();
    let pwd = password("test_password_123");

    let hash1 = hasher.hash(&pwd).unwrap();
    let hash2 = hasher.hash(&pwd).unwrap();

    // Same password should produce different hashes due to random salt
    assert_ne!(hash1, hash2);
    assert!(hasher.verify(&pwd, &hash1).unwrap());
    assert!(hasher.verify(&pwd, &hash2).unwrap());
  }

  #[test]
  fn test_verify_reference_hash() {
    let hasher = hasher();
    let stored = PasswordHash::from_encoded(REFERENCE_HASH);

    assert!(hasher.verify(&password(REFERENCE_PASSWORD), &stored).unwrap());
    assert!(!hasher.verify(&password("correct horse battery stapler"), &stored).unwrap());
  }

  #[test]
  fn test_verify_uses_stored_parameters() {
    let legacy = Argon2PasswordHasher::new(&HashingConfig {
      memory_cost_kib: 2048,
      time_cost: 2,
      parallelism: 2,
      output_len: 24,
      salt_len: 8,
    })
    .unwrap();
    let hash = legacy.hash(&password("legacy_password")).unwrap();

    let current = hasher();
    assert!(current.verify(&password("legacy_password"), &hash).unwrap());
    assert!(current.needs_rehash(&hash).unwrap());
    assert!(!legacy.needs_rehash(&hash).unwrap());
  }

  #[test]
  fn test_inspect_parameters() {
    let params = hasher()
      .inspect(&PasswordHash::from_encoded(REFERENCE_HASH))
      .unwrap();

    assert_eq!(params.algorithm, Algorithm::Argon2id);
    assert_eq!(params.version, Version::V0x13);
    assert_eq!(params.memory_cost_kib, 1024);
    assert_eq!(params.time_cost, 1);
    assert_eq!(params.parallelism, 1);
    assert_eq!(params.output_len, 32);
  }

  #[test]
  fn test_verify_invalid_hash_format() {
    let hasher = hasher();
    let pwd = password("test_password_123");

    for bad in [
      "",
      "invalid_hash",
      "$argon2id$v=19$m=1024,t=1,p=1",
      "$argon2id$v=19$m=1024,t=1,p=1$Y2FydGVkZXBvZXppaS0xNg",
      "$argon2id$v=19$m=1024,t=1$Y2FydGVkZXBvZXppaS0xNg$5CCdML6FaQfVQKPSlsunMVfeewHH65zAlKvwLdRnQLE",
      "$argon2id$m=1024,t=1,p=1$Y2FydGVkZXBvZXppaS0xNg$5CCdML6FaQfVQKPSlsunMVfeewHH65zAlKvwLdRnQLE",
      "$bcrypt$v=19$m=1024,t=1,p=1$Y2FydGVkZXBvZXppaS0xNg$5CCdML6FaQfVQKPSlsunMVfeewHH65zAlKvwLdRnQLE",
      "$argon2id$v=19$m=1024,t=1,p=1$!!!!$5CCdML6FaQfVQKPSlsunMVfeewHH65zAlKvwLdRnQLE",
    ] {
      let result = hasher.verify(&pwd, &PasswordHash::from_encoded(bad));
      assert!(
        matches!(result, Err(HashError::InvalidFormat(_))),
        "expected InvalidFormat for {:?}, got {:?}",
        bad,
        result
      );
    }
  }

  #[test]
  fn test_truncated_hashes_never_panic() {
    let hasher = hasher();
    let pwd = password(REFERENCE_PASSWORD);

    for end in 0..REFERENCE_HASH.len() {
      let truncated = PasswordHash::from_encoded(&REFERENCE_HASH[..end]);
      match hasher.verify(&pwd, &truncated) {
        Ok(matched) => assert!(!matched, "truncated hash {:?} verified", truncated),
        Err(HashError::InvalidFormat(_)) => {}
        Err(e) => panic!("unexpected error for {:?}: {}", truncated, e),
      }
    }
  }

  #[test]
  fn test_invalid_configuration() {
    let mut config = cheap_config();
    config.salt_len = 4;
    assert!(matches!(
      Argon2PasswordHasher::new(&config),
      Err(HashError::InvalidParams(_))
    ));

    let mut config = cheap_config();
    config.parallelism = 0;
    assert!(matches!(
      Argon2PasswordHasher::new(&config),
      Err(HashError::InvalidParams(_))
    ));
  }
}
