use aes_gcm::{
  Aes256Gcm, Nonce,
  aead::{Aead, KeyInit, Payload},
};
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::domain::auth::errors::TokenError;
use crate::domain::auth::ports::{Clock, TokenSealer};

const VERSION: u8 = 0x80;
const TIMESTAMP_LEN: usize = 8;
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Ordered set of AES-256 keys. The first key seals new tokens; every key
/// is tried when opening, so retired keys keep working until removed.
pub struct KeyRing {
  ciphers: Vec<Aes256Gcm>,
}

impl KeyRing {
  /// Builds the ring from base64-encoded 32-byte keys, primary first
  ///
  /// # Example
  /// ```rust,ignore
  /// // Generate keys with: openssl rand -base64 32
  /// let ring = KeyRing::from_base64(&config.security.secret_keys)?;
  /// ```
  pub fn from_base64<S: AsRef<str>>(keys: &[S]) -> Result<Self, TokenError> {
    if keys.is_empty() {
      return Err(TokenError::InvalidKey(
        "At least one secret key must be configured".to_string(),
      ));
    }

    let ciphers = keys
      .iter()
      .enumerate()
      .map(|(position, key)| {
        let key_bytes = Zeroizing::new(
          general_purpose::STANDARD
            .decode(key.as_ref().trim())
            .map_err(|e| TokenError::InvalidKey(format!("Key {} decode failed: {}", position, e)))?,
        );

        if key_bytes.len() != KEY_LEN {
          return Err(TokenError::InvalidKey(format!(
            "Key {} must be exactly {} bytes, got {}",
            position,
            KEY_LEN,
            key_bytes.len()
          )));
        }

        Aes256Gcm::new_from_slice(&key_bytes)
          .map_err(|e| TokenError::InvalidKey(format!("Key {} rejected: {}", position, e)))
      })
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Self { ciphers })
  }

  pub fn len(&self) -> usize {
    self.ciphers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ciphers.is_empty()
  }

  fn primary(&self) -> Result<&Aes256Gcm, TokenError> {
    self
      .ciphers
      .first()
      .ok_or_else(|| TokenError::InvalidKey("Key ring is empty".to_string()))
  }
}

/// AES-256-GCM token envelope with an embedded creation time
///
/// Layout before URL-safe base64 encoding:
/// `version (1) | issued_at seconds, big endian (8) | nonce (12) | ciphertext + tag`.
/// The version byte and timestamp are authenticated as associated data.
pub struct AesGcmTokenSealer {
  keys: KeyRing,
  clock: Arc<dyn Clock>,
  max_clock_skew: Duration,
}

impl AesGcmTokenSealer {
  pub fn new(keys: KeyRing, clock: Arc<dyn Clock>, max_clock_skew: Duration) -> Self {
    Self {
      keys,
      clock,
      max_clock_skew,
    }
  }

  fn decrypt_with_any_key(&self, header: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
    let nonce = Nonce::from_slice(nonce);

    self.keys.ciphers.iter().find_map(|cipher| {
      cipher
        .decrypt(
          nonce,
          Payload {
            msg: ciphertext,
            aad: header,
          },
        )
        .ok()
    })
  }
}

impl TokenSealer for AesGcmTokenSealer {
  fn seal(&self, plaintext: &[u8]) -> Result<String, TokenError> {
    let issued_at = self.clock.now().timestamp();

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.push(VERSION);
    header.extend_from_slice(&issued_at.to_be_bytes());

    // Generate random 12-byte (96-bit) nonce
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = self
      .keys
      .primary()?
      .encrypt(
        nonce,
        Payload {
          msg: plaintext,
          aad: &header,
        },
      )
      .map_err(|e| TokenError::EncryptionFailed(format!("Encryption failed: {}", e)))?;

    let mut combined = header;
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(general_purpose::URL_SAFE_NO_PAD.encode(combined))
  }

  fn open(&self, token: &str, ttl: Duration) -> Result<Vec<u8>, TokenError> {
    let combined = general_purpose::URL_SAFE_NO_PAD
      .decode(token.trim())
      .map_err(|_| TokenError::InvalidSignature)?;

    if combined.len() < HEADER_LEN + NONCE_LEN + TAG_LEN || combined[0] != VERSION {
      return Err(TokenError::InvalidSignature);
    }

    let (header, rest) = combined.split_at(HEADER_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let plaintext = self
      .decrypt_with_any_key(header, nonce, ciphertext)
      .ok_or(TokenError::InvalidSignature)?;

    let mut timestamp = [0u8; TIMESTAMP_LEN];
    timestamp.copy_from_slice(&header[1..]);
    let issued_at = DateTime::<Utc>::from_timestamp(i64::from_be_bytes(timestamp), 0)
      .ok_or(TokenError::InvalidSignature)?;

    let now = self.clock.now();
    if issued_at - now > self.max_clock_skew {
      tracing::warn!("Token issued at {} lies in the future", issued_at);
      return Err(TokenError::InvalidSignature);
    }
    if now - issued_at > ttl {
      return Err(TokenError::Expired);
    }

    Ok(plaintext)
  }
}
