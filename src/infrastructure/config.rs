use chrono::Duration;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::domain::auth::{AuthServiceConfig, TokenLifetimes};
use crate::domain::pagination::{PaginationError, SpanLimits};

// Default value functions
fn default_auth_token_ttl() -> u64 {
  30 * 24 * 60 * 60
}

fn default_reset_token_ttl() -> u64 {
  5 * 60 * 60
}

fn default_max_clock_skew() -> u64 {
  60
}

fn default_password_min_length() -> usize {
  8
}

fn default_max_sign_in_attempts() -> u32 {
  5
}

fn default_memory_cost() -> u32 {
  64 * 1024
}

fn default_time_cost() -> u32 {
  1
}

fn default_parallelism() -> u32 {
  4
}

fn default_output_len() -> usize {
  32
}

fn default_salt_len() -> usize {
  16
}

fn default_span() -> usize {
  12
}

fn default_max_span() -> usize {
  100
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub security: SecurityConfig,
  #[serde(default)]
  pub hashing: HashingConfig,
  #[serde(default)]
  pub pagination: PaginationConfig,
}

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
  /// Base64-encoded 32-byte token keys, primary first.
  /// Generate with: openssl rand -base64 32
  #[serde(default)]
  pub secret_keys: Vec<String>,
  #[serde(default = "default_auth_token_ttl")]
  pub auth_token_ttl_seconds: u64,
  #[serde(default = "default_reset_token_ttl")]
  pub reset_token_ttl_seconds: u64,
  /// How far in the future a token's creation time may lie
  #[serde(default = "default_max_clock_skew")]
  pub max_clock_skew_seconds: u64,
  #[serde(default = "default_password_min_length")]
  pub password_min_length: usize,
  #[serde(default = "default_max_sign_in_attempts")]
  pub max_sign_in_attempts: u32,
}

/// Argon2 cost parameters for newly generated password hashes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HashingConfig {
  /// Memory cost in KiB
  #[serde(default = "default_memory_cost")]
  pub memory_cost_kib: u32,
  #[serde(default = "default_time_cost")]
  pub time_cost: u32,
  #[serde(default = "default_parallelism")]
  pub parallelism: u32,
  /// Derived key length in bytes
  #[serde(default = "default_output_len")]
  pub output_len: usize,
  /// Salt length in bytes
  #[serde(default = "default_salt_len")]
  pub salt_len: usize,
}

impl Default for HashingConfig {
  fn default() -> Self {
    Self {
      memory_cost_kib: default_memory_cost(),
      time_cost: default_time_cost(),
      parallelism: default_parallelism(),
      output_len: default_output_len(),
      salt_len: default_salt_len(),
    }
  }
}

/// Pagination configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
  #[serde(default = "default_span")]
  pub default_span: usize,
  #[serde(default = "default_max_span")]
  pub max_span: usize,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    Self {
      default_span: default_span(),
      max_span: default_max_span(),
    }
  }
}

impl SecurityConfig {
  pub fn token_lifetimes(&self) -> TokenLifetimes {
    TokenLifetimes {
      auth: seconds(self.auth_token_ttl_seconds),
      reset: seconds(self.reset_token_ttl_seconds),
    }
  }

  pub fn max_clock_skew(&self) -> Duration {
    seconds(self.max_clock_skew_seconds)
  }

  pub fn auth_service_config(&self) -> AuthServiceConfig {
    AuthServiceConfig {
      password_min_length: self.password_min_length,
      max_sign_in_attempts: self.max_sign_in_attempts,
      ..AuthServiceConfig::default()
    }
  }
}

impl PaginationConfig {
  pub fn span_limits(&self) -> Result<SpanLimits, PaginationError> {
    SpanLimits::new(self.default_span, self.max_span)
  }
}

fn seconds(value: u64) -> Duration {
  let max = i64::MAX / 1000;
  Duration::seconds(i64::try_from(value).unwrap_or(max).min(max))
}

impl Config {
  /// Load configuration from files and environment variables
  ///
  /// Configuration is loaded in the following order (later sources override earlier ones):
  /// 1. config/default.toml
  /// 2. config/local.toml (if exists)
  /// 3. config/{RUN_MODE}.toml (if exists)
  /// 4. Environment variables with CARTEDEPOEZII_ prefix
  ///
  /// # Environment Variables
  ///
  /// Environment variables use the CARTEDEPOEZII_ prefix and are separated by double underscores:
  /// - `CARTEDEPOEZII_SECURITY__SECRET_KEYS=<new key>,<old key>`
  /// - `CARTEDEPOEZII_SECURITY__AUTH_TOKEN_TTL_SECONDS=2592000`
  /// - `CARTEDEPOEZII_SECURITY__RESET_TOKEN_TTL_SECONDS=18000`
  /// - `CARTEDEPOEZII_SECURITY__MAX_SIGN_IN_ATTEMPTS=5`
  /// - `CARTEDEPOEZII_HASHING__MEMORY_COST_KIB=65536`
  /// - `CARTEDEPOEZII_PAGINATION__DEFAULT_SPAN=12`
  ///
  /// # Errors
  ///
  /// Returns a `ConfigError` if:
  /// - config/default.toml is missing or contains invalid TOML
  /// - Required configuration values are missing
  /// - Configuration values have invalid types
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    let config = ConfigBuilder::builder()
      .add_source(File::with_name("config/default").required(true))
      .add_source(File::with_name("config/local").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      // Use double underscore as separator: CARTEDEPOEZII_SECURITY__MAX_SIGN_IN_ATTEMPTS=5
      .add_source(
        Environment::with_prefix("CARTEDEPOEZII")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("security.secret_keys")
          .try_parsing(true),
      )
      .build()?;

    config.try_deserialize()
  }
}
