use anyhow::{Context, bail};
use base64::{Engine as _, engine::general_purpose};
use clap::{Parser, Subcommand, ValueEnum};
use rand::RngCore;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zeroize::Zeroizing;

use cartedepoezii::{
  domain::auth::{Password, PasswordHash, PasswordHasher, TokenService},
  infrastructure::{
    clock::SystemClock,
    config::Config,
    security::{AesGcmTokenSealer, Argon2PasswordHasher, KeyRing},
  },
};

#[derive(Parser)]
#[command(name = "cartedepoezii")]
#[command(about = "Operator tools for Carte de Poezii credentials and tokens", long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Print a fresh base64 secret key for `security.secret_keys`
  GenerateKey,
  /// Hash a password read from stdin with the configured parameters
  HashPassword,
  /// Check a password read from stdin against an encoded hash
  VerifyPassword {
    /// Encoded Argon2 hash
    hash: String,
  },
  /// Decode a token with the configured key ring and print its claims
  InspectToken {
    #[arg(value_enum)]
    kind: TokenKindArg,
    token: String,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenKindArg {
  Auth,
  Reset,
}

fn main() -> anyhow::Result<ExitCode> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Logs go to stderr so stdout stays machine readable
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartedepoezii=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::GenerateKey => {
      let mut key = Zeroizing::new([0u8; 32]);
      rand::rngs::OsRng.fill_bytes(&mut key[..]);
      println!("{}", general_purpose::STANDARD.encode(&key[..]));
      Ok(ExitCode::SUCCESS)
    }
    Commands::HashPassword => {
      let config = load_config()?;
      let hasher = Argon2PasswordHasher::new(&config.hashing)?;
      let password = Password::with_min_length(
        read_password()?.as_str(),
        config.security.password_min_length,
      )?;

      println!("{}", hasher.hash(&password)?);
      Ok(ExitCode::SUCCESS)
    }
    Commands::VerifyPassword { hash } => {
      let config = load_config()?;
      let hasher = Argon2PasswordHasher::new(&config.hashing)?;
      let stored = PasswordHash::from_encoded(hash.trim());
      let password = Password::with_min_length(read_password()?.as_str(), 0)?;

      let params = hasher.inspect(&stored)?;
      tracing::debug!(
        "Stored hash uses {:?} v{:?} m={} t={} p={} len={}",
        params.algorithm,
        params.version,
        params.memory_cost_kib,
        params.time_cost,
        params.parallelism,
        params.output_len
      );

      if !hasher.verify(&password, &stored)? {
        println!("invalid");
        return Ok(ExitCode::FAILURE);
      }

      if hasher.needs_rehash(&stored)? {
        println!("valid (rehash recommended)");
      } else {
        println!("valid");
      }
      Ok(ExitCode::SUCCESS)
    }
    Commands::InspectToken { kind, token } => {
      let config = load_config()?;
      let tokens = token_service(&config)?;

      match kind {
        TokenKindArg::Auth => {
          let claims = tokens.decode_auth_token(token.trim())?;
          println!("kind:    auth");
          println!("user:    {}", claims.user_id);
          println!("email:   {}", claims.email);
          println!("expires: {}", claims.expires_at.to_rfc3339());
        }
        TokenKindArg::Reset => {
          let claims = tokens.decode_reset_token(token.trim())?;
          println!("kind:    reset");
          println!("user:    {}", claims.user_id);
          println!("email:   {}", claims.email);
          println!("expires: {}", claims.expires_at.to_rfc3339());
        }
      }
      Ok(ExitCode::SUCCESS)
    }
  }
}

fn load_config() -> anyhow::Result<Config> {
  let config = Config::load().context("Failed to load configuration")?;
  tracing::debug!("Configuration loaded successfully");
  Ok(config)
}

fn token_service(config: &Config) -> anyhow::Result<TokenService> {
  let keys = KeyRing::from_base64(&config.security.secret_keys)
    .context("Invalid security.secret_keys")?;
  let clock = Arc::new(SystemClock);
  let sealer = AesGcmTokenSealer::new(keys, clock.clone(), config.security.max_clock_skew());

  Ok(TokenService::new(
    Arc::new(sealer),
    clock,
    config.security.token_lifetimes(),
  ))
}

/// Reads one line from stdin without its line terminator
fn read_password() -> anyhow::Result<Zeroizing<String>> {
  let mut line = Zeroizing::new(String::new());
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("Failed to read password from stdin")?;

  let password = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
  if password.is_empty() {
    bail!("No password given on stdin");
  }

  Ok(password)
}
