use std::path::PathBuf;

use anyhow::Context;
use jsonwebtoken::Algorithm;

/// Shortest HMAC secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

/// Longest token lifetime accepted at startup (one year).
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub users_file: PathBuf,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .or_else(|_| std::env::var("SECRET_KEY"))
            .context("JWT_SECRET is not set; refusing to start without a signing secret")?;

        let jwt = JwtConfig {
            secret,
            algorithm: parse_algorithm(
                &std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            )?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "contract-gate".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "contract-gate-api".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        jwt.validate()?;

        let users_file = std::env::var("USERS_FILE")
            .map(PathBuf::from)
            .context("USERS_FILE is not set; a credential file is required")?;

        let port = std::env::var("APP_PORT")
            .or_else(|_| std::env::var("PORT"))
            .unwrap_or_else(|_| "3000".into());
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid port {port:?}"))?;

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            users_file,
            jwt,
        })
    }
}

impl JwtConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                self.secret.len()
            );
        }
        if !(1..=MAX_TTL_MINUTES).contains(&self.ttl_minutes) {
            anyhow::bail!(
                "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {}",
                self.ttl_minutes
            );
        }
        Ok(())
    }
}

// Only shared-secret algorithms make sense for a single HMAC secret.
fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => anyhow::bail!("unsupported JWT_ALGORITHM {other:?}"),
    }
}
