use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use trial_api::state::SessionConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "changeme",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = get("TRIAL_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("TRIAL_JWT_SECRET is unset or still a placeholder; set it in .env and restart");
        }

        let db_path: PathBuf = get("TRIAL_DB_PATH").unwrap_or_else(|| "trial.db".into()).into();
        let host = get("TRIAL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("TRIAL_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("TRIAL_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("TRIAL_HOST '{}' is not a valid address", host))?;

        let ttl_days: i64 = get("TRIAL_SESSION_DAYS")
            .unwrap_or_else(|| "14".into())
            .parse()
            .context("TRIAL_SESSION_DAYS must be a whole number of days")?;
        if ttl_days < 1 {
            bail!("TRIAL_SESSION_DAYS must be at least 1");
        }

        let secure_cookies = matches!(
            get("TRIAL_SECURE_COOKIES").as_deref().map(str::trim),
            Some("1" | "true" | "yes" | "on")
        );

        Ok(Self {
            db_path,
            addr,
            session: SessionConfig {
                jwt_secret,
                ttl_days,
                secure_cookies,
            },
        })
    }
}
