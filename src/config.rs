use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, Result};

/// Whether a signed-out client may still show the last cached profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestPolicy {
    /// Serve the cached profile read-only (web client behaviour).
    AllowStale,
    /// Show nothing until the user signs in (mobile client behaviour).
    RequireLogin,
}

impl FromStr for GuestPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow-stale" => Ok(GuestPolicy::AllowStale),
            "require-login" => Ok(GuestPolicy::RequireLogin),
            other => anyhow::bail!("unknown guest policy '{}'", other),
        }
    }
}

/// The client's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the identity service, always ending in `/`.
    pub api_base_url: String,
    /// Location of the credential file for this installation.
    pub credentials_path: PathBuf,
    /// Transport timeout for every request to the identity service.
    pub http_timeout: Duration,
    /// What a signed-out profile view returns.
    pub guest_policy: GuestPolicy,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("USERAUTH_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080/api/".to_string());

        let timeout_secs: u64 = env::var("USERAUTH_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid USERAUTH_HTTP_TIMEOUT_SECS")?;

        if timeout_secs == 0 {
            anyhow::bail!("USERAUTH_HTTP_TIMEOUT_SECS must be greater than zero");
        }

        let guest_policy: GuestPolicy = env::var("USERAUTH_GUEST_POLICY")
            .unwrap_or_else(|_| "require-login".to_string())
            .parse()
            .context("Invalid USERAUTH_GUEST_POLICY (expected allow-stale or require-login)")?;

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url),
            credentials_path: env::var("USERAUTH_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".userauth/credentials.json")),
            http_timeout: Duration::from_secs(timeout_secs),
            guest_policy,
        })
    }
}

/// Ensures the base URL ends with a slash so relative endpoint paths join under it.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}
