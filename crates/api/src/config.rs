use std::fmt;

use authgate_core::RotationSettings;
use ipnetwork::IpNetwork;

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token signing and lifetime settings.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key for access tokens (`JWT_SECRET`).
    pub jwt_secret: String,
    /// Access-token lifetime (`TOKEN_TTL`, default `15m`).
    pub token_ttl: chrono::Duration,
    /// Session lifetime (`REFRESH_TTL`, default `48h`).
    pub refresh_ttl: chrono::Duration,
    /// Security-alert sink (`WEBHOOK_URL`). Alerts are only logged when unset.
    pub webhook_url: Option<String>,
}

impl AuthConfig {
    pub fn rotation_settings(&self) -> RotationSettings {
        RotationSettings {
            token_ttl: self.token_ttl,
            refresh_ttl: self.refresh_ttl,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("webhook_url", &self.webhook_url)
            .finish()
    }
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How often expired sessions are purged (default: `3600`).
    pub session_sweep_interval_secs: u64,
    /// Peers allowed to set `X-Forwarded-For` / `X-Real-IP`, from the
    /// comma-separated `TRUSTED_PROXIES` env var (addresses or CIDRs).
    /// Empty by default: the socket peer is always the client address.
    pub trusted_proxies: Vec<IpNetwork>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `JWT_SECRET`                  | required                |
    /// | `TOKEN_TTL`                   | `15m`                   |
    /// | `REFRESH_TTL`                 | `48h`                   |
    /// | `WEBHOOK_URL`                 | unset                   |
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `8080`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `3600`                  |
    /// | `TRUSTED_PROXIES`             | empty                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl = duration_var("TOKEN_TTL", var("TOKEN_TTL"), "15m")?;
        let refresh_ttl = duration_var("REFRESH_TTL", var("REFRESH_TTL"), "48h")?;

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = number_var("PORT", var("PORT"), 8080)?;

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            number_var("REQUEST_TIMEOUT_SECS", var("REQUEST_TIMEOUT_SECS"), 30)?;
        let session_sweep_interval_secs = number_var(
            "SESSION_SWEEP_INTERVAL_SECS",
            var("SESSION_SWEEP_INTERVAL_SECS"),
            3600,
        )?;
        if session_sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_SWEEP_INTERVAL_SECS",
                reason: "must be greater than zero".into(),
            });
        }

        let trusted_proxies = var("TRUSTED_PROXIES")
            .map(|raw| parse_networks("TRUSTED_PROXIES", &raw))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session_sweep_interval_secs,
            trusted_proxies,
            auth: AuthConfig {
                jwt_secret,
                token_ttl,
                refresh_ttl,
                webhook_url: var("WEBHOOK_URL"),
            },
        })
    }
}

fn duration_var(
    name: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<chrono::Duration, ConfigError> {
    let raw = value.as_deref().unwrap_or(default);
    parse_duration(raw).map_err(|reason| ConfigError::Invalid { name, reason })
}

fn number_var<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

fn parse_networks(name: &'static str, raw: &str) -> Result<Vec<IpNetwork>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpNetwork>().map_err(|e| ConfigError::Invalid {
                name,
                reason: format!("'{s}': {e}"),
            })
        })
        .collect()
}

/// Parse a duration such as `90s`, `15m`, `48h`, `7d` or `1h30m`.
///
/// Units are `s`, `m`, `h` and `d`. The total must be positive.
pub fn parse_duration(input: &str) -> Result<chrono::Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".into());
    }

    let mut total = chrono::Duration::zero();
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if digits.is_empty() {
            return Err(format!("expected a number before '{c}' in '{input}'"));
        }
        let amount: i64 = digits
            .parse()
            .map_err(|e| format!("bad number in '{input}': {e}"))?;
        digits.clear();

        let part = match c {
            's' => chrono::Duration::try_seconds(amount),
            'm' => chrono::Duration::try_minutes(amount),
            'h' => chrono::Duration::try_hours(amount),
            'd' => chrono::Duration::try_days(amount),
            other => return Err(format!("unknown unit '{other}' in '{input}'")),
        }
        .ok_or_else(|| format!("'{input}' is out of range"))?;

        total = total
            .checked_add(&part)
            .ok_or_else(|| format!("'{input}' is out of range"))?;
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after '{digits}' in '{input}'"));
    }
    if total <= chrono::Duration::zero() {
        return Err(format!("'{input}' must be greater than zero"));
    }
    Ok(total)
}
