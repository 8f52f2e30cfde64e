//! Application configuration.
//!
//! Everything comes from the environment; `main` loads a `.env` file first
//! when present. [`Config::from_lookup`] takes any key lookup so tests never touch
//! the process environment.

use chrono::Duration as ChronoDuration;
use reqwest::Url;
use std::env;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::payment::CheckoutSettings;
use crate::webhook::DEFAULT_TIMEOUT;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body cap, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 200;

/// Default idle session lifetime, in minutes.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;

/// Default checkout API base.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

/// How the user is sent to pay.
#[derive(Debug, Clone)]
pub enum PaymentConfig {
    /// `PAYMENT_MODE=link`: fixed hosted checkout URL.
    StaticLink { url: Url },
    /// `PAYMENT_MODE=session`: checkout session created per submission.
    CheckoutSession(CheckoutSettings),
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_url: Url,
    pub webhook_timeout: Duration,
    pub payment: PaymentConfig,
    pub auto_redirect: bool,
    pub max_upload_bytes: usize,
    pub session_ttl: ChronoDuration,
}

impl Config {
    /// Load from the process environment. The binary loads `.env` first.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using `lookup` for every key. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let webhook_url = parse_http_url("WEBHOOK_URL", get("WEBHOOK_URL"))?;

        let webhook_timeout = Duration::from_secs(parse_number(
            "WEBHOOK_TIMEOUT_SECS",
            get("WEBHOOK_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT.as_secs(),
        )?);
        if webhook_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "WEBHOOK_TIMEOUT_SECS",
                message: "must be greater than zero".into(),
            });
        }

        let payment = match get("PAYMENT_MODE").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("link") => PaymentConfig::StaticLink {
                url: parse_http_url("PAYMENT_LINK", get("PAYMENT_LINK"))?,
            },
            Some("session") => PaymentConfig::CheckoutSession(CheckoutSettings {
                api_base: parse_http_url(
                    "STRIPE_API_BASE",
                    Some(get("STRIPE_API_BASE").unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string())),
                )?,
                secret_key: get("STRIPE_SECRET_KEY").ok_or(ConfigError::Missing("STRIPE_SECRET_KEY"))?,
                price_id: get("STRIPE_PRICE_ID").ok_or(ConfigError::Missing("STRIPE_PRICE_ID"))?,
                success_url: parse_http_url("CHECKOUT_SUCCESS_URL", get("CHECKOUT_SUCCESS_URL"))?.to_string(),
                cancel_url: parse_http_url("CHECKOUT_CANCEL_URL", get("CHECKOUT_CANCEL_URL"))?.to_string(),
            }),
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PAYMENT_MODE",
                    message: format!("expected 'link' or 'session', got '{other}'"),
                })
            }
        };

        let auto_redirect = match get("PAYMENT_AUTO_REDIRECT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("true") | Some("1") | Some("yes") | Some("on") => true,
            Some("false") | Some("0") | Some("no") | Some("off") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "PAYMENT_AUTO_REDIRECT",
                    message: format!("expected a boolean, got '{other}'"),
                })
            }
        };

        let port = parse_number("PORT", get("PORT"), DEFAULT_PORT)?;
        let max_upload_mb = parse_number("MAX_UPLOAD_MB", get("MAX_UPLOAD_MB"), DEFAULT_MAX_UPLOAD_MB)?;
        let ttl_minutes = parse_number(
            "SESSION_TTL_MINUTES",
            get("SESSION_TTL_MINUTES"),
            DEFAULT_SESSION_TTL_MINUTES,
        )?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SESSION_TTL_MINUTES",
                message: "must be greater than zero".into(),
            });
        }

        Ok(Self {
            port,
            webhook_url,
            webhook_timeout,
            payment,
            auto_redirect,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            session_ttl: ChronoDuration::minutes(ttl_minutes),
        })
    }
}

fn parse_http_url(key: &'static str, value: Option<String>) -> ConfigResult<Url> {
    let raw = value.ok_or(ConfigError::Missing(key))?;
    let url = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::Invalid {
            key,
            message: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: Option<String>, default: T) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            message: format!("'{raw}': {e}"),
        }),
    }
}
