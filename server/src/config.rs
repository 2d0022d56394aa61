use std::{fmt::Display, str::FromStr};

use anyhow::{Context, Result, anyhow};
use axum::http::HeaderValue;
use axum_extra::extract::cookie::Key;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use products_hr::{CountMode, HrConfig, ThemeMode};
use rand::RngCore;
use tracing::warn;

/// Bytes of key material a private cookie jar needs.
const COOKIE_KEY_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub hr: HrConfig,
    pub default_theme: ThemeMode,
    pub cookie_key: Key,
    pub cors_allowed_origins: Vec<String>,
    /// Mark the session cookie `Secure`; only set when served behind TLS.
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `load` reads the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = HrConfig::default();
        let hr = HrConfig {
            page_size: parse_var(&lookup, "HR_PAGE_SIZE", defaults.page_size)?,
            search_debounce_ms: parse_var(
                &lookup,
                "HR_SEARCH_DEBOUNCE_MS",
                defaults.search_debounce_ms,
            )?,
            simulate_latency: lookup("HR_LATENCY")
                .map(|val| flag("HR_LATENCY", &val))
                .transpose()?
                .unwrap_or(defaults.simulate_latency),
            count_mode: parse_var(&lookup, "HR_COUNT_MODE", CountMode::default())?,
        };
        if hr.page_size == 0 {
            return Err(anyhow!("HR_PAGE_SIZE must be at least 1"));
        }

        let default_theme = parse_var(&lookup, "HR_DEFAULT_THEME", ThemeMode::default())?;

        let cookie_key = match lookup("COOKIE_SECRET_BASE64") {
            Some(secret) => {
                let secret_bytes = STANDARD
                    .decode(secret.trim())
                    .context("invalid COOKIE_SECRET_BASE64")?;
                if secret_bytes.len() < COOKIE_KEY_LEN {
                    return Err(anyhow!(
                        "COOKIE_SECRET_BASE64 must decode to at least {COOKIE_KEY_LEN} bytes"
                    ));
                }
                Key::from(&secret_bytes[..COOKIE_KEY_LEN])
            }
            None => {
                warn!("COOKIE_SECRET_BASE64 unset; sessions will not survive a restart");
                let mut bytes = [0u8; COOKIE_KEY_LEN];
                rand::thread_rng().fill_bytes(&mut bytes);
                Key::from(&bytes)
            }
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();
        if cors_allowed_origins.is_empty() {
            return Err(anyhow!("CORS_ALLOWED_ORIGINS must list at least one origin"));
        }
        for origin in &cors_allowed_origins {
            if origin == "*" || origin.parse::<HeaderValue>().is_err() {
                return Err(anyhow!("invalid origin {origin:?} in CORS_ALLOWED_ORIGINS"));
            }
        }

        let secure_cookies = lookup("HR_SECURE_COOKIES")
            .map(|val| flag("HR_SECURE_COOKIES", &val))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            hr,
            default_theme,
            cookie_key,
            cors_allowed_origins,
            secure_cookies,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {key}={raw:?}: {err}")),
        None => Ok(default),
    }
}

fn flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("invalid {key}={other:?}: expected on or off")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.hr, HrConfig::default());
        assert_eq!(config.default_theme, ThemeMode::System);
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert!(!config.secure_cookies);
    }

    #[test]
    fn hr_settings_are_read_from_env() {
        let config = config_from(&[
            ("HR_PAGE_SIZE", "8"),
            ("HR_SEARCH_DEBOUNCE_MS", "50"),
            ("HR_LATENCY", "off"),
            ("HR_COUNT_MODE", "derived"),
            ("HR_DEFAULT_THEME", "dark"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("HR_SECURE_COOKIES", "on"),
        ])
        .unwrap();
        assert_eq!(config.hr.page_size, 8);
        assert_eq!(config.hr.search_debounce_ms, 50);
        assert!(!config.hr.simulate_latency);
        assert_eq!(config.hr.count_mode, CountMode::Derived);
        assert_eq!(config.default_theme, ThemeMode::Dark);
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert!(config.secure_cookies);
    }

    #[test]
    fn short_cookie_secret_is_rejected() {
        let short = STANDARD.encode([7u8; 32]);
        let err = config_from(&[("COOKIE_SECRET_BASE64", short.as_str())]).unwrap_err();
        assert!(err.to_string().contains("at least 64 bytes"));

        let long = STANDARD.encode([7u8; 64]);
        assert!(config_from(&[("COOKIE_SECRET_BASE64", long.as_str())]).is_ok());
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config_from(&[("HR_PAGE_SIZE", "lots")]).unwrap_err();
        assert!(err.to_string().contains("HR_PAGE_SIZE"));
        assert!(config_from(&[("HR_PAGE_SIZE", "0")]).is_err());
        assert!(config_from(&[("HR_LATENCY", "maybe")]).is_err());
    }

    #[test]
    fn cors_origins_must_be_explicit() {
        for raw in ["", " , ", "*", "https://ok.example,bad\u{1}origin"] {
            let err = config_from(&[("CORS_ALLOWED_ORIGINS", raw)]).unwrap_err();
            assert!(err.to_string().contains("CORS_ALLOWED_ORIGINS"), "{raw:?}");
        }
    }
}
