//! Process-wide configuration read once at startup
//!
//! Values come from the environment, optionally seeded from a `.env` file.

use crate::provider::DEFAULT_BASE_URL;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider secret. Absence is only reported when a provider call is made.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub host: String,
    pub port: u16,
    /// Where the chat view sends its requests.
    pub relay_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            relay_url: DEFAULT_RELAY_URL.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid PORT value '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port,
            relay_url: non_empty("RELAY_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.relay_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        assert_eq!(config_from(&[]), Config::default());
        assert_eq!(Config::default().port, 8080);
        assert_eq!(Config::default().openai_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_reads_all_variables() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-123"),
            ("OPENAI_BASE_URL", "http://localhost:4000/v1"),
            ("HOST", "0.0.0.0"),
            ("PORT", "3000"),
            ("RELAY_URL", "http://relay.local:3000/"),
        ]);

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-123"));
        assert_eq!(config.openai_base_url, "http://localhost:4000/v1");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.relay_url, "http://relay.local:3000");
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        assert_eq!(config_from(&[("OPENAI_API_KEY", "   ")]).openai_api_key, None);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        assert_eq!(config_from(&[("PORT", "eighty")]).port, DEFAULT_PORT);
        assert_eq!(config_from(&[("PORT", "70000")]).port, DEFAULT_PORT);
    }
}
