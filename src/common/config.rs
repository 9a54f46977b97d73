// src/common/config.rs
//! Client configuration loaded from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Duration,
    pub validation_debounce: Duration,
    pub draft_autosave_debounce: Duration,
    pub draft_dir: PathBuf,
    pub query_stale_time: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_token: None,
            http_timeout: Duration::from_secs(30),
            validation_debounce: Duration::from_millis(500),
            draft_autosave_debounce: Duration::from_millis(1000),
            draft_dir: PathBuf::from("./.drafts"),
            query_stale_time: Duration::from_secs(300),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // API_BASE_URL - root of the directory REST API
        if let Ok(url) = env::var("API_BASE_URL") {
            let url = url.trim();
            if !url.is_empty() {
                config.api_base_url = url.trim_end_matches('/').to_string();
            }
        }

        // API_TOKEN - bearer token attached to authenticated requests
        config.api_token = env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty());

        if let Some(secs) = parse_u64("HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(secs);
        }

        // VALIDATION_DEBOUNCE_MS - quiet period before a changed field is validated
        if let Some(ms) = parse_u64("VALIDATION_DEBOUNCE_MS") {
            config.validation_debounce = Duration::from_millis(ms);
        }

        // DRAFT_AUTOSAVE_MS - quiet period before the registration draft is saved
        if let Some(ms) = parse_u64("DRAFT_AUTOSAVE_MS") {
            config.draft_autosave_debounce = Duration::from_millis(ms);
        }

        if let Ok(dir) = env::var("DRAFT_DIR") {
            if !dir.trim().is_empty() {
                config.draft_dir = PathBuf::from(dir);
            }
        }

        if let Some(secs) = parse_u64("QUERY_STALE_SECS") {
            config.query_stale_time = Duration::from_secs(secs);
        }

        config
    }
}

fn parse_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.validation_debounce, Duration::from_millis(500));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_config_from_env_overrides_and_ignores_garbage() {
        // Save original env vars
        let original_url = env::var("API_BASE_URL").ok();
        let original_debounce = env::var("VALIDATION_DEBOUNCE_MS").ok();

        env::set_var("API_BASE_URL", "https://api.nightlife.test/");
        env::set_var("VALIDATION_DEBOUNCE_MS", "not-a-number");

        let config = ClientConfig::from_env();
        assert_eq!(config.api_base_url, "https://api.nightlife.test");
        assert_eq!(config.validation_debounce, Duration::from_millis(500));

        // Restore
        match original_url {
            Some(val) => env::set_var("API_BASE_URL", val),
            None => env::remove_var("API_BASE_URL"),
        }
        match original_debounce {
            Some(val) => env::set_var("VALIDATION_DEBOUNCE_MS", val),
            None => env::remove_var("VALIDATION_DEBOUNCE_MS"),
        }
    }
}
