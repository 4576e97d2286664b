use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Process-wide configuration, read once at startup and immutable afterwards.
/// Every key resolves environment variable first, then `config.toml`, then a
/// hard default. `ODDS_API_KEY` is the one required key: the upstream rejects
/// unauthenticated requests, so starting without it would only defer the
/// failure to the first proxied call.
#[derive(Clone, Debug)]
pub struct Config {
    pub odds_api_key: String,
    pub odds_base_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_origin: Option<String>,
    pub environment: String,
    pub log_level: String,
    pub request_timeout: u64,
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfigRaw {
    odds_api_key: Option<String>,
    odds_base_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    frontend_origin: Option<String>,
    environment: Option<String>,
    log_level: Option<String>,
    request_timeout: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let toml_config = read_toml_config("config.toml")?.unwrap_or_default();

        let odds_api_key = env::var("ODDS_API_KEY")
            .ok()
            .or(toml_config.odds_api_key)
            .ok_or_else(|| {
                "ODDS_API_KEY not found in environment variables and config.toml".to_string()
            })?;

        let odds_base_url = env::var("ODDS_BASE_URL")
            .ok()
            .or(toml_config.odds_base_url)
            .unwrap_or_else(|| "https://api.the-odds-api.com".to_string());

        let host = env::var("HOST")
            .ok()
            .or(toml_config.host)
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let port = env_u16_with_fallback("PORT", toml_config.port.unwrap_or(3001));

        let frontend_origin =
            normalize_origin(env::var("FRONTEND_URL").ok().or(toml_config.frontend_origin));

        let environment = env::var("ENVIRONMENT")
            .ok()
            .or(toml_config.environment)
            .unwrap_or_else(|| "development".to_string());

        let log_level = env::var("LOG_LEVEL")
            .ok()
            .or(toml_config.log_level)
            .unwrap_or_else(|| "INFO".to_string());

        let request_timeout =
            env_u64_with_fallback("REQUEST_TIMEOUT", toml_config.request_timeout.unwrap_or(10));

        Ok(Self {
            odds_api_key,
            odds_base_url,
            host,
            port,
            frontend_origin,
            environment,
            log_level,
            request_timeout,
        })
    }
}

fn read_toml_config(path: &str) -> Result<Option<TomlConfigRaw>, String> {
    let config_path = Path::new(path);

    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path)
        .map_err(|error| format!("Failed to read {}: {}", config_path.display(), error))?;

    let parsed = toml::from_str::<TomlConfigRaw>(&content)
        .map_err(|error| format!("Failed to parse {}: {}", config_path.display(), error))?;

    Ok(Some(parsed))
}

fn normalize_origin(value: Option<String>) -> Option<String> {
    value
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty() && origin != "*")
}

fn env_u16_with_fallback(key: &str, fallback: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(fallback)
}

fn env_u64_with_fallback(key: &str, fallback: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(fallback)
}
