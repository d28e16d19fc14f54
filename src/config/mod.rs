use std::env;
use std::time::Duration;

use crate::identity::{DEFAULT_MAX_AGE_SECONDS, Identity};

const DEFAULT_USER_ENDPOINT: &str = "https://connect.linux.do/api/user";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub user_endpoint: String,
    pub identity_timeout_secs: u64,
    pub user_cache_secs: u64,
    pub session_cookie_name: String,
    pub session_sweep_interval_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub dev_user: Option<Identity>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let app_env = optional("APP_ENV").unwrap_or_else(|| "production".into());
        // 开发环境允许跳过 OAuth，直接使用配置的身份
        let dev_user = if app_env == "dev" {
            match optional("DEV_USER_USERNAME") {
                Some(username) => Some(Identity {
                    id: Some(parse_or("DEV_USER_ID", 1)?),
                    username,
                    trust_level: 0,
                    name: None,
                    avatar_template: None,
                }),
                None => None,
            }
        } else {
            None
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            server_host: required("SERVER_HOST")?,
            server_port: parse_or("SERVER_PORT", 3000)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".into()),
            user_endpoint: optional("LD_OAUTH_USER_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_USER_ENDPOINT.into()),
            identity_timeout_secs: parse_or("IDENTITY_TIMEOUT_SECS", 10)?,
            user_cache_secs: parse_or("USER_CACHE_SECONDS", DEFAULT_MAX_AGE_SECONDS)?,
            session_cookie_name: optional("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| "ld_session".into()),
            session_sweep_interval_secs: parse_or("SESSION_SWEEP_INTERVAL_SECS", 600)?,
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parse_or("RATE_LIMIT_REQUESTS", 100)?,
            dev_user,
        })
    }

    pub fn identity_timeout(&self) -> Duration {
        Duration::from_secs(self.identity_timeout_secs)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::Missing(var))
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/sitewatch_test".into(),
        redis_url: "redis://localhost".into(),
        server_host: "127.0.0.1".into(),
        server_port: 3000,
        api_base_uri: "/api".into(),
        user_endpoint: DEFAULT_USER_ENDPOINT.into(),
        identity_timeout_secs: 10,
        user_cache_secs: DEFAULT_MAX_AGE_SECONDS,
        session_cookie_name: "ld_session".into(),
        session_sweep_interval_secs: 600,
        rate_limit_window_secs: 60,
        rate_limit_requests: 100,
        dev_user: None,
    }
}
