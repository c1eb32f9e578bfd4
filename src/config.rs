/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, 鍵サービス / アクセスサービスの URL など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub keys_service_url: Url,
    pub access_service_url: Url,

    pub token_leeway_seconds: u64,

    // None: every request goes to the remote service
    pub key_cache_ttl: Option<Duration>,
    pub access_cache_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let keys_service_url = service_url(&lookup, "KEYS_SERVICE_URL")?;
        let access_service_url = service_url(&lookup, "ACCESS_SERVICE_URL")?;

        let token_leeway_seconds = lookup("TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let key_cache_ttl = ttl(&lookup, "KEY_CACHE_TTL_SECONDS")?;
        let access_cache_ttl = ttl(&lookup, "ACCESS_CACHE_TTL_SECONDS")?;

        Ok(Self {
            addr,
            app_env,
            keys_service_url,
            access_service_url,
            token_leeway_seconds,
            key_cache_ttl,
            access_cache_ttl,
        })
    }
}

fn service_url<F>(lookup: &F, key: &'static str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))?;
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(key))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid(key));
    }
    Ok(url)
}

fn ttl<F>(lookup: &F, key: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(v) => {
            let seconds: u64 = v.trim().parse().map_err(|_| ConfigError::Invalid(key))?;
            Ok((seconds > 0).then(|| Duration::from_secs(seconds)))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("KEYS_SERVICE_URL", "http://keys.local"),
        ("ACCESS_SERVICE_URL", "http://access.local/v1"),
    ];

    #[test]
    fn defaults() {
        let config = config(&REQUIRED).unwrap();
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.keys_service_url.as_str(), "http://keys.local/");
        assert_eq!(config.access_service_url.as_str(), "http://access.local/v1");
        assert_eq!(config.token_leeway_seconds, 0);
        assert_eq!(config.key_cache_ttl, None);
        assert_eq!(config.access_cache_ttl, None);
    }

    #[test]
    fn missing_service_url() {
        let err = config(&[("KEYS_SERVICE_URL", "http://keys.local")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ACCESS_SERVICE_URL"));
    }

    #[test]
    fn invalid_service_url() {
        let err = config(&[
            ("KEYS_SERVICE_URL", "_http://failme.co"),
            ("ACCESS_SERVICE_URL", "http://access.local"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigError::Invalid("KEYS_SERVICE_URL"));
    }

    #[test]
    fn invalid_port() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));
        assert_eq!(config(&vars).unwrap_err(), ConfigError::Invalid("PORT"));
    }

    #[test]
    fn cache_ttls() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("KEY_CACHE_TTL_SECONDS", "300"));
        vars.push(("ACCESS_CACHE_TTL_SECONDS", "0"));
        let loaded = config(&vars).unwrap();
        assert_eq!(loaded.key_cache_ttl, Some(Duration::from_secs(300)));
        assert_eq!(loaded.access_cache_ttl, None);

        let mut vars = REQUIRED.to_vec();
        vars.push(("KEY_CACHE_TTL_SECONDS", "soon"));
        assert_eq!(
            config(&vars).unwrap_err(),
            ConfigError::Invalid("KEY_CACHE_TTL_SECONDS")
        );
    }

    #[test]
    fn production_env() {
        assert!(AppEnv::parse(Some("PROD")).is_production());
        assert!(AppEnv::parse(Some("production")).is_production());
        assert!(!AppEnv::parse(None).is_production());
    }
}
