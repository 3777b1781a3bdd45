// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{Result, SgaError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ONLINE_SECONDS: i64 = 120;
const DEFAULT_PLAYING_SECONDS: i64 = 120;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub url_root_production: String,
    pub url_root_stage: String,
    pub use_stage: bool,
    /// Sent as `Timezone` on every request that carries a form.
    pub timezone: Option<String>,
    pub log_debug_info: bool,
    pub timeout: Duration,
    pub online_seconds: i64,
    pub playing_seconds: i64,
}

impl ClientConfig {
    pub fn new(url_root: impl Into<String>) -> Self {
        let root = normalize_root(url_root.into());
        ClientConfig {
            url_root_production: root.clone(),
            url_root_stage: root,
            use_stage: false,
            timezone: None,
            log_debug_info: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            online_seconds: DEFAULT_ONLINE_SECONDS,
            playing_seconds: DEFAULT_PLAYING_SECONDS,
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let production = env::var("SGA_URL_ROOT_PRODUCTION")
            .map_err(|_| SgaError::configuration("SGA_URL_ROOT_PRODUCTION must be set"))?;
        let stage = env::var("SGA_URL_ROOT_STAGE").unwrap_or_else(|_| production.clone());

        let timeout_secs = match env::var("SGA_TIMEOUT_SECS") {
            Ok(value) => value.parse::<u64>()?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        let online_seconds = match env::var("SGA_ONLINE_SECONDS") {
            Ok(value) => value.parse::<i64>()?,
            Err(_) => DEFAULT_ONLINE_SECONDS,
        };
        let playing_seconds = match env::var("SGA_PLAYING_SECONDS") {
            Ok(value) => value.parse::<i64>()?,
            Err(_) => DEFAULT_PLAYING_SECONDS,
        };

        let config = ClientConfig {
            url_root_production: normalize_root(production),
            url_root_stage: normalize_root(stage),
            use_stage: env_flag("SGA_USE_STAGE"),
            timezone: env::var("SGA_TIMEZONE").ok().filter(|tz| !tz.is_empty()),
            log_debug_info: env_flag("SGA_LOG_DEBUG_INFO"),
            timeout: Duration::from_secs(timeout_secs),
            online_seconds,
            playing_seconds,
        };

        tracing::info!(
            "Gamification backend: {} (stage: {})",
            config.url_root(),
            config.use_stage
        );
        Ok(config)
    }

    pub fn with_stage(mut self, url_root_stage: impl Into<String>) -> Self {
        self.url_root_stage = normalize_root(url_root_stage.into());
        self.use_stage = true;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_debug_info(mut self, enabled: bool) -> Self {
        self.log_debug_info = enabled;
        self
    }

    pub fn url_root(&self) -> &str {
        if self.use_stage {
            &self.url_root_stage
        } else {
            &self.url_root_production
        }
    }

    pub fn get_url(&self, relative_url: &str) -> String {
        format!("{}{}", self.url_root(), relative_url.trim_start_matches('/'))
    }
}

fn normalize_root(mut root: String) -> String {
    if !root.ends_with('/') {
        root.push('/');
    }
    root
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
