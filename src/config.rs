use crate::format::AddressStyle;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // Backend endpoints
    pub api_url: String,
    pub push_url: String,

    // Synchronization
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub reconnect_delay_secs: u64,

    // Presentation
    pub notification_ttl_secs: u64,
    pub notification_capacity: usize,
    pub address_prefix: usize,
    pub address_suffix: usize,

    // System
    pub export_dir: PathBuf,
    pub log_file: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `http://host:port` -> `ws://host:port/socket.io/?EIO=4&transport=websocket`
pub fn derive_push_url(api_url: &str) -> Result<String> {
    let mut url = Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
    let scheme = match url.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| anyhow::anyhow!("Cannot derive push URL from {}", api_url))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url.to_string())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("SIGNALFORGE_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let push_url = match env::var("SIGNALFORGE_PUSH_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => derive_push_url(&api_url)?,
        };

        Ok(Config {
            api_url,
            push_url,

            poll_interval_secs: env_or("SIGNALFORGE_POLL_INTERVAL_SECS", 30),
            fetch_timeout_secs: env_or("SIGNALFORGE_FETCH_TIMEOUT_SECS", 15),
            reconnect_delay_secs: env_or("SIGNALFORGE_RECONNECT_DELAY_SECS", 5),

            notification_ttl_secs: env_or("SIGNALFORGE_NOTIFICATION_TTL_SECS", 5),
            notification_capacity: env_or("SIGNALFORGE_NOTIFICATION_CAPACITY", 5),
            address_prefix: env_or("SIGNALFORGE_ADDRESS_PREFIX", 8),
            address_suffix: env_or("SIGNALFORGE_ADDRESS_SUFFIX", 8),

            export_dir: env::var("SIGNALFORGE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            log_file: env::var("SIGNALFORGE_LOG_FILE")
                .unwrap_or_else(|_| "dashboard.log".to_string()),
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let api = Url::parse(&self.api_url).context("SIGNALFORGE_API_URL is not a valid URL")?;
        if !matches!(api.scheme(), "http" | "https") {
            anyhow::bail!("SIGNALFORGE_API_URL must use http or https");
        }

        let push = Url::parse(&self.push_url).context("SIGNALFORGE_PUSH_URL is not a valid URL")?;
        if !matches!(push.scheme(), "ws" | "wss") {
            anyhow::bail!("SIGNALFORGE_PUSH_URL must use ws or wss");
        }

        if !(10..=300).contains(&self.poll_interval_secs) {
            anyhow::bail!("SIGNALFORGE_POLL_INTERVAL_SECS must be between 10 and 300");
        }

        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("SIGNALFORGE_FETCH_TIMEOUT_SECS must be greater than 0");
        }

        if self.notification_ttl_secs == 0 {
            anyhow::bail!("SIGNALFORGE_NOTIFICATION_TTL_SECS must be greater than 0");
        }

        if self.notification_capacity == 0 {
            anyhow::bail!("SIGNALFORGE_NOTIFICATION_CAPACITY must be greater than 0");
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn address_style(&self) -> AddressStyle {
        AddressStyle {
            prefix: self.address_prefix,
            suffix: self.address_suffix,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            push_url: "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket".to_string(),
            poll_interval_secs: 30,
            fetch_timeout_secs: 15,
            reconnect_delay_secs: 5,
            notification_ttl_secs: 5,
            notification_capacity: 5,
            address_prefix: 8,
            address_suffix: 8,
            export_dir: PathBuf::from("."),
            log_file: "dashboard.log".to_string(),
        }
    }
}
