use crate::cli::Args;
use crate::errors::ConfigError;
use log::info;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(900);

#[derive(Debug, Clone)]
pub struct WidgetConfig {
    pub base_url: Url,
    pub send_delay: Duration,
    pub start_open: bool,
    pub health_check: bool,
}

impl WidgetConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            send_delay: DEFAULT_SEND_DELAY,
            start_open: false,
            health_check: true,
        })
    }

    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(&args.base_url)?,
            send_delay: Duration::from_millis(args.send_delay_ms),
            start_open: args.start_open,
            health_check: !args.skip_health_check,
        })
    }

    pub fn log_summary(&self) {
        info!("--- Widget Configuration ---");
        info!("Backend Base URL: {}", self.base_url);
        info!("Simulated Send Delay: {} ms", self.send_delay.as_millis());
        info!("Panel Open On Start: {}", self.start_open);
        info!("Startup Health Check: {}", self.health_check);
        info!("----------------------------");
    }
}

/// Parses the backend base URL. A trailing slash is added so endpoint paths join under it.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut url = Url::parse(trimmed).map_err(|source| ConfigError::BaseUrl {
        url: trimmed.to_string(),
        source,
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
