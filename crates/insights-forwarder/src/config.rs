// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::str::FromStr;
use std::time::Duration;

use insights_pipeline::constants::{
    DEFAULT_COLLECTOR_URL, DEFAULT_EVENT_TYPE, DEFAULT_HTTP_TIMEOUT, SEND_INTERVAL,
    SEND_QUEUE_SIZE,
};
use insights_pipeline::PipelineConfig;

use crate::error::ForwarderError;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Forwarder settings, read from `INSIGHTS_*` environment variables
#[derive(Clone)]
pub struct ForwarderConfig {
    pub account_id: u64,
    pub app_id: Option<u64>,
    pub api_key: String,
    pub event_type: String,
    pub collector_url: String,
    pub send_interval: Duration,
    pub send_queue_size: usize,
    pub http_timeout: Duration,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl std::fmt::Debug for ForwarderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwarderConfig")
            .field("account_id", &self.account_id)
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("event_type", &self.event_type)
            .field("collector_url", &self.collector_url)
            .field("send_interval", &self.send_interval)
            .field("send_queue_size", &self.send_queue_size)
            .field("http_timeout", &self.http_timeout)
            .field("https_proxy", &self.https_proxy)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            account_id: 0,
            app_id: None,
            api_key: String::new(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            collector_url: DEFAULT_COLLECTOR_URL.to_string(),
            send_interval: SEND_INTERVAL,
            send_queue_size: SEND_QUEUE_SIZE,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            https_proxy: None,
            log_level: "info".to_string(),
        }
    }
}

impl ForwarderConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ForwarderError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ForwarderError> {
        let defaults = Self::default();

        let account_id = parse::<u64>(&lookup, "INSIGHTS_ACCOUNT_ID")?.ok_or_else(|| {
            ForwarderError::InvalidConfig("INSIGHTS_ACCOUNT_ID is not set".to_string())
        })?;
        let app_id = parse::<u64>(&lookup, "INSIGHTS_APP_ID")?;
        let api_key = lookup("INSIGHTS_API_KEY").unwrap_or_default();
        let event_type = lookup("INSIGHTS_EVENT_TYPE").unwrap_or(defaults.event_type);
        let collector_url = lookup("INSIGHTS_COLLECTOR_URL").unwrap_or(defaults.collector_url);
        let send_interval = parse::<u64>(&lookup, "INSIGHTS_SEND_INTERVAL_SECS")?
            .map_or(defaults.send_interval, Duration::from_secs);
        let send_queue_size =
            parse::<usize>(&lookup, "INSIGHTS_SEND_QUEUE_SIZE")?.unwrap_or(defaults.send_queue_size);
        let http_timeout = parse::<u64>(&lookup, "INSIGHTS_HTTP_TIMEOUT_SECS")?
            .map_or(defaults.http_timeout, Duration::from_secs);
        let https_proxy = lookup("INSIGHTS_PROXY_HTTPS").or_else(|| lookup("HTTPS_PROXY"));
        let log_level = lookup("INSIGHTS_LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);

        let config = Self {
            account_id,
            app_id,
            api_key,
            event_type,
            collector_url,
            send_interval,
            send_queue_size,
            http_timeout,
            https_proxy,
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ForwarderError> {
        if self.api_key.trim().is_empty() {
            return Err(ForwarderError::InvalidConfig(
                "INSIGHTS_API_KEY cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ForwarderError::InvalidConfig(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        self.pipeline_config().validate()?;
        Ok(())
    }

    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            app_id: self.app_id,
            event_type: self.event_type.clone(),
            collector_url: self.collector_url.clone(),
            send_interval: self.send_interval,
            send_queue_size: self.send_queue_size,
            http_timeout: self.http_timeout,
            https_proxy: self.https_proxy.clone(),
            ..PipelineConfig::new(self.account_id, self.api_key.clone())
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ForwarderError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            ForwarderError::InvalidConfig(format!("{key} has an invalid value '{raw}'"))
        }),
    }
}
