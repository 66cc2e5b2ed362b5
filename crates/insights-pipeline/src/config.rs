// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::time::Duration;

use crate::constants;
use crate::errors::PipelineError;

/// Everything the pipeline needs, supplied by the caller at construction.
///
/// The library never reads the environment; see the forwarder binary for an
/// env-driven front end.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Account the events are recorded under.
    pub account_id: u64,
    /// Optional application id stamped on new events. Zero means unset.
    pub app_id: Option<u64>,
    /// Insert key sent with every batch.
    pub api_key: String,
    /// `eventType` stamped on new events.
    pub event_type: String,
    /// Collector base URL, without the `/v1/accounts/...` path.
    pub collector_url: String,
    /// Flush period for partial batches.
    pub send_interval: Duration,
    /// Backlog capacity, in batches.
    pub send_queue_size: usize,
    pub max_events_per_call: usize,
    pub max_size_per_call: usize,
    /// Fraction of the per-call limits at which a batch is cut early.
    pub early_flush_ratio: f64,
    /// Capacity of the producer-facing event channel.
    pub event_buffer_size: usize,
    pub http_timeout: Duration,
    /// Timeout used once shutdown has begun.
    pub shutdown_http_timeout: Duration,
    /// HTTPS proxy URL
    pub https_proxy: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            account_id: 0,
            app_id: None,
            api_key: String::new(),
            event_type: constants::DEFAULT_EVENT_TYPE.to_string(),
            collector_url: constants::DEFAULT_COLLECTOR_URL.to_string(),
            send_interval: constants::SEND_INTERVAL,
            send_queue_size: constants::SEND_QUEUE_SIZE,
            max_events_per_call: constants::MAX_EVENTS_PER_CALL,
            max_size_per_call: constants::MAX_SIZE_PER_CALL,
            early_flush_ratio: constants::EARLY_FLUSH_RATIO,
            event_buffer_size: constants::EVENT_BUFFER_SIZE,
            http_timeout: constants::DEFAULT_HTTP_TIMEOUT,
            shutdown_http_timeout: constants::SHUTDOWN_HTTP_TIMEOUT,
            https_proxy: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("account_id", &self.account_id)
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("event_type", &self.event_type)
            .field("collector_url", &self.collector_url)
            .field("send_interval", &self.send_interval)
            .field("send_queue_size", &self.send_queue_size)
            .field("max_events_per_call", &self.max_events_per_call)
            .field("max_size_per_call", &self.max_size_per_call)
            .field("early_flush_ratio", &self.early_flush_ratio)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("http_timeout", &self.http_timeout)
            .field("shutdown_http_timeout", &self.shutdown_http_timeout)
            .field("https_proxy", &self.https_proxy)
            .finish()
    }
}

impl PipelineConfig {
    /// Convenience constructor filling in every default.
    #[must_use]
    pub fn new(account_id: u64, api_key: impl Into<String>) -> Self {
        Self {
            account_id,
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Full URL batches are posted to.
    #[must_use]
    pub fn events_url(&self) -> String {
        format!(
            "{}/v1/accounts/{}/events",
            self.collector_url.trim_end_matches('/'),
            self.account_id
        )
    }

    /// `app_id` with the zero sentinel folded into `None`.
    #[must_use]
    pub fn effective_app_id(&self) -> Option<u64> {
        self.app_id.filter(|id| *id != 0)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.api_key.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "api_key cannot be empty".to_string(),
            ));
        }

        if self.collector_url.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "collector_url cannot be empty".to_string(),
            ));
        }

        if self.event_type.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "event_type cannot be empty".to_string(),
            ));
        }

        let counts = [
            ("send_queue_size", self.send_queue_size),
            ("max_events_per_call", self.max_events_per_call),
            ("max_size_per_call", self.max_size_per_call),
            ("event_buffer_size", self.event_buffer_size),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        let durations = [
            ("send_interval", self.send_interval),
            ("http_timeout", self.http_timeout),
            ("shutdown_http_timeout", self.shutdown_http_timeout),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if !(self.early_flush_ratio > 0.0 && self.early_flush_ratio <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "early_flush_ratio must be in (0, 1], got {}",
                self.early_flush_ratio
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        PipelineConfig::new(12345, "insert-key")
    }

    #[test]
    fn test_defaults_match_collector_limits() {
        let config = PipelineConfig::default();
        assert_eq!(config.send_interval, Duration::from_secs(60));
        assert_eq!(config.send_queue_size, 20);
        assert_eq!(config.max_events_per_call, 1000);
        assert_eq!(config.max_size_per_call, 5_000_000);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_http_timeout, Duration::from_secs(2));
        assert_eq!(config.event_type, "Transaction");
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_default_config_requires_api_key() {
        assert!(PipelineConfig::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = PipelineConfig {
            send_queue_size: 0,
            ..valid_config()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: send_queue_size must be greater than 0"
        );

        let config = PipelineConfig {
            max_events_per_call: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = PipelineConfig {
            send_interval: Duration::ZERO,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_flush_ratio_bounds() {
        for ratio in [0.0, -0.5, 1.01, f64::NAN] {
            let config = PipelineConfig {
                early_flush_ratio: ratio,
                ..valid_config()
            };
            assert!(config.validate().is_err(), "ratio {ratio} should be rejected");
        }
        let config = PipelineConfig {
            early_flush_ratio: 1.0,
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_events_url() {
        let mut config = valid_config();
        assert_eq!(
            config.events_url(),
            "https://insights-collector.newrelic.com/v1/accounts/12345/events"
        );

        config.collector_url = "http://127.0.0.1:8080/".to_string();
        assert_eq!(
            config.events_url(),
            "http://127.0.0.1:8080/v1/accounts/12345/events"
        );
    }

    #[test]
    fn test_effective_app_id() {
        let mut config = valid_config();
        assert_eq!(config.effective_app_id(), None);
        config.app_id = Some(0);
        assert_eq!(config.effective_app_id(), None);
        config.app_id = Some(42);
        assert_eq!(config.effective_app_id(), Some(42));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug_str = format!("{:?}", valid_config());
        assert!(!debug_str.contains("insert-key"));
        assert!(debug_str.contains("<redacted>"));
    }
}
