// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Delivers a single batch to the collector.
//!
//! ```text
//!   POST {collector}/v1/accounts/{account_id}/events
//!   X-Insert-Key: <api key>
//!   Content-Type: application/json
//!
//!   [{...},{...}]
//! ```
//!
//! Only a 200 counts as delivered. Every other outcome is a
//! [`DeliveryError`] and the caller keeps the batch for the next pass.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::aggregator::Batch;
use crate::config::PipelineConfig;
use crate::constants::INSERT_KEY_HEADER;
use crate::errors::{DeliveryError, PipelineError};
use crate::http::get_client;

#[derive(Debug, Clone)]
pub struct Flusher {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl Flusher {
    /// # Errors
    ///
    /// Fails when the API key cannot be carried in an HTTP header.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let mut api_key = HeaderValue::from_str(&config.api_key).map_err(|_| {
            PipelineError::InvalidConfig("api_key is not a valid header value".to_string())
        })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(INSERT_KEY_HEADER, api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client: get_client(config),
            url: config.events_url(),
            headers,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Makes one delivery attempt, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Any outcome other than a 200 response.
    pub async fn send(&self, batch: &Batch, timeout: Duration) -> Result<(), DeliveryError> {
        let request = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .headers(self.headers.clone())
            .body(batch.payload().clone())
            .build()
            .map_err(DeliveryError::Request)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        match response.text().await {
            Ok(body) => Err(DeliveryError::Status { status, body }),
            Err(source) => Err(DeliveryError::ResponseRead { status, source }),
        }
    }
}
