// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP client construction.
//!
//! The client carries no global timeout: the dispatcher sets one per request
//! so it can shorten it once shutdown begins.

use core::time::Duration;

use tracing::error;

use crate::config::PipelineConfig;

/// Builds the client used for deliveries.
///
/// An invalid proxy is logged and ignored rather than failing startup.
#[must_use]
pub fn get_client(config: &PipelineConfig) -> reqwest::Client {
    let proxy = match config.https_proxy.as_deref().map(reqwest::Proxy::https) {
        None => None,
        Some(Ok(proxy)) => Some(proxy),
        Some(Err(e)) => {
            error!(
                "PIPELINE | Unable to parse proxy configuration: {e}, falling back to direct connection"
            );
            None
        }
    };

    match build_client(proxy) {
        Ok(client) => client,
        Err(e) => {
            error!("PIPELINE | Failed to build HTTP client: {e}, using reqwest defaults");
            reqwest::Client::new()
        }
    }
}

fn build_client(proxy: Option<reqwest::Proxy>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .pool_idle_timeout(Some(Duration::from_secs(270)))
        .tcp_keepalive(Some(Duration::from_secs(120)));

    if let Some(proxy) = proxy {
        builder = builder.proxy(proxy);
    }

    builder.build()
}
