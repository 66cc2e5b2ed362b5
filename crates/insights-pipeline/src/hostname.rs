// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hostname detection for the `host` field of new events.

use tracing::warn;

/// Value used when the hostname cannot be determined.
pub const UNKNOWN_HOST: &str = "<unknown>";

/// Returns the system hostname, or [`UNKNOWN_HOST`].
#[must_use]
pub fn get_hostname() -> String {
    match nix::unistd::gethostname() {
        Ok(hostname) => match hostname.to_str() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                warn!("PIPELINE | System hostname is empty or not UTF-8, using '{UNKNOWN_HOST}'");
                UNKNOWN_HOST.to_string()
            }
        },
        Err(e) => {
            warn!("PIPELINE | Failed to get system hostname: {e}, using '{UNKNOWN_HOST}'");
            UNKNOWN_HOST.to_string()
        }
    }
}
