// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Default limits and timings for the insights pipeline.
//!
//! The per-call limits are imposed by the collector: a POST carrying more
//! events or more bytes than these values is rejected outright, so the
//! aggregator flushes once a pending batch crosses [`EARLY_FLUSH_RATIO`] of
//! either limit.

use std::time::Duration;

/// How often a partial batch is flushed when neither limit is reached.
pub const SEND_INTERVAL: Duration = Duration::from_secs(60);

/// Number of undelivered batches kept for retry.
///
/// `SEND_INTERVAL * SEND_QUEUE_SIZE` is how long the collector can be
/// unreachable before newly formed batches start being dropped (20 minutes
/// at the defaults).
pub const SEND_QUEUE_SIZE: usize = 20;

/// Maximum events per call accepted by the collector.
pub const MAX_EVENTS_PER_CALL: usize = 1000;

/// Maximum payload size per call accepted by the collector, in bytes.
pub const MAX_SIZE_PER_CALL: usize = 5_000_000;

/// Fraction of either per-call limit at which a batch is flushed early.
pub const EARLY_FLUSH_RATIO: f64 = 0.9;

/// Capacity of the producer-facing event channel.
///
/// Small on purpose: it only amortizes batching cost under bursts.
pub const EVENT_BUFFER_SIZE: usize = 10;

/// Request timeout while the pipeline is running.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Request timeout once shutdown has begun, bounding exit latency.
pub const SHUTDOWN_HTTP_TIMEOUT: Duration = Duration::from_secs(2);

/// Default collector base URL.
pub const DEFAULT_COLLECTOR_URL: &str = "https://insights-collector.newrelic.com";

/// Event type stamped on events created by [`crate::pipeline::Pipeline::new_event`].
pub const DEFAULT_EVENT_TYPE: &str = "Transaction";

/// Header carrying the insert key.
pub const INSERT_KEY_HEADER: &str = "X-Insert-Key";
