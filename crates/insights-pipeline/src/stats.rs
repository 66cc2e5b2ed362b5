// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Pipeline counters.
//!
//! Both background tasks bump these; nothing reads them on the hot path, so
//! every access uses relaxed atomics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PipelineStats {
    events_ingested: AtomicU64,
    events_dropped: AtomicU64,
    batches_formed: AtomicU64,
    batches_dropped: AtomicU64,
    batches_delivered: AtomicU64,
    delivery_failures: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn record_ingested(&self) {
        self.events_ingested.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_event_dropped(&self) {
        self.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_formed(&self) {
        self.batches_formed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Captures a point-in-time snapshot of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events_ingested: self.events_ingested.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            batches_formed: self.batches_formed.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}

/// Plain data representation of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Events accepted by `ingest`.
    pub events_ingested: u64,
    /// Accepted events too large to fit any batch.
    pub events_dropped: u64,
    /// Batches cut by the aggregator.
    pub batches_formed: u64,
    /// Batches discarded because the backlog or its hand-off channel was full.
    pub batches_dropped: u64,
    /// Batches the collector answered with 200.
    pub batches_delivered: u64,
    /// Failed delivery attempts, retries included.
    pub delivery_failures: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "events_ingested={}, events_dropped={}, batches_formed={}, batches_dropped={}, batches_delivered={}, delivery_failures={}",
            self.events_ingested,
            self.events_dropped,
            self.batches_formed,
            self.batches_dropped,
            self.batches_delivered,
            self.delivery_failures
        )
    }
}
