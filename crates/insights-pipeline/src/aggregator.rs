// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Accumulates serialized events into batches for delivery.
//!
//! Records are appended in arrival order. A batch is cut as soon as the
//! pending records pass the early-flush ratio of either per-call limit, so
//! that a POST never reaches the collector's hard limits:
//!
//! ```text
//!   count > ratio * max_events_per_call
//!   bytes > ratio * max_size_per_call
//! ```
//!
//! A record that would push the pending batch past a hard limit starts the
//! next batch instead. Batches are JSON arrays:
//!
//! ```json
//! [{"eventType":"Transaction","url":"/a"},{"eventType":"Transaction","url":"/b"}]
//! ```

use bytes::Bytes;
use tracing::warn;

use crate::event::Record;

/// A deliverable unit: records joined into one JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    payload: Bytes,
    records: usize,
}

impl Batch {
    /// Serialized JSON array, ready to be used as a request body.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records == 0
    }
}

/// Pending-batch state. Owned by a single task, see
/// [`crate::aggregator_service::AggregatorService`].
#[derive(Debug, Clone)]
pub struct Aggregator {
    pending: Vec<Record>,
    /// Sum of pending record sizes, separators excluded.
    pending_bytes: usize,
    max_events_per_call: usize,
    max_size_per_call: usize,
    early_flush_ratio: f64,
}

impl Aggregator {
    #[must_use]
    pub fn new(max_events_per_call: usize, max_size_per_call: usize, early_flush_ratio: f64) -> Self {
        Aggregator {
            pending: Vec::new(),
            pending_bytes: 0,
            max_events_per_call,
            max_size_per_call,
            early_flush_ratio,
        }
    }

    /// Appends a record, returning a batch if one had to be cut.
    ///
    /// At most one batch is returned per call. When the record did not fit
    /// the pending batch, the pending records are returned and the record
    /// opens the next batch. A record too large to fit any batch on its own
    /// is dropped.
    pub fn add(&mut self, record: Record) -> Option<Batch> {
        if !self.fits(&record) {
            warn!(
                "PIPELINE | Dropping event of {} bytes: exceeds the {} bytes per call limit",
                record.len(),
                self.max_size_per_call
            );
            return None;
        }

        let mut batch = None;
        if self.would_overflow(&record) {
            batch = self.flush();
        }

        self.pending_bytes += record.len();
        self.pending.push(record);

        if batch.is_none() && self.should_flush() {
            batch = self.flush();
        }
        batch
    }

    /// Whether `record` fits in a batch of its own.
    #[must_use]
    pub fn fits(&self, record: &Record) -> bool {
        // "[" + record + "]"
        record.len() + 2 <= self.max_size_per_call
    }

    /// Whether the pending records have passed the early-flush threshold.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let over_count = self.pending.len() as f64
            > self.max_events_per_call as f64 * self.early_flush_ratio;
        #[allow(clippy::cast_precision_loss)]
        let over_size =
            self.pending_bytes as f64 > self.max_size_per_call as f64 * self.early_flush_ratio;
        over_count || over_size || self.pending.len() >= self.max_events_per_call
    }

    /// Cuts a batch from everything pending. Returns `None` when nothing is
    /// pending; empty batches are never produced.
    pub fn flush(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }

        let mut payload = Vec::with_capacity(self.payload_len());
        payload.push(b'[');
        for (i, record) in self.pending.iter().enumerate() {
            if i > 0 {
                payload.push(b',');
            }
            payload.extend_from_slice(record.as_str().as_bytes());
        }
        payload.push(b']');

        let records = self.pending.len();
        self.pending.clear();
        self.pending_bytes = 0;

        Some(Batch {
            payload: Bytes::from(payload),
            records,
        })
    }

    /// Number of pending records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Sum of pending record sizes in bytes.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Size of the batch [`Aggregator::flush`] would produce right now.
    fn payload_len(&self) -> usize {
        // brackets plus one comma between each pair of records
        self.pending_bytes + self.pending.len() + 1
    }

    fn would_overflow(&self, record: &Record) -> bool {
        !self.pending.is_empty()
            && (self.pending.len() + 1 > self.max_events_per_call
                || self.payload_len() + 1 + record.len() > self.max_size_per_call)
    }
}
