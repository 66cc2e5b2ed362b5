// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Background task that turns the record stream into batches.
//!
//! ```text
//!   producers ──records──> AggregatorService ──batches──> DispatcherService
//!                           (owns Aggregator)
//! ```
//!
//! The loop waits on whichever comes first: a record, the flush timer, or
//! shutdown. Batches are handed off with a non-blocking send; when the
//! dispatcher is backed up the batch is dropped rather than stalling
//! producers.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::aggregator::{Aggregator, Batch};
use crate::config::PipelineConfig;
use crate::event::Record;
use crate::stats::PipelineStats;

pub struct AggregatorService {
    aggregator: Aggregator,
    rx: mpsc::Receiver<Record>,
    batches_tx: mpsc::Sender<Batch>,
    send_interval: std::time::Duration,
    shutdown: CancellationToken,
    stats: Arc<PipelineStats>,
}

impl AggregatorService {
    /// Creates the service and the sender producers push records into.
    #[must_use]
    pub fn new(
        config: &PipelineConfig,
        batches_tx: mpsc::Sender<Batch>,
        shutdown: CancellationToken,
        stats: Arc<PipelineStats>,
    ) -> (Self, mpsc::Sender<Record>) {
        let (tx, rx) = mpsc::channel(config.event_buffer_size);
        let aggregator = Aggregator::new(
            config.max_events_per_call,
            config.max_size_per_call,
            config.early_flush_ratio,
        );

        let service = Self {
            aggregator,
            rx,
            batches_tx,
            send_interval: config.send_interval,
            shutdown,
            stats,
        };

        (service, tx)
    }

    /// Runs until shutdown is signalled or every record sender is dropped.
    ///
    /// Records already buffered in the channel when shutdown begins are
    /// still aggregated, and whatever is pending is flushed before the task
    /// exits. Returning drops the batch sender, which tells the dispatcher
    /// no more batches are coming.
    pub async fn run(mut self) {
        debug!("PIPELINE | Aggregator service started");

        // First tick one full interval from now, not immediately.
        let mut ticker = interval_at(Instant::now() + self.send_interval, self.send_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                record = self.rx.recv() => match record {
                    Some(record) => {
                        if let Some(batch) = self.aggregate(record) {
                            self.hand_off(batch);
                        }
                    }
                    None => break,
                },
                _ = ticker.tick() => {
                    if let Some(batch) = self.aggregator.flush() {
                        debug!("PIPELINE | Send interval elapsed, flushing {} events", batch.record_count());
                        self.hand_off(batch);
                    }
                }
            }
        }

        debug!("PIPELINE | Aggregator service shutting down");
        self.rx.close();
        while let Some(record) = self.rx.recv().await {
            if let Some(batch) = self.aggregate(record) {
                self.hand_off_final(batch).await;
            }
        }
        if let Some(batch) = self.aggregator.flush() {
            self.hand_off_final(batch).await;
        }

        debug!("PIPELINE | Aggregator service stopped");
    }

    fn aggregate(&mut self, record: Record) -> Option<Batch> {
        if !self.aggregator.fits(&record) {
            self.stats.record_event_dropped();
        }
        self.aggregator.add(record)
    }

    fn hand_off(&self, batch: Batch) {
        self.stats.record_formed();
        let records = batch.record_count();
        match self.batches_tx.try_send(batch) {
            Ok(()) => debug!("PIPELINE | Queued batch of {records} events"),
            Err(TrySendError::Full(_)) => {
                self.stats.record_dropped();
                warn!("PIPELINE | Send queue full, dropping batch of {records} events");
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.record_dropped();
                error!("PIPELINE | Dispatcher stopped, dropping batch of {records} events");
            }
        }
    }

    /// Producers are gone by now, so waiting for room is fine.
    async fn hand_off_final(&self, batch: Batch) {
        self.stats.record_formed();
        let records = batch.record_count();
        if self.batches_tx.send(batch).await.is_err() {
            self.stats.record_dropped();
            error!("PIPELINE | Dispatcher stopped, dropping final batch of {records} events");
        } else {
            debug!("PIPELINE | Queued final batch of {records} events");
        }
    }
}
