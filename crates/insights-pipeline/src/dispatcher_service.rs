// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Background task that owns the backlog and delivers batches.
//!
//! Every incoming batch is appended to the backlog (or dropped if the backlog
//! is full) and then triggers a delivery pass over the whole backlog. Failed
//! batches stay where they are and get another attempt on the next pass.
//! When the batch channel closes, one final pass runs with the shortened
//! shutdown timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::aggregator::Batch;
use crate::backlog::Backlog;
use crate::config::PipelineConfig;
use crate::flusher::Flusher;
use crate::stats::PipelineStats;

pub struct DispatcherService {
    backlog: Backlog,
    rx: mpsc::Receiver<Batch>,
    flusher: Flusher,
    http_timeout: Duration,
    shutdown_http_timeout: Duration,
    shutdown: CancellationToken,
    stats: Arc<PipelineStats>,
}

impl DispatcherService {
    /// Creates the service and the sender the aggregator hands batches to.
    #[must_use]
    pub fn new(
        config: &PipelineConfig,
        flusher: Flusher,
        shutdown: CancellationToken,
        stats: Arc<PipelineStats>,
    ) -> (Self, mpsc::Sender<Batch>) {
        let (tx, rx) = mpsc::channel(config.send_queue_size);
        let service = Self {
            backlog: Backlog::new(config.send_queue_size),
            rx,
            flusher,
            http_timeout: config.http_timeout,
            shutdown_http_timeout: config.shutdown_http_timeout,
            shutdown,
            stats,
        };
        (service, tx)
    }

    /// Runs until every batch sender is dropped, then makes a final pass.
    pub async fn run(mut self) {
        debug!("PIPELINE | Dispatcher service started");

        while let Some(batch) = self.rx.recv().await {
            self.enqueue(batch);
            self.deliver_backlog().await;
        }

        debug!(
            "PIPELINE | Dispatcher draining {} pending batches",
            self.backlog.len()
        );
        self.deliver_backlog().await;

        if self.backlog.is_empty() {
            debug!("PIPELINE | Dispatcher service stopped");
        } else {
            warn!(
                "PIPELINE | Dispatcher stopped with {} undelivered batches",
                self.backlog.len()
            );
        }
    }

    fn enqueue(&mut self, batch: Batch) {
        let records = batch.record_count();
        if self.backlog.push_back(batch).is_err() {
            self.stats.record_dropped();
            warn!(
                "PIPELINE | Backlog full ({} batches), dropping batch of {records} events",
                self.backlog.capacity()
            );
        }
    }

    fn request_timeout(&self) -> Duration {
        if self.shutdown.is_cancelled() {
            self.shutdown_http_timeout
        } else {
            self.http_timeout
        }
    }

    /// One attempt per backlog entry, oldest first.
    async fn deliver_backlog(&mut self) {
        for _ in 0..self.backlog.len() {
            let Some(batch) = self.backlog.pop_front() else {
                break;
            };

            match self.flusher.send(&batch, self.request_timeout()).await {
                Ok(()) => {
                    self.stats.record_delivered();
                    debug!(
                        "PIPELINE | Delivered batch of {} events ({} bytes)",
                        batch.record_count(),
                        batch.len()
                    );
                }
                Err(e) => {
                    self.stats.record_delivery_failure();
                    warn!("PIPELINE | Failed to deliver batch: {e}; queueing for resend");
                    self.backlog.requeue(batch);
                }
            }
        }
    }
}
