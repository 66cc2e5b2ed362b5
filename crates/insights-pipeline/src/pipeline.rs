// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Entry point tying the services together.
//!
//! [`Pipeline::start`] spawns the aggregator and dispatcher tasks and hands
//! back a [`Pipeline`] that owns them. Producers use [`PipelineHandle`], which
//! is cheap to clone and can be moved into other tasks.
//! [`Pipeline::stop_and_flush`] cancels the aggregator, waits for it to drain
//! and flush, then waits for the dispatcher to make its final delivery pass.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::aggregator_service::AggregatorService;
use crate::config::PipelineConfig;
use crate::dispatcher_service::DispatcherService;
use crate::errors::{IngestError, PipelineError};
use crate::event::{serialize, Event, Record};
use crate::flusher::Flusher;
use crate::hostname::get_hostname;
use crate::stats::{PipelineStats, StatsSnapshot};

/// Fields stamped on every event returned by `new_event`.
#[derive(Debug)]
struct EventDefaults {
    account_id: u64,
    app_id: Option<u64>,
    event_type: String,
    host: String,
}

/// Producer side of a running pipeline.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    events_tx: mpsc::Sender<Record>,
    defaults: Arc<EventDefaults>,
    stats: Arc<PipelineStats>,
}

impl PipelineHandle {
    /// Returns an event carrying `accountId`, `appId` (when set), `eventType`,
    /// `timestamp` and `host`. Callers may override any of them.
    #[must_use]
    pub fn new_event(&self) -> Event {
        let mut event = Event::new();
        event.set("accountId", self.defaults.account_id);
        if let Some(app_id) = self.defaults.app_id {
            event.set("appId", app_id);
        }
        event.set("eventType", self.defaults.event_type.as_str());
        event.set("timestamp", unix_timestamp());
        event.set("host", self.defaults.host.as_str());
        event
    }

    /// Serializes `event` and queues it for batching.
    ///
    /// Waits briefly if the event channel is full.
    ///
    /// # Errors
    ///
    /// [`IngestError::Serialization`] if the event cannot be encoded, in which
    /// case it is dropped. [`IngestError::Closed`] once shutdown has begun.
    pub async fn ingest(&self, event: &Event) -> Result<(), IngestError> {
        let record = serialize(event)?;
        self.events_tx
            .send(record)
            .await
            .map_err(|_| IngestError::Closed)?;
        self.stats.record_ingested();
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

/// A running pipeline.
#[derive(Debug)]
pub struct Pipeline {
    handle: PipelineHandle,
    shutdown: CancellationToken,
    aggregator_task: JoinHandle<()>,
    dispatcher_task: JoinHandle<()>,
}

impl Pipeline {
    /// Validates `config` and spawns both background tasks on the current
    /// tokio runtime.
    ///
    /// # Errors
    ///
    /// [`PipelineError::InvalidConfig`] for a bad configuration and
    /// [`PipelineError::Runtime`] when called outside a tokio runtime.
    pub fn start(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PipelineError::Runtime(e.to_string()))?;

        let flusher = Flusher::new(&config)?;
        let shutdown = CancellationToken::new();
        let stats = Arc::new(PipelineStats::default());

        let (dispatcher, batches_tx) =
            DispatcherService::new(&config, flusher, shutdown.clone(), Arc::clone(&stats));
        let (aggregator, events_tx) =
            AggregatorService::new(&config, batches_tx, shutdown.clone(), Arc::clone(&stats));

        let dispatcher_task = runtime.spawn(dispatcher.run());
        let aggregator_task = runtime.spawn(aggregator.run());

        let defaults = EventDefaults {
            account_id: config.account_id,
            app_id: config.effective_app_id(),
            event_type: config.event_type.clone(),
            host: get_hostname(),
        };

        debug!(
            "PIPELINE | Pipeline started, delivering to {}",
            config.events_url()
        );

        Ok(Self {
            handle: PipelineHandle {
                events_tx,
                defaults: Arc::new(defaults),
                stats,
            },
            shutdown,
            aggregator_task,
            dispatcher_task,
        })
    }

    /// A cloneable producer handle for use from other tasks.
    #[must_use]
    pub fn handle(&self) -> PipelineHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn new_event(&self) -> Event {
        self.handle.new_event()
    }

    /// See [`PipelineHandle::ingest`].
    ///
    /// # Errors
    ///
    /// Same as [`PipelineHandle::ingest`].
    pub async fn ingest(&self, event: &Event) -> Result<(), IngestError> {
        self.handle.ingest(event).await
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.handle.stats()
    }

    /// Stops accepting events, flushes everything buffered and makes a final
    /// delivery pass with the shutdown timeout. Returns the final counters.
    ///
    /// Handles cloned from this pipeline get [`IngestError::Closed`] from then
    /// on.
    ///
    /// # Errors
    ///
    /// [`PipelineError::TaskJoin`] if either background task panicked.
    pub async fn stop_and_flush(self) -> Result<StatsSnapshot, PipelineError> {
        debug!("PIPELINE | Stopping pipeline");
        self.shutdown.cancel();

        let aggregator = self.aggregator_task.await;
        let dispatcher = self.dispatcher_task.await;

        for (name, result) in [("aggregator", aggregator), ("dispatcher", dispatcher)] {
            if let Err(e) = result {
                error!("PIPELINE | {name} task failed: {e}");
                return Err(PipelineError::TaskJoin(format!("{name}: {e}")));
            }
        }

        let stats = self.handle.stats();
        info!("PIPELINE | Pipeline stopped: {stats}");
        Ok(stats)
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
