// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # Insights pipeline
//!
//! Collects discrete telemetry events, groups them into size and time bounded
//! batches, and posts those batches to an insights collector. Batches the
//! collector does not accept stay in a bounded backlog and are retried on
//! later passes.
//!
//! ## Architecture
//!
//! - [`event`]: event model and the event to record serializer
//! - [`aggregator`] / [`aggregator_service`]: batching by count, size and timer
//! - [`backlog`] / [`dispatcher_service`]: bounded retry queue and delivery loop
//! - [`flusher`] / [`http`]: one HTTP delivery attempt per batch
//! - [`pipeline`]: start-up, producer handle and ordered shutdown
//!
//! ```no_run
//! use insights_pipeline::{Pipeline, PipelineConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::start(PipelineConfig::new(12345, "insert-key"))?;
//! let mut event = pipeline.new_event();
//! event.set("duration", 0.25);
//! pipeline.ingest(&event).await?;
//! pipeline.stop_and_flush().await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod aggregator;
pub mod aggregator_service;
pub mod backlog;
pub mod config;
pub mod constants;
pub mod dispatcher_service;
pub mod errors;
pub mod event;
pub mod flusher;
/// Hostname lookup for the `host` event field
pub mod hostname;
pub mod http;
pub mod pipeline;
pub mod stats;

pub use config::PipelineConfig;
pub use errors::{DeliveryError, IngestError, PipelineError, SerializationError};
pub use event::{Event, FieldValue, Record};
pub use pipeline::{Pipeline, PipelineHandle};
pub use stats::StatsSnapshot;
