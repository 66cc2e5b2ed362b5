// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for the insights pipeline.
//!
//! Only [`IngestError`] and [`PipelineError`] ever reach a caller.
//! [`DeliveryError`] is produced by the dispatcher and logged, since nobody is
//! waiting on a batch by the time it is sent.

use reqwest::StatusCode;

/// An event could not be encoded as JSON.
#[derive(Debug, thiserror::Error)]
#[error("could not serialize event: {0}")]
pub struct SerializationError(#[from] pub serde_json::Error);

/// Returned by [`crate::pipeline::Pipeline::ingest`].
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    #[error("pipeline is shutting down, event rejected")]
    Closed,
}

/// A single delivery attempt failed. The batch stays in the backlog.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("failed to create http request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to send http request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("non-200 result: {status} [{body}]")]
    Status { status: StatusCode, body: String },

    #[error("non-200 result: {status}, failed to read response body: {source}")]
    ResponseRead {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },
}

impl DeliveryError {
    /// Status code returned by the collector, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } | Self::ResponseRead { status, .. } => Some(*status),
            Self::Request(_) | Self::Transport(_) => None,
        }
    }
}

/// Errors starting or stopping the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pipeline task failed: {0}")]
    TaskJoin(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}
