// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use insights_pipeline::PipelineError;

/// Errors that stop the forwarder
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ForwarderError::InvalidConfig("INSIGHTS_API_KEY is not set".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: INSIGHTS_API_KEY is not set"
        );
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let error: ForwarderError = PipelineError::TaskJoin("aggregator: panicked".to_string()).into();
        assert_eq!(error.to_string(), "Pipeline task failed: aggregator: panicked");
    }
}
