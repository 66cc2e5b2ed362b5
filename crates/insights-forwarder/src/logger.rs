// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log line format for the forwarder.
//!
//! ```text
//! INSIGHTS | LEVEL | [span_name{span_fields}:] message {event_fields}
//! ```

use std::fmt;

use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::error::ForwarderError;

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "INSIGHTS | {} | ", metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                // the fmt layer stores formatted span fields on creation
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter directive for `log_level` with noisy HTTP and TLS internals muted.
#[must_use]
pub fn env_filter_directive(log_level: &str) -> String {
    format!("h2=off,hyper=off,rustls=off,{log_level}")
}

/// Installs the global subscriber, writing to stderr so stdin/stdout stay
/// free for event data.
pub fn init(log_level: &str) -> Result<(), ForwarderError> {
    let filter = EnvFilter::try_new(env_filter_directive(log_level))
        .map_err(|e| ForwarderError::InvalidConfig(format!("could not parse log level: {e}")))?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ForwarderError::InvalidConfig(format!("setting default subscriber failed: {e}")))
}
