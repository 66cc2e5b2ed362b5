// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;
mod error;
mod input;
mod logger;

use std::io::BufRead;
use std::process::ExitCode;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use insights_pipeline::{IngestError, Pipeline, PipelineHandle};

use crate::config::ForwarderConfig;
use crate::error::ForwarderError;

/// Lines read ahead of the pipeline.
const LINE_BUFFER_SIZE: usize = 64;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ForwarderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("INSIGHTS | ERROR | {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&config.log_level) {
        eprintln!("INSIGHTS | ERROR | {e}");
        return ExitCode::FAILURE;
    }
    debug!("Logging subsystem enabled");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ForwarderConfig) -> Result<(), ForwarderError> {
    debug!("Starting forwarder with {config:?}");
    let pipeline = Pipeline::start(config.pipeline_config())?;

    let lines = spawn_line_reader(std::io::stdin());
    let forwarded = tokio::select! {
        result = forward_lines(lines, pipeline.handle()) => result,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupted, flushing pending events"),
                Err(e) => error!("Unable to listen for shutdown signal: {e}"),
            }
            Ok(0)
        }
    };

    // flush whatever was ingested even if reading failed
    let stats = pipeline.stop_and_flush().await?;
    let forwarded = forwarded?;
    info!("Forwarded {forwarded} events, {stats}");
    Ok(())
}

/// Reads `input` line by line on its own OS thread.
///
/// A blocking read cannot be cancelled, so it is kept off the runtime: once
/// the receiver is dropped the runtime can shut down while the thread is still
/// parked in `read`, and the thread ends with the process.
fn spawn_line_reader<R>(input: R) -> mpsc::Receiver<std::io::Result<String>>
where
    R: std::io::Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER_SIZE);
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::BufReader::new(input).lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        error!("Unable to start input reader thread: {e}");
    }
    rx
}

/// Ingests every line received until the reader reaches EOF. Returns the
/// number of events accepted by the pipeline.
async fn forward_lines(
    mut lines: mpsc::Receiver<std::io::Result<String>>,
    handle: PipelineHandle,
) -> Result<u64, ForwarderError> {
    let mut line_number: u64 = 0;
    let mut forwarded: u64 = 0;

    while let Some(line) = lines.recv().await {
        let line = line?;
        line_number += 1;

        let mut event = handle.new_event();
        match input::apply_line(&line, &mut event) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Skipping line {line_number}: {e}");
                continue;
            }
        }

        match handle.ingest(&event).await {
            Ok(()) => forwarded += 1,
            Err(IngestError::Closed) => {
                warn!("Pipeline closed, stopping input at line {line_number}");
                break;
            }
            Err(e) => warn!("Dropping line {line_number}: {e}"),
        }
    }

    debug!("Reached end of input after {line_number} lines");
    Ok(forwarded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use insights_pipeline::PipelineConfig;
    use std::io::Read;
    use std::time::{Duration, Instant};
    use tracing_test::traced_test;

    fn offline_config() -> PipelineConfig {
        PipelineConfig {
            collector_url: "http://127.0.0.1:9".to_string(),
            send_interval: Duration::from_secs(3600),
            shutdown_http_timeout: Duration::from_millis(200),
            ..PipelineConfig::new(1, "insert-key")
        }
    }

    /// Yields its data, then blocks every later read until the test ends.
    struct HeldOpen {
        data: std::io::Cursor<Vec<u8>>,
        release: std::sync::mpsc::Receiver<()>,
    }

    impl Read for HeldOpen {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                // parks like a terminal nobody types into
                let _ = self.release.recv();
            }
            Ok(n)
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_forward_lines_skips_bad_input() {
        let pipeline = Pipeline::start(offline_config()).unwrap();
        let input = b"{\"a\":1}\n\nnot json\n[1]\n{\"b\":\"two\"}\n".as_slice();

        let forwarded = forward_lines(spawn_line_reader(input), pipeline.handle())
            .await
            .unwrap();

        assert_eq!(forwarded, 2);
        assert_eq!(pipeline.stats().events_ingested, 2);
        assert!(logs_contain("Skipping line 3"));
        assert!(logs_contain("Skipping line 4"));
        pipeline.stop_and_flush().await.unwrap();
    }

    #[tokio::test]
    async fn test_forward_lines_stops_when_pipeline_closed() {
        let pipeline = Pipeline::start(offline_config()).unwrap();
        let handle = pipeline.handle();
        pipeline.stop_and_flush().await.unwrap();

        let forwarded = forward_lines(spawn_line_reader(b"{\"a\":1}\n".as_slice()), handle)
            .await
            .unwrap();
        assert_eq!(forwarded, 0);
    }

    #[test]
    fn test_runtime_shuts_down_while_input_is_held_open() {
        let (release_tx, release_rx) = std::sync::mpsc::channel();
        let input = HeldOpen {
            data: std::io::Cursor::new(b"{\"a\":1}\n".to_vec()),
            release: release_rx,
        };

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let stats = runtime.block_on(async {
            let pipeline = Pipeline::start(offline_config()).unwrap();
            let reading = forward_lines(spawn_line_reader(input), pipeline.handle());

            // the reader never reaches EOF, so stand in for Ctrl-C
            tokio::select! {
                _ = reading => panic!("input held open should not finish"),
                () = tokio::time::sleep(Duration::from_millis(200)) => {}
            }
            pipeline.stop_and_flush().await.unwrap()
        });

        let started = Instant::now();
        drop(runtime);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(stats.events_ingested, 1);

        release_tx.send(()).unwrap();
    }
}
