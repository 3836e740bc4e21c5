//! Replay captured task output logs through a listener, one task per log.
//!
//! Each log streams on its own thread so several imports feed the same
//! listeners concurrently, the way parallel host tasks do.

use crate::listener::{StatusEvent, TaskId, TaskNotificationListener};
use anyhow::Context;
use log::{error, info};
use std::any::Any;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::thread;

/// Reads standard input instead of a file.
pub const STDIN_SOURCE: &str = "-";

pub const TASK_KIND: &str = "RESOLVE_PROJECT";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub tasks: usize,
    pub failed: usize,
    pub lines: u64,
}

pub fn replay_logs(sources: &[String], listener: &dyn TaskNotificationListener) -> ReplaySummary {
    let outcomes: Vec<Option<u64>> = thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let id = TaskId::new(TASK_KIND, i as u64 + 1);
                scope.spawn(move || replay_one(&id, source, listener))
            })
            .collect();

        handles
            .into_iter()
            .zip(sources)
            .map(|(h, source)| match h.join() {
                Ok(outcome) => outcome,
                Err(payload) => {
                    error!(
                        "replay of {} panicked: {}",
                        source,
                        panic_message(payload.as_ref())
                    );
                    None
                }
            })
            .collect()
    });

    let mut summary = ReplaySummary {
        tasks: sources.len(),
        ..ReplaySummary::default()
    };
    for outcome in outcomes {
        match outcome {
            Some(lines) => summary.lines += lines,
            None => summary.failed += 1,
        }
    }
    summary
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Drive one task through its lifecycle. Returns the line count on success.
fn replay_one(id: &TaskId, source: &str, listener: &dyn TaskNotificationListener) -> Option<u64> {
    listener.on_start(id);
    listener.on_status_change(&StatusEvent {
        task: id.clone(),
        description: format!("Reading task output from {}", source),
    });

    let outcome = match stream_lines(id, source, listener) {
        Ok(lines) => {
            info!("task {}: replayed {} lines from {}", id, lines, source);
            listener.on_success(id);
            Some(lines)
        }
        Err(e) => {
            error!("task {}: {:#}", id, e);
            listener.on_failure(id, &e);
            None
        }
    };
    listener.on_end(id);
    outcome
}

fn stream_lines(
    id: &TaskId,
    source: &str,
    listener: &dyn TaskNotificationListener,
) -> anyhow::Result<u64> {
    let mut reader: Box<dyn BufRead> = if source == STDIN_SOURCE {
        Box::new(io::stdin().lock())
    } else {
        let f = File::open(source).with_context(|| format!("open task output log {}", source))?;
        Box::new(BufReader::new(f))
    };

    let mut buf = Vec::new();
    let mut lines = 0u64;
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read task output log {}", source))?;
        if n == 0 {
            break;
        }
        // Gradle output is not guaranteed to be valid UTF-8.
        let text = String::from_utf8_lossy(&buf);
        listener.on_task_output(id, &text, true);
        lines += 1;
    }
    Ok(lines)
}
