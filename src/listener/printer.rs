use crate::listener::{StatusEvent, TaskId, TaskNotificationListener};
use crate::teamcity::{MessageStatus, ServiceMessages};
use log::warn;
use parking_lot::Mutex;
use std::io::{self, Write};

/// Echoes task lifecycle and output to a console stream.
pub struct ConsolePrinter {
    messages: ServiceMessages,
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsolePrinter {
    pub fn new(messages: ServiceMessages, out: Box<dyn Write + Send>) -> Self {
        Self {
            messages,
            out: Mutex::new(out),
        }
    }

    pub fn stdout(messages: ServiceMessages) -> Self {
        Self::new(messages, Box::new(io::stdout()))
    }

    fn print(&self, line: &str) {
        let mut out = self.out.lock();
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("failed to write task output: {}", e);
        }
    }
}

impl TaskNotificationListener for ConsolePrinter {
    fn on_start(&self, id: &TaskId) {
        self.print(&format!("Start external system task {}", id));
    }

    fn on_status_change(&self, event: &StatusEvent) {
        self.print(&event.description);
    }

    fn on_task_output(&self, _id: &TaskId, text: &str, _stdout: bool) {
        self.print(text.trim_end_matches(['\r', '\n']));
    }

    fn on_end(&self, id: &TaskId) {
        self.print(&format!("End external system task {}", id));
    }

    fn on_success(&self, id: &TaskId) {
        self.print(&format!("Successfully finished external system task{}", id));
    }

    fn on_failure(&self, id: &TaskId, error: &anyhow::Error) {
        let details = format!("{:?}", error);
        self.print(&self.messages.message(
            &format!("External system task {} failed: {:#}", id, error),
            Some(MessageStatus::Error),
            Some(&details),
        ));
    }

    fn on_cancel(&self, id: &TaskId) {
        self.print(&format!("Cancelled {}", id));
    }
}
