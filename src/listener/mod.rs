//! Task notification callbacks for an external system import.
//!
//! The host drives a task through start, status changes, streamed output and
//! one terminal outcome. Implementers override only the callbacks they need.

pub mod printer;

pub use printer::ConsolePrinter;

use std::fmt;
use std::sync::Arc;

/// Identifies one external system task, e.g. `RESOLVE_PROJECT:3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub kind: String,
    pub id: u64,
}

impl TaskId {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub task: TaskId,
    pub description: String,
}

pub trait TaskNotificationListener: Send + Sync {
    fn on_start(&self, _id: &TaskId) {}

    fn on_status_change(&self, _event: &StatusEvent) {}

    /// A chunk of console output; `stdout` is false for stderr.
    fn on_task_output(&self, _id: &TaskId, _text: &str, _stdout: bool) {}

    fn on_end(&self, _id: &TaskId) {}

    fn on_success(&self, _id: &TaskId) {}

    fn on_failure(&self, _id: &TaskId, _error: &anyhow::Error) {}

    fn before_cancel(&self, _id: &TaskId) {}

    fn on_cancel(&self, _id: &TaskId) {}
}

/// Forwards every callback to each listener, in registration order.
#[derive(Default, Clone)]
pub struct FanOut {
    listeners: Vec<Arc<dyn TaskNotificationListener>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn TaskNotificationListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl TaskNotificationListener for FanOut {
    fn on_start(&self, id: &TaskId) {
        self.listeners.iter().for_each(|l| l.on_start(id));
    }

    fn on_status_change(&self, event: &StatusEvent) {
        self.listeners.iter().for_each(|l| l.on_status_change(event));
    }

    fn on_task_output(&self, id: &TaskId, text: &str, stdout: bool) {
        self.listeners
            .iter()
            .for_each(|l| l.on_task_output(id, text, stdout));
    }

    fn on_end(&self, id: &TaskId) {
        self.listeners.iter().for_each(|l| l.on_end(id));
    }

    fn on_success(&self, id: &TaskId) {
        self.listeners.iter().for_each(|l| l.on_success(id));
    }

    fn on_failure(&self, id: &TaskId, error: &anyhow::Error) {
        self.listeners.iter().for_each(|l| l.on_failure(id, error));
    }

    fn before_cancel(&self, id: &TaskId) {
        self.listeners.iter().for_each(|l| l.before_cancel(id));
    }

    fn on_cancel(&self, id: &TaskId) {
        self.listeners.iter().for_each(|l| l.on_cancel(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl TaskNotificationListener for Recorder {
        fn on_start(&self, id: &TaskId) {
            self.seen.lock().push(format!("{} start {}", self.name, id));
        }

        fn on_task_output(&self, id: &TaskId, text: &str, stdout: bool) {
            self.seen
                .lock()
                .push(format!("{} output {} {:?} {}", self.name, id, text, stdout));
        }

        fn on_failure(&self, id: &TaskId, error: &anyhow::Error) {
            self.seen
                .lock()
                .push(format!("{} failure {} {}", self.name, id, error));
        }
    }

    #[test]
    fn task_id_display() {
        assert_eq!(TaskId::new("RESOLVE_PROJECT", 7).to_string(), "RESOLVE_PROJECT:7");
    }

    #[test]
    fn default_callbacks_are_no_ops() {
        struct Silent;
        impl TaskNotificationListener for Silent {}

        let id = TaskId::new("EXECUTE_TASK", 1);
        let s = Silent;
        s.on_start(&id);
        s.on_status_change(&StatusEvent {
            task: id.clone(),
            description: "x".to_string(),
        });
        s.on_task_output(&id, "x", true);
        s.on_end(&id);
        s.on_success(&id);
        s.on_failure(&id, &anyhow::anyhow!("boom"));
        s.before_cancel(&id);
        s.on_cancel(&id);
    }

    #[test]
    fn fan_out_forwards_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let fan = FanOut::new()
            .with(Arc::new(Recorder {
                name: "a",
                seen: Arc::clone(&seen),
            }))
            .with(Arc::new(Recorder {
                name: "b",
                seen: Arc::clone(&seen),
            }));

        let id = TaskId::new("T", 2);
        fan.on_start(&id);
        fan.on_task_output(&id, "hi", false);
        // Not overridden by Recorder.
        fan.on_end(&id);
        fan.on_failure(&id, &anyhow::anyhow!("boom"));

        assert_eq!(
            *seen.lock(),
            vec![
                "a start T:2",
                "b start T:2",
                "a output T:2 \"hi\" false",
                "b output T:2 \"hi\" false",
                "a failure T:2 boom",
                "b failure T:2 boom",
            ]
        );
    }
}
