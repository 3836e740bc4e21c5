//! TeamCity service messages (`##teamcity[...]`).
//!
//! When TeamCity interaction is off every message degrades to its raw text so
//! local runs stay readable.

use std::fmt;

/// Escape a value for use inside a quoted service message attribute.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '\'' => out.push_str("|'"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStatus {
    Normal,
    Warning,
    Failure,
    Error,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageStatus::Normal => "NORMAL",
            MessageStatus::Warning => "WARNING",
            MessageStatus::Failure => "FAILURE",
            MessageStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressKind {
    Start,
    Finish,
    Message,
}

impl ProgressKind {
    fn message_name(self) -> &'static str {
        match self {
            ProgressKind::Start => "progressStart",
            ProgressKind::Finish => "progressFinish",
            ProgressKind::Message => "progressMessage",
        }
    }
}

/// Formats lines either as service messages or as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceMessages {
    pub teamcity: bool,
}

impl ServiceMessages {
    pub fn new(teamcity: bool) -> Self {
        Self { teamcity }
    }

    /// A plain message. Without status or details it is never wrapped.
    pub fn message(
        &self,
        text: &str,
        status: Option<MessageStatus>,
        error_details: Option<&str>,
    ) -> String {
        if !self.teamcity || (status.is_none() && error_details.is_none()) {
            return text.to_string();
        }

        let mut out = format!("##teamcity[message text='{}'", escape(text));
        if let Some(details) = error_details {
            out.push_str(&format!(" errorDetails='{}'", escape(details)));
        }
        if let Some(status) = status {
            out.push_str(&format!(" status='{}'", status));
        }
        out.push(']');
        out
    }

    pub fn progress(&self, text: &str, kind: ProgressKind) -> String {
        if !self.teamcity {
            return text.to_string();
        }
        format!("##teamcity[{} '{}']", kind.message_name(), escape(text))
    }

    pub fn statistic(&self, key: &str, value: &str) -> String {
        if !self.teamcity {
            return format!("{}: {}", key, value);
        }
        format!(
            "##teamcity[buildStatisticValue key='{}' value='{}']",
            escape(key),
            escape(value)
        )
    }
}
