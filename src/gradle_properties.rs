//! Turn on Gradle model builder performance statistics for a project.
//!
//! The tooling layer only prints performance statistics when the Gradle
//! daemon JVM runs with the perf property, so it has to go into
//! `org.gradle.jvmargs` in the project's `gradle.properties`.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const PERF_PROPERTY: &str = "-Didea.gradle.custom.tooling.perf=true";

const JVM_ARGS_KEY: &str = "org.gradle.jvmargs=";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesChange {
    /// The property was already there; the file is untouched.
    AlreadyEnabled,
    /// Appended to an existing `org.gradle.jvmargs` line.
    ExtendedJvmArgs,
    /// Added a new `org.gradle.jvmargs` line.
    AddedJvmArgs,
}

pub fn properties_path(project: &Path) -> PathBuf {
    project.join("gradle.properties")
}

/// Make sure `<project>/gradle.properties` passes the perf property to the daemon.
pub fn enable_model_builder_statistics(project: &Path) -> anyhow::Result<PropertiesChange> {
    let path = properties_path(project);
    let content = if path.exists() {
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?
    } else {
        String::new()
    };

    if content.contains(PERF_PROPERTY) {
        return Ok(PropertiesChange::AlreadyEnabled);
    }

    let mut extended = false;
    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with(JVM_ARGS_KEY) {
                extended = true;
                format!("{} {}", line.trim_end(), PERF_PROPERTY)
            } else {
                line.to_string()
            }
        })
        .collect();

    let (updated, change) = if extended {
        let mut updated = lines.join("\n");
        if content.ends_with('\n') {
            updated.push('\n');
        }
        (updated, PropertiesChange::ExtendedJvmArgs)
    } else {
        let mut updated = content.clone();
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&format!("{}{}\n", JVM_ARGS_KEY, PERF_PROPERTY));
        (updated, PropertiesChange::AddedJvmArgs)
    };

    fs::write(&path, updated).with_context(|| format!("write {}", path.display()))?;
    Ok(change)
}
