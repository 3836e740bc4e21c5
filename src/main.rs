use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::{debug, warn};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

mod gradle_properties;
mod listener;
mod model;
mod overhead;
mod render;
mod replay;
mod teamcity;

use listener::{ConsolePrinter, FanOut};
use overhead::OverheadAccumulator;
use gradle_properties::PropertiesChange;
use render::ReportFormat;
use teamcity::{MessageStatus, ProgressKind, ServiceMessages};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "import-overhead")]
#[command(about = "Gradle model builder overhead from import task output", long_about = None)]
struct Cli {
    /// Print plain text instead of TeamCity service messages.
    #[arg(long, global = true, env = "IMPORT_OVERHEAD_NO_TEAMCITY")]
    no_teamcity: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay task output logs and report per-service overhead.
    Report {
        /// Task output log to replay; `-` reads stdin. Repeat for parallel tasks.
        #[arg(long = "log", required = true)]
        logs: Vec<String>,

        #[arg(long, value_enum, default_value_t = ReportFormat::Teamcity)]
        format: ReportFormat,

        /// Only report services whose name matches this regex.
        #[arg(long)]
        filter: Option<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Do not echo task lifecycle and output.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Add the model builder perf property to a project's gradle.properties.
    EnableStatistics {
        /// Gradle project root.
        #[arg(long)]
        project: PathBuf,
    },
}

fn init_logging() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.target(pretty_env_logger::env_logger::Target::Stderr);
    if let Ok(s) = std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else {
        builder.parse_filters("warn,import_overhead=info");
    }
    builder.init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let messages = ServiceMessages::new(!cli.no_teamcity);

    match cli.cmd {
        Commands::Report {
            logs,
            format,
            filter,
            out,
            quiet,
        } => {
            let filter = filter
                .as_deref()
                .map(Regex::new)
                .transpose()
                .context("invalid --filter regex")?;

            if logs.iter().filter(|l| *l == replay::STDIN_SOURCE).count() > 1 {
                bail!("stdin (`-`) can only be replayed once");
            }

            // 1) Wire listeners around one shared accumulator.
            let accumulator = Arc::new(OverheadAccumulator::new());
            let mut listeners = FanOut::new();
            if !quiet {
                listeners = listeners.with(Arc::new(ConsolePrinter::stdout(messages)));
            }
            listeners = listeners.with(accumulator.clone());

            // 2) Replay.
            if !quiet {
                println!(
                    "{}",
                    messages.progress("Replaying import output", ProgressKind::Start)
                );
            }
            let summary = replay::replay_logs(&logs, &listeners);
            if !quiet {
                println!(
                    "{}",
                    messages.progress(
                        &format!("Replayed {} lines from {} tasks", summary.lines, summary.tasks),
                        ProgressKind::Message,
                    )
                );
                println!(
                    "{}",
                    messages.progress("Replaying import output", ProgressKind::Finish)
                );
            }
            debug!("replay finished: {:?}", summary);
            if accumulator.malformed_lines() > 0 {
                warn!(
                    "{} malformed performance statistics lines were discarded",
                    accumulator.malformed_lines()
                );
            }

            let snapshot = accumulator.snapshot();
            if snapshot.is_empty() {
                println!(
                    "{}",
                    messages.message(
                        &format!(
                            "No performance statistics in task output; \
                             was the import run with {}? See `enable-statistics`.",
                            gradle_properties::PERF_PROPERTY
                        ),
                        Some(MessageStatus::Warning),
                        None,
                    )
                );
            }

            // 3) Report.
            let report = model::build_report(&snapshot, filter.as_ref());
            let rendered = render::render_report(&report, format, messages)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("write report {}", path))?;
                    println!(
                        "{}",
                        messages.message(
                            &format!("Wrote {}", path),
                            Some(MessageStatus::Normal),
                            None
                        )
                    );
                }
                None => print!("{}", rendered),
            }

            if summary.failed > 0 {
                println!(
                    "{}",
                    messages.message(
                        "Overhead report is incomplete",
                        Some(MessageStatus::Failure),
                        None
                    )
                );
                bail!(
                    "{} of {} task output logs could not be replayed",
                    summary.failed,
                    summary.tasks
                );
            }
        }
        Commands::EnableStatistics { project } => {
            let change = gradle_properties::enable_model_builder_statistics(&project)?;
            let path = gradle_properties::properties_path(&project);
            let text = match change {
                PropertiesChange::AlreadyEnabled => {
                    format!("Model builder statistics already enabled in {}", path.display())
                }
                PropertiesChange::ExtendedJvmArgs | PropertiesChange::AddedJvmArgs => {
                    format!("Enabled model builder statistics in {}", path.display())
                }
            };
            println!("{}", messages.message(&text, Some(MessageStatus::Normal), None));
        }
    }

    Ok(())
}
