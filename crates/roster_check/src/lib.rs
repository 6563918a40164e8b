//! Contributor roster validation.
//!
//! `roster-check` validates every contributor record file in a directory against a schema derived
//! from the project registry, then prints a grouped report. With `--watch` it keeps running and
//! re-validates whenever records, the registry, or the configured schema source change.

pub mod avatar;
pub mod classify;
pub mod cli;
pub mod contacts;
pub mod loader;
pub mod registry;
pub mod report;
pub mod runner;
pub mod runtime;
pub mod schema;
pub mod settings;
pub mod watch;

use crate::cli::Cli;
use crate::report::{ConsoleSink, ReportSink, ReportTips};
use crate::runner::{run_pass, PassOutcome};
use crate::runtime::cancel::CancelToken;
use crate::runtime::error::{CheckError, CheckResult};
use crate::settings::Settings;
use crate::watch::WatchController;
use clap::Parser;
use roster_contract::PassReport;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

/// Whether the process should report success or failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Passed => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::from(1),
        }
    }
}

/// Parse process arguments, set up logging, and run.
pub async fn execute_from_env() -> ExitCode {
    let cli = Cli::parse();
    runtime::logging::init_tracing();
    exit_code(execute(cli).await)
}

/// Run the checker for already-parsed arguments.
pub async fn execute(cli: Cli) -> CheckResult<Outcome> {
    let cwd = std::env::current_dir().map_err(|err| {
        CheckError::environment(format!("cannot determine working directory: {err}"))
            .with_operation("startup")
    })?;
    let settings = Settings::load(&cwd, cli.config.as_deref())?;
    tracing::debug!(
        records = %settings.records_dir.display(),
        registry = %settings.registry_path.display(),
        watch = cli.watch,
        "settings resolved"
    );

    let sink = ConsoleSink::new(ReportTips::from_settings(&settings));
    if cli.watch {
        WatchController::new(settings, Arc::new(sink)).run().await?;
        return Ok(Outcome::Passed);
    }
    check_once(&settings, &sink).await
}

/// One pass, published to `sink`, with the optional JSON copy written afterwards.
pub async fn check_once(settings: &Settings, sink: &dyn ReportSink) -> CheckResult<Outcome> {
    let report = match run_pass(settings, &CancelToken::new()).await {
        PassOutcome::Completed(report) => report,
        PassOutcome::Cancelled => {
            return Err(CheckError::environment("validation pass was cancelled")
                .with_operation("check"));
        }
    };
    sink.publish(&report);

    if let Some(path) = &settings.report_json {
        write_json_report(path, &report).await?;
    }

    Ok(if report.has_errors() {
        Outcome::Failed
    } else {
        Outcome::Passed
    })
}

async fn write_json_report(path: &Path, report: &PassReport) -> CheckResult<()> {
    let body = serde_json::to_string_pretty(report).map_err(|err| {
        CheckError::io(format!("failed to encode report: {err}")).with_operation("write report")
    })?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            CheckError::io(format!("failed to create report directory: {err}"))
                .with_operation("write report")
                .with_path(parent)
        })?;
    }
    tokio::fs::write(path, format!("{body}\n"))
        .await
        .map_err(|err| {
            CheckError::io(format!("failed to write report: {err}"))
                .with_operation("write report")
                .with_path(path)
        })?;
    tracing::info!(path = %path.display(), "wrote JSON report");
    Ok(())
}

/// Map a run result onto the process exit status, printing any error.
pub fn exit_code(result: CheckResult<Outcome>) -> ExitCode {
    match result {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
