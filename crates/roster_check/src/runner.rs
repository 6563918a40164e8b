//! One validation pass over every record file.

use crate::avatar::check_avatar;
use crate::classify::Classifier;
use crate::loader::{discover, parse_record};
use crate::registry::load_registry;
use crate::runtime::cancel::{CancelToken, Cancelled};
use crate::runtime::paths::display_relative;
use crate::schema::Schema;
use crate::settings::Settings;
use roster_contract::{FileReport, PassReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every file was checked.
    Completed(PassReport),
    /// A newer pass superseded this one; nothing should be reported.
    Cancelled,
}

/// Everything a per-file task needs, shared across the pass.
#[derive(Debug)]
struct FileCheck {
    schema: Schema,
    classifier: Classifier,
    cwd: PathBuf,
}

/// Run one pass: load the registry, enumerate records, check each one concurrently.
///
/// Per-file failures are isolated into that file's report. A registry failure becomes a
/// pass-level error; a directory-listing failure becomes a notice with no files.
pub async fn run_pass(settings: &Settings, token: &CancelToken) -> PassOutcome {
    if token.is_cancelled() {
        return PassOutcome::Cancelled;
    }

    let registry = match load_registry(&settings.registry_path).await {
        Ok(registry) => registry,
        Err(err) => {
            tracing::warn!(error = %err, "project registry unavailable");
            return guard(
                token,
                PassReport {
                    pass_errors: vec![err.to_string()],
                    ..PassReport::default()
                },
            );
        }
    };

    let files = match discover(&settings.records_dir).await {
        Ok(files) => files,
        Err(err) => {
            let dir = display_relative(&settings.cwd, &settings.records_dir);
            tracing::warn!(dir = %dir, error = %err, "failed to list record directory");
            return guard(
                token,
                PassReport {
                    notices: vec![format!("Failed to read directory {dir}: {err}")],
                    ..PassReport::default()
                },
            );
        }
    };
    if token.is_cancelled() {
        return PassOutcome::Cancelled;
    }
    tracing::debug!(files = files.len(), "validation pass started");

    let check = Arc::new(FileCheck {
        schema: Schema::new(&registry),
        classifier: Classifier::new(display_relative(&settings.cwd, &settings.registry_path)),
        cwd: settings.cwd.clone(),
    });
    let tasks = files
        .into_iter()
        .map(|path| {
            let file = display_relative(&settings.cwd, &path);
            let check = Arc::clone(&check);
            let token = token.clone();
            let handle = tokio::spawn(async move { check_file(&check, &path, &token).await });
            (file, handle)
        })
        .collect();

    match collect_reports(tasks).await {
        Ok(files) => {
            let report = PassReport {
                files,
                ..PassReport::default()
            };
            tracing::debug!(
                files = report.total(),
                valid = report.valid_count(),
                "validation pass finished"
            );
            guard(token, report)
        }
        Err(Cancelled) => {
            tracing::debug!("validation pass cancelled");
            PassOutcome::Cancelled
        }
    }
}

fn guard(token: &CancelToken, report: PassReport) -> PassOutcome {
    if token.is_cancelled() {
        PassOutcome::Cancelled
    } else {
        PassOutcome::Completed(report)
    }
}

/// Await per-file tasks in enumeration order.
///
/// A task that panicked or was aborted is reported as an unexpected error for its file. Any task
/// observing cancellation cancels the whole collection.
pub(crate) async fn collect_reports(
    tasks: Vec<(String, JoinHandle<Result<FileReport, Cancelled>>)>,
) -> Result<Vec<FileReport>, Cancelled> {
    let mut reports = Vec::with_capacity(tasks.len());
    for (file, handle) in tasks {
        match handle.await {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(Cancelled)) => return Err(Cancelled),
            Err(err) => {
                tracing::error!(file = %file, error = %err, "record check failed unexpectedly");
                reports.push(FileReport::new(
                    file,
                    vec![format!("Unexpected error: {err}")],
                ));
            }
        }
    }
    Ok(reports)
}

async fn check_file(
    check: &FileCheck,
    path: &Path,
    token: &CancelToken,
) -> Result<FileReport, Cancelled> {
    token.checkpoint()?;
    let file = display_relative(&check.cwd, path);

    let value = match parse_record(path).await {
        Ok(value) => value,
        Err(err) => {
            token.checkpoint()?;
            return Ok(FileReport::new(file, vec![err.to_string()]));
        }
    };
    token.checkpoint()?;

    let issues = match check.schema.validate(&value) {
        Ok(record) => check_avatar(path, &record.avatar, &check.cwd, token)
            .await?
            .into_iter()
            .collect(),
        Err(issues) => issues,
    };

    Ok(FileReport::new(
        file.clone(),
        check.classifier.file_errors(&issues, &file),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn panicking_file_task_becomes_an_error_line() {
        let ok = tokio::spawn(async { Ok::<_, Cancelled>(FileReport::new("a.yaml", Vec::new())) });
        let boom = tokio::spawn(async {
            if true {
                panic!("boom");
            }
            Ok::<_, Cancelled>(FileReport::new("b.yaml", Vec::new()))
        });
        let reports = collect_reports(vec![("a.yaml".into(), ok), ("b.yaml".into(), boom)])
            .await
            .expect("not cancelled");

        assert_eq!(reports.len(), 2);
        assert!(reports[0].valid);
        assert_eq!(reports[1].file, "b.yaml");
        assert!(!reports[1].valid);
        assert!(reports[1].errors[0].starts_with("Unexpected error: "));
    }

    #[tokio::test]
    async fn any_cancelled_task_cancels_the_collection() {
        let ok = tokio::spawn(async { Ok::<_, Cancelled>(FileReport::new("a.yaml", Vec::new())) });
        let cancelled = tokio::spawn(async { Err::<FileReport, _>(Cancelled) });
        let result =
            collect_reports(vec![("a.yaml".into(), ok), ("b.yaml".into(), cancelled)]).await;
        assert_eq!(result, Err(Cancelled));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_before_any_io() {
        let settings = Settings::defaults(Path::new("/nonexistent-roster-root"));
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(run_pass(&settings, &token).await, PassOutcome::Cancelled);
    }
}
