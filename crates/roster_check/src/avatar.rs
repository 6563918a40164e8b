//! Avatar existence check.

use crate::runtime::cancel::{CancelToken, Cancelled};
use crate::runtime::paths::{display_relative, normalize_path};
use crate::schema::{Issue, IssueKind, PathSegment};
use std::path::{Path, PathBuf};

/// Resolve `avatar` against the directory containing `record_path`.
pub fn resolve_avatar(record_path: &Path, avatar: &str) -> PathBuf {
    let base = record_path.parent().unwrap_or_else(|| Path::new("."));
    normalize_path(&base.join(avatar))
}

/// Check that the record's avatar exists.
///
/// Returns `Ok(None)` when the file exists and `Ok(Some(issue))` at field path `avatar` when it
/// does not. The token is polled before and after the filesystem probe, so a probe that finishes
/// after cancellation is discarded.
pub async fn check_avatar(
    record_path: &Path,
    avatar: &str,
    cwd: &Path,
    token: &CancelToken,
) -> Result<Option<Issue>, Cancelled> {
    token.checkpoint()?;
    let resolved = resolve_avatar(record_path, avatar);
    let exists = tokio::fs::metadata(&resolved)
        .await
        .is_ok_and(|meta| meta.is_file());
    token.checkpoint()?;

    if exists {
        return Ok(None);
    }
    Ok(Some(Issue {
        kind: IssueKind::Custom,
        path: vec![PathSegment::from("avatar")],
        message: format!(
            "Avatar file not found: {}",
            display_relative(cwd, &resolved)
        ),
    }))
}
