//! Turns raw schema issues into operator-facing error lines.
//!
//! Two issue shapes are escalated to distinguished errors with domain wording: an unknown key
//! directly under `roles` (unknown project), and a failed role-entry union under
//! `roles.<project>` whose branches contain an enum mismatch (unknown role). Everything else is
//! rendered generically as `<path>: <message>`.

use crate::schema::{Issue, IssueKind, PathSegment};
use std::fmt::{self, Display, Formatter};

/// Result of classifying a single issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Ordinary issue, already formatted.
    Generic(String),
    /// One or more `roles` keys are not registry projects.
    UnknownProject {
        file: String,
        projects: Vec<String>,
        registry_source: String,
    },
    /// A role value is not in the project's restricted list.
    UnknownRole {
        file: String,
        project: String,
        role: String,
        allowed: Vec<String>,
    },
}

impl Classification {
    /// Whether this classification ends error reporting for its record.
    pub fn is_distinguished(&self) -> bool {
        !matches!(self, Self::Generic(_))
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic(text) => f.write_str(text),
            Self::UnknownProject {
                projects,
                registry_source,
                ..
            } => write!(
                f,
                "Invalid project name(s) in roles: {}. Valid projects are defined in {registry_source}",
                quoted(projects)
            ),
            Self::UnknownRole {
                project,
                role,
                allowed,
                ..
            } => write!(
                f,
                "Invalid role '{role}' for project '{project}'. Valid roles: {}",
                allowed.join(", ")
            ),
        }
    }
}

/// Issue classifier bound to the registry location shown in unknown-project errors.
#[derive(Debug, Clone)]
pub struct Classifier {
    registry_source: String,
}

impl Classifier {
    pub fn new(registry_source: impl Into<String>) -> Self {
        Self {
            registry_source: registry_source.into(),
        }
    }

    /// Classify one issue raised while validating `file`.
    pub fn classify(&self, issue: &Issue, file: &str) -> Classification {
        match &issue.kind {
            IssueKind::UnrecognizedKeys { keys } if is_roles_root(&issue.path) => {
                return Classification::UnknownProject {
                    file: file.to_string(),
                    projects: keys.clone(),
                    registry_source: self.registry_source.clone(),
                };
            }
            IssueKind::InvalidUnion { branches } => {
                if let (Some(project), Some((role, allowed))) =
                    (roles_project(&issue.path), find_enum_mismatch(branches))
                {
                    return Classification::UnknownRole {
                        file: file.to_string(),
                        project: project.to_string(),
                        role,
                        allowed,
                    };
                }
            }
            _ => {}
        }

        if issue.path.is_empty() {
            Classification::Generic(issue.message.clone())
        } else {
            Classification::Generic(format!("{}: {}", issue.dotted_path(), issue.message))
        }
    }

    /// Render the error lines for one record.
    ///
    /// Issues are classified in order. The first distinguished classification is terminal: it
    /// becomes the record's only error line.
    pub fn file_errors(&self, issues: &[Issue], file: &str) -> Vec<String> {
        let mut lines = Vec::with_capacity(issues.len());
        for issue in issues {
            let classification = self.classify(issue, file);
            if classification.is_distinguished() {
                tracing::debug!(file, error = %classification, "escalated schema issue");
                return vec![classification.to_string()];
            }
            lines.push(classification.to_string());
        }
        lines
    }
}

fn is_roles_root(path: &[PathSegment]) -> bool {
    matches!(path, [PathSegment::Key(key)] if key == "roles")
}

fn roles_project(path: &[PathSegment]) -> Option<&str> {
    match path {
        [PathSegment::Key(root), PathSegment::Key(project), ..] if root == "roles" => {
            Some(project.as_str())
        }
        _ => None,
    }
}

fn find_enum_mismatch(branches: &[Vec<Issue>]) -> Option<(String, Vec<String>)> {
    branches.iter().flatten().find_map(|issue| match &issue.kind {
        IssueKind::InvalidEnumValue { options, received } => {
            Some((received.clone(), options.clone()))
        }
        IssueKind::InvalidUnion { branches } => find_enum_mismatch(branches),
        _ => None,
    })
}

fn quoted(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
