//! Shared contributor roster contracts used by the validator runtime and its reports.
//!
//! This crate is intentionally runtime-agnostic. It defines the serializable shapes of a
//! contributor record, the project registry that constrains it, and the per-file and per-pass
//! validation results, without depending on YAML parsing, async runtimes, or terminal output.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recognized project names and, for some of them, the restricted set of role names.
///
/// The registry is process-wide configuration. It is loaded once per validation pass and treated
/// as read-only input to schema construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRegistry {
    /// Ordered list of recognized project names.
    pub projects: Vec<String>,
    /// Restricted role names keyed by project. Projects absent here accept any role text.
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
}

impl ProjectRegistry {
    /// Creates a registry from trusted caller input.
    pub fn new(projects: Vec<String>, roles: BTreeMap<String, Vec<String>>) -> Self {
        Self { projects, roles }
    }

    /// Returns whether `name` is a recognized project.
    pub fn contains(&self, name: &str) -> bool {
        self.projects.iter().any(|project| project == name)
    }

    /// Returns the restricted role list for `project`, if it has one.
    pub fn allowed_roles(&self, project: &str) -> Option<&[String]> {
        self.roles.get(project).map(Vec::as_slice)
    }
}

/// A contributor's stated role on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleEntry {
    /// Bare role name.
    Plain(String),
    /// Role name with free-text elaboration.
    Detailed {
        /// Role name.
        role: String,
        /// Free-text details.
        details: String,
    },
}

/// Canonical contact channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactKind {
    /// GitHub profile.
    Github,
    /// GitLab profile.
    Gitlab,
    /// Twitter / X profile.
    Twitter,
    /// Mastodon profile.
    Mastodon,
    /// LinkedIn profile.
    Linkedin,
    /// E-mail address.
    Email,
    /// Any other web page.
    Website,
}

impl ContactKind {
    /// Every kind, in declaration order.
    pub const ALL: [ContactKind; 7] = [
        Self::Github,
        Self::Gitlab,
        Self::Twitter,
        Self::Mastodon,
        Self::Linkedin,
        Self::Email,
        Self::Website,
    ];

    /// Stable lowercase key used in record files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Twitter => "twitter",
            Self::Mastodon => "mastodon",
            Self::Linkedin => "linkedin",
            Self::Email => "email",
            Self::Website => "website",
        }
    }

    /// Parses a record-file key into a kind.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == key)
    }
}

/// Contact entry after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Channel kind.
    pub kind: ContactKind,
    /// Canonical URL, or `mailto:` address for e-mail.
    pub value: String,
}

/// A validated contributor profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    /// Display name.
    pub name: String,
    /// Avatar path relative to the record file's directory.
    pub avatar: String,
    /// Role entries keyed by project. Every registry project is present, possibly empty.
    pub roles: BTreeMap<String, Vec<RoleEntry>>,
    /// Normalized contact entries in file order.
    pub contacts: Vec<Contact>,
}

/// Outcome of validating one record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Record path relative to the working directory, `/`-separated.
    pub file: String,
    /// Whether the record passed every check.
    pub valid: bool,
    /// Human-readable error lines in discovery order.
    pub errors: Vec<String>,
    /// Human-readable warnings. Currently always empty.
    pub warnings: Vec<String>,
}

impl FileReport {
    /// Builds a report, deriving validity from the error list.
    pub fn new(file: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            file: file.into(),
            valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
        }
    }
}

/// Aggregated results of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassReport {
    /// Per-file results in enumeration order.
    pub files: Vec<FileReport>,
    /// Pass-level failures that prevented any file from being checked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pass_errors: Vec<String>,
    /// Pass-level notes shown to the operator that do not fail the pass.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
}

impl PassReport {
    /// Number of files checked.
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Number of files that passed.
    pub fn valid_count(&self) -> usize {
        self.files.iter().filter(|file| file.valid).count()
    }

    /// Whether any file or the pass itself failed.
    pub fn has_errors(&self) -> bool {
        !self.pass_errors.is_empty() || self.files.iter().any(|file| !file.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn role_entry_accepts_plain_and_detailed_shapes() {
        let entries: Vec<RoleEntry> =
            serde_json::from_str(r#"["maintainer", {"role": "reviewer", "details": "docs"}]"#)
                .expect("parse role entries");
        assert_eq!(
            entries,
            vec![
                RoleEntry::Plain("maintainer".into()),
                RoleEntry::Detailed {
                    role: "reviewer".into(),
                    details: "docs".into(),
                },
            ]
        );
    }

    #[test]
    fn registry_lookups_respect_restricted_projects() {
        let registry = ProjectRegistry::new(
            vec!["alpha".into(), "beta".into()],
            BTreeMap::from([("alpha".to_string(), vec!["maintainer".to_string()])]),
        );
        assert!(registry.contains("beta"));
        assert!(!registry.contains("gamma"));
        assert_eq!(
            registry.allowed_roles("alpha"),
            Some(&["maintainer".to_string()][..])
        );
        assert_eq!(registry.allowed_roles("beta"), None);
    }

    #[test]
    fn pass_report_counts_and_error_state() {
        let report = PassReport {
            files: vec![
                FileReport::new("contributors/a.yaml", Vec::new()),
                FileReport::new("contributors/b.yaml", vec!["name: Required".into()]),
            ],
            ..PassReport::default()
        };
        assert_eq!(report.total(), 2);
        assert_eq!(report.valid_count(), 1);
        assert!(report.has_errors());
        assert!(!PassReport::default().has_errors());
    }

    #[test]
    fn contact_kind_keys_round_trip() {
        for kind in ContactKind::ALL {
            assert_eq!(ContactKind::from_key(kind.as_str()), Some(kind));
        }
        assert_eq!(ContactKind::from_key("myspace"), None);
    }
}
