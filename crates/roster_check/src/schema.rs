//! Contributor record schema.
//!
//! [`Schema`] is built from a [`ProjectRegistry`] into an explicit project → role-constraint
//! table. Construction never fails; every problem surfaces at validation time as a list of
//! structured [`Issue`]s carrying a code, a field path, and a message.

use crate::contacts::normalize_contact;
use roster_contract::{Contact, ContributorRecord, ProjectRegistry, RoleEntry};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Top-level fields every record must declare.
pub const REQUIRED_FIELDS: &[&str] = &["name", "avatar", "roles"];

/// One step in a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        Self::Key(value.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Issue code plus the data each code carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    InvalidType {
        expected: &'static str,
        received: &'static str,
    },
    TooSmall {
        minimum: usize,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    /// Every branch failed; `branches` holds each branch's issues in declaration order.
    InvalidUnion {
        branches: Vec<Vec<Issue>>,
    },
    InvalidEnumValue {
        options: Vec<String>,
        received: String,
    },
    Custom,
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    fn new(kind: IssueKind, path: &[PathSegment], message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.to_vec(),
            message: message.into(),
        }
    }

    fn invalid_type(path: &[PathSegment], expected: &'static str, value: Option<&Value>) -> Self {
        let received = value.map_or("undefined", type_name);
        let message = if value.is_none() {
            "Required".to_string()
        } else {
            format!("Expected {expected}, received {received}")
        };
        Self::new(IssueKind::InvalidType { expected, received }, path, message)
    }

    fn custom(path: &[PathSegment], message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom, path, message)
    }

    /// Field path joined with `.`, empty at the record root.
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Role names accepted for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleConstraint {
    Any,
    OneOf(Vec<String>),
}

/// Validator for contributor records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    projects: Vec<(String, RoleConstraint)>,
}

impl Schema {
    /// Build the constraint table from the registry.
    pub fn new(registry: &ProjectRegistry) -> Self {
        let projects = registry
            .projects
            .iter()
            .map(|project| {
                let constraint = match registry.allowed_roles(project) {
                    Some(roles) => RoleConstraint::OneOf(roles.to_vec()),
                    None => RoleConstraint::Any,
                };
                (project.clone(), constraint)
            })
            .collect();
        Self { projects }
    }

    /// Validate a parsed record, returning the typed record or every issue found.
    ///
    /// Unknown top-level keys are ignored. Unknown keys under `roles` are an issue.
    pub fn validate(&self, value: &Value) -> Result<ContributorRecord, Vec<Issue>> {
        let mut issues = Vec::new();
        let Value::Mapping(map) = value else {
            return Err(vec![Issue::invalid_type(&[], "object", Some(value))]);
        };

        let name = non_empty_string(map.get("name"), &[PathSegment::from("name")], &mut issues);
        let avatar = avatar_path(map.get("avatar"), &mut issues);
        let roles = self.roles(map.get("roles"), &mut issues);
        let contacts = contacts(map.get("contacts"), &mut issues);

        match (name, avatar, roles, contacts) {
            (Some(name), Some(avatar), Some(roles), Some(contacts)) if issues.is_empty() => {
                Ok(ContributorRecord {
                    name,
                    avatar,
                    roles,
                    contacts,
                })
            }
            _ => Err(issues),
        }
    }

    fn constraint(&self, project: &str) -> Option<&RoleConstraint> {
        self.projects
            .iter()
            .find(|(name, _)| name == project)
            .map(|(_, constraint)| constraint)
    }

    fn roles(
        &self,
        value: Option<&Value>,
        issues: &mut Vec<Issue>,
    ) -> Option<BTreeMap<String, Vec<RoleEntry>>> {
        let path = vec![PathSegment::from("roles")];
        let map = match value {
            Some(Value::Mapping(map)) => map,
            other => {
                issues.push(Issue::invalid_type(&path, "object", other));
                return None;
            }
        };

        let unknown: Vec<String> = map
            .keys()
            .filter(|key| {
                key.as_str()
                    .map_or(true, |key| self.constraint(key).is_none())
            })
            .map(key_text)
            .collect();
        if !unknown.is_empty() {
            let listed = unknown
                .iter()
                .map(|key| format!("'{key}'"))
                .collect::<Vec<_>>()
                .join(", ");
            issues.push(Issue::new(
                IssueKind::UnrecognizedKeys { keys: unknown },
                &path,
                format!("Unrecognized key(s) in object: {listed}"),
            ));
        }

        let mut roles = BTreeMap::new();
        let mut complete = true;
        for (project, constraint) in &self.projects {
            let mut project_path = path.clone();
            project_path.push(project.as_str().into());
            match map.get(project.as_str()) {
                None => {
                    roles.insert(project.clone(), Vec::new());
                }
                Some(Value::Sequence(entries)) => {
                    let mut parsed = Vec::with_capacity(entries.len());
                    for (index, entry) in entries.iter().enumerate() {
                        let mut entry_path = project_path.clone();
                        entry_path.push(index.into());
                        match role_entry(entry, constraint, &entry_path) {
                            Ok(entry) => parsed.push(entry),
                            Err(issue) => {
                                issues.push(issue);
                                complete = false;
                            }
                        }
                    }
                    roles.insert(project.clone(), parsed);
                }
                Some(other) => {
                    issues.push(Issue::invalid_type(&project_path, "array", Some(other)));
                    complete = false;
                }
            }
        }

        complete.then_some(roles)
    }
}

fn role_entry(
    value: &Value,
    constraint: &RoleConstraint,
    path: &[PathSegment],
) -> Result<RoleEntry, Issue> {
    let mut plain_issues = Vec::new();
    if let Some(role) = role_name(Some(value), constraint, path, &mut plain_issues) {
        return Ok(RoleEntry::Plain(role));
    }

    let mut detailed_issues = Vec::new();
    match value {
        Value::Mapping(map) => {
            let mut role_path = path.to_vec();
            role_path.push("role".into());
            let role = role_name(map.get("role"), constraint, &role_path, &mut detailed_issues);
            let mut details_path = path.to_vec();
            details_path.push("details".into());
            let details = string(map.get("details"), &details_path, &mut detailed_issues);
            if let (Some(role), Some(details)) = (role, details) {
                return Ok(RoleEntry::Detailed { role, details });
            }
        }
        other => detailed_issues.push(Issue::invalid_type(path, "object", Some(other))),
    }

    Err(Issue::new(
        IssueKind::InvalidUnion {
            branches: vec![plain_issues, detailed_issues],
        },
        path,
        "Invalid input",
    ))
}

fn role_name(
    value: Option<&Value>,
    constraint: &RoleConstraint,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<String> {
    let RoleConstraint::OneOf(options) = constraint else {
        return string(value, path, issues);
    };
    match value {
        Some(Value::String(text)) if options.iter().any(|option| option == text) => {
            Some(text.clone())
        }
        Some(Value::String(text)) => {
            let expected = options
                .iter()
                .map(|option| format!("'{option}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            issues.push(Issue::new(
                IssueKind::InvalidEnumValue {
                    options: options.clone(),
                    received: text.clone(),
                },
                path,
                format!("Invalid enum value. Expected {expected}, received '{text}'"),
            ));
            None
        }
        other => {
            issues.push(Issue::invalid_type(path, "string", other));
            None
        }
    }
}

fn string(value: Option<&Value>, path: &[PathSegment], issues: &mut Vec<Issue>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        other => {
            issues.push(Issue::invalid_type(path, "string", other));
            None
        }
    }
}

fn non_empty_string(
    value: Option<&Value>,
    path: &[PathSegment],
    issues: &mut Vec<Issue>,
) -> Option<String> {
    let text = string(value, path, issues)?;
    if text.is_empty() {
        issues.push(Issue::new(
            IssueKind::TooSmall { minimum: 1 },
            path,
            "String must contain at least 1 character(s)",
        ));
        return None;
    }
    Some(text)
}

fn avatar_path(value: Option<&Value>, issues: &mut Vec<Issue>) -> Option<String> {
    let path = [PathSegment::from("avatar")];
    let avatar = non_empty_string(value, &path, issues)?;
    if Path::new(&avatar).has_root() {
        issues.push(Issue::custom(&path, "Avatar must be a relative path"));
        return None;
    }
    Some(avatar)
}

fn contacts(value: Option<&Value>, issues: &mut Vec<Issue>) -> Option<Vec<Contact>> {
    let path = [PathSegment::from("contacts")];
    let entries = match value {
        None => return Some(Vec::new()),
        Some(Value::Sequence(entries)) => entries,
        Some(other) => {
            issues.push(Issue::invalid_type(&path, "array", Some(other)));
            return None;
        }
    };

    let mut out = Vec::with_capacity(entries.len());
    let mut complete = true;
    for (index, entry) in entries.iter().enumerate() {
        match normalize_contact(entry) {
            Ok(contact) => out.push(contact),
            Err(err) => {
                issues.push(Issue::custom(
                    &[PathSegment::from("contacts"), index.into()],
                    err.to_string(),
                ));
                complete = false;
            }
        }
    }
    complete.then_some(out)
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim_end().to_string())
            .unwrap_or_else(|_| type_name(other).to_string()),
    }
}

/// Received-type label used in `Expected …, received …` messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "array",
        Value::Mapping(_) => "object",
        Value::Tagged(_) => "tagged",
    }
}
