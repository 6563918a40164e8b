//! Structured checker error types.

use std::fmt::{self, Display, Formatter};
use std::path::Path;

/// Stable error categories for checker workflows.
///
/// Per-record problems never surface here; they are collected into
/// [`FileReport`](roster_contract::FileReport) errors. These categories cover failures that stop a
/// whole pass or the process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckErrorCategory {
    /// Invalid or unreadable settings or registry definition.
    Config,
    /// Missing or mismatched local environment prerequisites.
    Environment,
    /// Filesystem or general I/O failure.
    Io,
}

/// Structured checker error with contextual metadata.
///
/// Optional `operation`, `target`, and `hint` fields can be attached as the error propagates so
/// failures remain actionable at the point they are shown to the operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckError {
    /// High-level error category.
    pub category: CheckErrorCategory,
    /// Human-readable message.
    pub message: String,
    /// Optional operation name.
    pub operation: Option<String>,
    /// Optional path target.
    pub target: Option<String>,
    /// Optional remediation hint.
    pub hint: Option<String>,
}

/// Convenience result type for checker internals.
pub type CheckResult<T> = Result<T, CheckError>;

impl CheckError {
    /// Create an error with the given category and message.
    pub fn new(category: CheckErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            operation: None,
            target: None,
            hint: None,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(CheckErrorCategory::Config, message)
    }

    /// Create an environment error.
    pub fn environment(message: impl Into<String>) -> Self {
        Self::new(CheckErrorCategory::Environment, message)
    }

    /// Create an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CheckErrorCategory::Io, message)
    }

    /// Attach an operation label.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attach a target path.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.target = Some(path.display().to_string());
        self
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for CheckError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(operation) = &self.operation {
            write!(f, " [operation: {operation}]")?;
        }
        if let Some(target) = &self.target {
            write!(f, " [target: {target}]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " [hint: {hint}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckError {}
