//! Project registry loading.

use roster_contract::ProjectRegistry;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures while loading the project registry definition.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read project registry {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse project registry {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("project registry {} does not list any projects", path.display())]
    Empty { path: PathBuf },
    #[error("project registry {} lists `{project}` more than once", path.display())]
    Duplicate { path: PathBuf, project: String },
    #[error(
        "project registry {} restricts roles for unknown project `{project}`",
        path.display()
    )]
    UnknownRoleProject { path: PathBuf, project: String },
}

/// Read and check the registry definition at `path`.
pub async fn load_registry(path: &Path) -> Result<ProjectRegistry, RegistryError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_registry(path, &text)
}

/// Parse registry YAML and enforce its self-consistency rules.
pub fn parse_registry(path: &Path, text: &str) -> Result<ProjectRegistry, RegistryError> {
    let registry: ProjectRegistry =
        serde_yaml::from_str(text).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if registry.projects.is_empty() {
        return Err(RegistryError::Empty {
            path: path.to_path_buf(),
        });
    }
    let mut seen = HashSet::new();
    for project in &registry.projects {
        if !seen.insert(project.as_str()) {
            return Err(RegistryError::Duplicate {
                path: path.to_path_buf(),
                project: project.clone(),
            });
        }
    }
    if let Some(project) = registry.roles.keys().find(|p| !registry.contains(p)) {
        return Err(RegistryError::UnknownRoleProject {
            path: path.to_path_buf(),
            project: project.clone(),
        });
    }

    Ok(registry)
}
