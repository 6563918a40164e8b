//! Typed configuration loading helpers.

use crate::runtime::error::{CheckError, CheckResult};
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Generic TOML-backed config loader.
///
/// `ConfigLoader<T>` handles only filesystem access and TOML deserialization. Callers are still
/// responsible for semantic validation after the typed value is loaded.
///
/// ```rust
/// # use serde::Deserialize;
/// # use std::path::Path;
/// # use roster_check::runtime::config::ConfigLoader;
/// #[derive(Deserialize)]
/// struct ExampleConfig {
///     enabled: bool,
/// }
///
/// let loader = ConfigLoader::<ExampleConfig>::new(Path::new("/workspace"), "roster.toml");
/// assert!(loader.path().ends_with("roster.toml"));
/// ```
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for `relative_path` under `root`. Absolute paths are used as-is.
    pub fn new(root: &Path, relative_path: impl AsRef<Path>) -> Self {
        Self {
            path: root.join(relative_path),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    ///
    /// Missing files, unreadable files, and TOML parse failures are all surfaced as
    /// [`CheckErrorCategory::Config`](crate::runtime::error::CheckErrorCategory::Config).
    pub fn load(&self) -> CheckResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|err| {
            CheckError::config(format!("failed to read {}: {err}", self.path.display()))
                .with_operation("load settings")
        })?;
        self.parse(&body)
    }

    /// Like [`ConfigLoader::load`], but a missing file yields `Ok(None)`.
    pub fn load_optional(&self) -> CheckResult<Option<T>> {
        match fs::read_to_string(&self.path) {
            Ok(body) => self.parse(&body).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CheckError::config(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))
            .with_operation("load settings")),
        }
    }

    /// Return the config path on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, body: &str) -> CheckResult<T> {
        toml::from_str(body).map_err(|err| {
            CheckError::config(format!("failed to parse {}: {err}", self.path.display()))
                .with_operation("parse settings")
        })
    }
}
