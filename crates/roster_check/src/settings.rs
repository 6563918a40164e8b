//! Layered checker settings: defaults, optional `roster.toml`, then `ROSTER_*` environment.

use crate::runtime::config::ConfigLoader;
use crate::runtime::error::{CheckError, CheckResult};
use crate::runtime::paths::normalize_path;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory when `--config` is not given.
pub const DEFAULT_SETTINGS_FILE: &str = "roster.toml";

const DEFAULT_RECORDS_DIR: &str = "contributors";
const DEFAULT_REGISTRY: &str = "projects.yaml";
const DEFAULT_POLL_MS: u64 = 300;
const DEFAULT_PACING_MS: u64 = 100;

/// On-disk shape of `roster.toml`. Every key is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Directory holding contributor record files.
    pub records_dir: Option<PathBuf>,
    /// Project registry definition file.
    pub registry: Option<PathBuf>,
    /// Extra file whose changes re-trigger validation in watch mode.
    pub schema_source: Option<PathBuf>,
    /// Watch poll interval in milliseconds.
    pub poll_ms: Option<u64>,
    /// Delay before the "running" status line in watch mode, in milliseconds.
    pub pacing_ms: Option<u64>,
    /// Where single-pass mode writes a JSON copy of the report.
    pub report_json: Option<PathBuf>,
}

/// Fully resolved settings. Paths are absolute and normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Working directory; reported file names are relative to it.
    pub cwd: PathBuf,
    /// Directory holding contributor record files.
    pub records_dir: PathBuf,
    /// Project registry definition file.
    pub registry_path: PathBuf,
    /// Optional schema definition file watched for changes.
    pub schema_source: Option<PathBuf>,
    /// Watch poll interval.
    pub poll_interval: Duration,
    /// Delay before printing the "running" status line.
    pub pacing_delay: Duration,
    /// Optional JSON report destination.
    pub report_json: Option<PathBuf>,
}

impl Settings {
    /// Defaults rooted at `cwd`, with no settings file and no environment overrides.
    pub fn defaults(cwd: &Path) -> Self {
        let cwd = normalize_path(cwd);
        Self {
            records_dir: cwd.join(DEFAULT_RECORDS_DIR),
            registry_path: cwd.join(DEFAULT_REGISTRY),
            schema_source: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            pacing_delay: Duration::from_millis(DEFAULT_PACING_MS),
            report_json: None,
            cwd,
        }
    }

    /// Load settings for the current process.
    ///
    /// An explicitly requested settings file must exist; the default `roster.toml` is optional.
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> CheckResult<Self> {
        let file = match explicit {
            Some(path) => ConfigLoader::<SettingsFile>::new(cwd, path).load()?,
            None => ConfigLoader::<SettingsFile>::new(cwd, DEFAULT_SETTINGS_FILE)
                .load_optional()?
                .unwrap_or_default(),
        };
        Self::resolve(cwd, file, |name| std::env::var(name).ok())
    }

    /// Merge defaults, `file`, and environment values provided by `env`.
    pub fn resolve(
        cwd: &Path,
        file: SettingsFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> CheckResult<Self> {
        let cwd = normalize_path(cwd);
        let path_setting = |var: &str, from_file: Option<PathBuf>| -> Option<PathBuf> {
            env(var)
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from)
                .or(from_file)
                .map(|path| normalize_path(&cwd.join(path)))
        };
        let millis_setting = |var: &str, from_file: Option<u64>, default: u64| -> CheckResult<u64> {
            match env(var) {
                Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                    CheckError::config(format!("invalid {var} `{raw}` (expected milliseconds)"))
                }),
                None => Ok(from_file.unwrap_or(default)),
            }
        };

        let records_dir = path_setting("ROSTER_RECORDS_DIR", file.records_dir);
        let registry_path = path_setting("ROSTER_REGISTRY", file.registry);
        let schema_source = path_setting("ROSTER_SCHEMA_SOURCE", file.schema_source);
        let report_json = path_setting("ROSTER_REPORT_JSON", file.report_json);
        let poll_ms = millis_setting("ROSTER_POLL_MS", file.poll_ms, DEFAULT_POLL_MS)?;
        let pacing_ms = millis_setting("ROSTER_PACING_MS", file.pacing_ms, DEFAULT_PACING_MS)?;
        if poll_ms == 0 {
            return Err(CheckError::config("poll interval must be greater than zero")
                .with_hint("set `poll_ms` or ROSTER_POLL_MS to a positive value"));
        }

        Ok(Self {
            records_dir: records_dir.unwrap_or_else(|| cwd.join(DEFAULT_RECORDS_DIR)),
            registry_path: registry_path.unwrap_or_else(|| cwd.join(DEFAULT_REGISTRY)),
            schema_source,
            poll_interval: Duration::from_millis(poll_ms),
            pacing_delay: Duration::from_millis(pacing_ms),
            report_json,
            cwd,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::error::CheckErrorCategory;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_resolve_against_working_directory() {
        let settings = Settings::defaults(Path::new("/work"));
        assert_eq!(settings.records_dir, PathBuf::from("/work/contributors"));
        assert_eq!(settings.registry_path, PathBuf::from("/work/projects.yaml"));
        assert_eq!(settings.schema_source, None);
        assert_eq!(settings.poll_interval, Duration::from_millis(300));
        assert_eq!(settings.pacing_delay, Duration::from_millis(100));
    }

    #[test]
    fn environment_overrides_settings_file() {
        let file = SettingsFile {
            records_dir: Some("people".into()),
            registry: Some("config/projects.yaml".into()),
            poll_ms: Some(50),
            ..SettingsFile::default()
        };
        let settings = Settings::resolve(
            Path::new("/work"),
            file,
            env_from(&[
                ("ROSTER_RECORDS_DIR", "/data/team"),
                ("ROSTER_SCHEMA_SOURCE", "src/schema.ts"),
            ]),
        )
        .expect("resolve settings");
        assert_eq!(settings.records_dir, PathBuf::from("/data/team"));
        assert_eq!(
            settings.registry_path,
            PathBuf::from("/work/config/projects.yaml")
        );
        assert_eq!(
            settings.schema_source,
            Some(PathBuf::from("/work/src/schema.ts"))
        );
        assert_eq!(settings.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn invalid_numeric_override_names_the_variable() {
        let err = Settings::resolve(
            Path::new("/work"),
            SettingsFile::default(),
            env_from(&[("ROSTER_PACING_MS", "soon")]),
        )
        .expect_err("non-numeric pacing should fail");
        assert_eq!(err.category, CheckErrorCategory::Config);
        assert!(err.message.contains("ROSTER_PACING_MS"));
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Settings::load(dir.path(), Some(Path::new("custom.toml")))
            .expect_err("missing explicit settings should fail");
        assert_eq!(err.category, CheckErrorCategory::Config);
    }

    #[test]
    fn settings_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("roster.toml"), "record_dir = \"x\"\n").expect("write");
        let err = ConfigLoader::<SettingsFile>::new(dir.path(), DEFAULT_SETTINGS_FILE)
            .load()
            .expect_err("typo should be rejected");
        assert!(err.message.contains("record_dir"));
    }
}
