//! Human-readable pass reports.

use crate::runtime::paths::display_relative;
use crate::schema::REQUIRED_FIELDS;
use crate::settings::Settings;
use roster_contract::PassReport;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Context shown in the tips section of a failing report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportTips {
    /// Where project names are defined, relative to the working directory.
    pub registry_source: String,
    /// Required top-level record fields.
    pub required_fields: Vec<&'static str>,
}

impl ReportTips {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            registry_source: display_relative(&settings.cwd, &settings.registry_path),
            required_fields: REQUIRED_FIELDS.to_vec(),
        }
    }
}

/// Render a finished pass.
pub fn render_report(report: &PassReport, tips: &ReportTips) -> String {
    let mut out = String::new();
    let failed = report.has_errors();

    if failed {
        out.push_str("❌ Contributor validation failed\n");
    } else {
        out.push_str("✅ All contributor files are valid!\n");
    }

    for error in &report.pass_errors {
        let _ = writeln!(out, "\n⚠️  {error}");
    }
    for notice in &report.notices {
        let _ = writeln!(out, "\n⚠️  {notice}");
    }

    for file in report.files.iter().filter(|file| !file.valid) {
        let _ = writeln!(out, "\n📄 {}", file.file);
        for error in &file.errors {
            let _ = writeln!(out, "   • {error}");
        }
    }

    let _ = writeln!(
        out,
        "\n{}/{} files valid",
        report.valid_count(),
        report.total()
    );

    if failed {
        out.push_str("\n💡 Tips:\n");
        let _ = writeln!(
            out,
            "   • Valid project names are defined in {}",
            tips.registry_source
        );
        let _ = writeln!(
            out,
            "   • Required fields: {}",
            tips.required_fields.join(", ")
        );
    }

    out
}

/// Destination for watch-mode status lines and finished reports.
pub trait ReportSink: Send + Sync {
    /// Show a transient status line, such as "running".
    fn status(&self, message: &str);

    /// Show a finished report.
    fn publish(&self, report: &PassReport);
}

/// Prints to stdout.
#[derive(Debug)]
pub struct ConsoleSink {
    tips: ReportTips,
}

impl ConsoleSink {
    pub fn new(tips: ReportTips) -> Self {
        Self { tips }
    }

    fn write(&self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

impl ReportSink for ConsoleSink {
    fn status(&self, message: &str) {
        self.write(&format!("{message}\n"));
    }

    fn publish(&self, report: &PassReport) {
        self.write(&render_report(report, &self.tips));
    }
}
