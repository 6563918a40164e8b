//! Command-line surface.

use clap::Parser;
use std::path::PathBuf;

/// Validate contributor record files against the project registry.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "roster-check", version, about)]
pub struct Cli {
    /// Keep running and re-validate whenever records or definitions change.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Settings file to use instead of `roster.toml` in the working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_to_single_pass() {
        let cli = Cli::try_parse_from(["roster-check"]).expect("parse");
        assert_eq!(
            cli,
            Cli {
                watch: false,
                config: None,
            }
        );
    }

    #[test]
    fn accepts_short_and_long_watch_flags() {
        assert!(Cli::try_parse_from(["roster-check", "-w"]).expect("parse").watch);
        let cli = Cli::try_parse_from(["roster-check", "--watch", "--config", "ci/roster.toml"])
            .expect("parse");
        assert!(cli.watch);
        assert_eq!(cli.config, Some(PathBuf::from("ci/roster.toml")));
    }

    #[test]
    fn rejects_unknown_arguments() {
        assert!(Cli::try_parse_from(["roster-check", "--fix"]).is_err());
    }
}
