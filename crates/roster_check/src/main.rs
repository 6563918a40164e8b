//! `roster-check` entrypoint: validate contributor records once, or keep watching with `--watch`.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    roster_check::execute_from_env().await
}
