//! Intent Audit Agent CLI
//!
//! # Usage
//!
//! ```bash
//! intent-audit run --projects-dir project_files --output output_summary.txt
//! intent-audit rules --format json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - every agent was audited
//! - 1: One or more agent bundles could not be audited
//! - 3: Invalid input, arguments or configuration
//! - 4: File not found or inaccessible
//! - 10: Internal error

use clap::Parser;
use intent_audit::{run_cli, AuditCli};
use tracing::Level;

fn main() {
    let cli = AuditCli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    // RUST_LOG directives are applied on top of the verbosity level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
