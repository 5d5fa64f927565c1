//! CLI module for the Intent Audit Agent
//!
//! Audits every agent export under a projects directory and lists the rule
//! catalog.

pub mod commands;
pub mod output;

pub use commands::{AuditCli, AuditCommands};
pub use output::{AgentSummary, OutputFormat};

use crate::config::{AuditConfig, AuditConfigBuilder};
use crate::error::{AuditError, Result};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every agent was audited
    Success = 0,
    /// At least one agent bundle could not be audited
    AgentFailed = 1,
    /// Invalid input, arguments or configuration
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from the number of agents that failed
    pub fn from_failures(failed: usize) -> Self {
        if failed > 0 {
            ExitCode::AgentFailed
        } else {
            ExitCode::Success
        }
    }

    /// Exit code for an error that aborted the whole run
    pub fn from_error(err: &AuditError) -> Self {
        match err {
            AuditError::FileError(_) => ExitCode::FileError,
            AuditError::InvalidInput(_) | AuditError::ConfigError(_) => ExitCode::InvalidInput,
            AuditError::MalformedAgent { .. } | AuditError::BundleUnavailable { .. } => {
                ExitCode::AgentFailed
            }
            _ => ExitCode::InternalError,
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: AuditCli) -> Result<ExitCode> {
    let quiet = cli.quiet;
    match cli.command {
        AuditCommands::Run {
            projects_dir,
            output,
            format,
            jobs,
            config,
        } => {
            let base = match config {
                Some(path) => AuditConfig::from_file(&path)?,
                None => AuditConfig::default(),
            };
            let mut builder = AuditConfigBuilder::from_config(base.with_env()?);
            if let Some(dir) = projects_dir {
                builder = builder.projects_dir(dir);
            }
            if let Some(path) = output {
                builder = builder.output_file(path);
            }
            if let Some(format) = format {
                builder = builder.format(format);
            }
            if let Some(jobs) = jobs {
                builder = builder.jobs(jobs);
            }
            commands::execute_run(builder.build()?, quiet)
        }
        AuditCommands::Rules { format } => commands::execute_rules(format),
    }
}
