//! CLI command definitions for the Intent Audit Agent

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use super::output::{self, AgentSummary, OutputFormat};
use super::ExitCode;
use crate::audit::Auditor;
use crate::config::AuditConfig;
use crate::error::{AuditError, Result};
use crate::loader::discover_agents;
use crate::report::ReportWriter;

/// Intent Audit Agent CLI
///
/// Audit exported conversational agents for intents that break the
/// voice-assistant publishing guidelines.
#[derive(Parser, Debug)]
#[command(name = "intent-audit")]
#[command(about = "Intent Audit Agent - Audit exported agent intents", long_about = None)]
#[command(version)]
pub struct AuditCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: AuditCommands,
}

/// Available audit commands
#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// Audit every agent under the projects directory
    ///
    /// Each sub-directory holds one extracted agent export. Reports are
    /// written to a single output file.
    Run {
        /// Directory holding one sub-directory per agent
        #[arg(short, long)]
        projects_dir: Option<PathBuf>,

        /// File the reports are written to (truncated first)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum number of agents audited at the same time
        #[arg(short, long)]
        jobs: Option<usize>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the audit rules
    Rules {
        /// Output format for the rule list
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Execute the run command
pub fn execute_run(config: AuditConfig, quiet: bool) -> Result<ExitCode> {
    tracing::debug!(
        projects_dir = %config.projects_dir.display(),
        output = %config.output_file.display(),
        format = ?config.format,
        jobs = config.jobs,
        "starting audit run"
    );

    let agent_dirs = discover_agents(&config.projects_dir)?;
    let mut writer = ReportWriter::create(&config.output_file, config.format)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.jobs)
        .enable_all()
        .build()
        .map_err(|e| AuditError::InternalError(format!("Failed to start runtime: {}", e)))?;
    let outcomes = runtime.block_on(Arc::new(Auditor::new()).audit_agents(agent_dirs, config.jobs));

    let mut summaries = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => {
                writer.write_report(&report)?;
                summaries.push(AgentSummary::from_report(&report));
            }
            Err(err) => {
                tracing::warn!(agent = %outcome.agent, "agent skipped: {}", err);
                writer.record_failure(outcome.agent.as_str(), &err);
                summaries.push(AgentSummary::failed(outcome.agent, &err));
            }
        }
    }
    let path = writer.finish()?;

    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    if !quiet {
        output::print_run_summary(&summaries, &path);
    }
    Ok(ExitCode::from_failures(failed))
}

/// Execute the rules command
pub fn execute_rules(format: Option<OutputFormat>) -> Result<ExitCode> {
    let catalog = Auditor::new().engine().catalog();

    match format.unwrap_or_default() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&catalog)?),
        OutputFormat::Text => output::print_rules_table(&catalog),
    }
    Ok(ExitCode::Success)
}
