//! Intent Audit Agent
//!
//! Audits exported conversational-agent bundles against a fixed set of
//! voice-assistant publishing rules and writes a per-agent report.
//!
//! ## Architecture
//!
//! 1. **Loader** (`loader`): reads `agent.json` and the intent files of each
//!    agent directory.
//!
//! 2. **Model** (`model/`): builds canonical [`Agent`] and [`Intent`] values
//!    from the raw JSON, rejecting records that miss mandatory structure.
//!
//! 3. **Engine** (`engine/`): evaluates the intent rules and the agent-level
//!    end-intent check.
//!
//! 4. **Report** (`report/`): folds findings into deduplicated buckets and
//!    renders them as text, JSON or YAML.
//!
//! 5. **Audit** (`audit`): the per-agent pipeline and the concurrent batch
//!    runner.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Audit every agent under ./project_files into output_summary.txt
//! intent-audit run
//!
//! # JSON summary, four agents at a time
//! intent-audit run --projects-dir exports --output audit.json --format json --jobs 4
//!
//! # List the rules
//! intent-audit rules
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use intent_audit::{load_bundle, Auditor, render_text};
//!
//! let bundle = load_bundle(std::path::Path::new("project_files/pizza")).unwrap();
//! let report = Auditor::new().audit_bundle(&bundle).unwrap();
//! print!("{}", render_text(&report));
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod model;
pub mod report;

pub use audit::{AgentOutcome, Auditor};
pub use cli::{AuditCli, AuditCommands, ExitCode, OutputFormat};
pub use config::{AuditConfig, AuditConfigBuilder};
pub use engine::rules::{IntentRule, RuleFinding, RuleTag};
pub use engine::{IntentEvaluation, RuleEngine};
pub use error::{AuditError, IntentRef, Result};
pub use loader::{discover_agents, load_bundle, RawBundle, RawIntent};
pub use model::{build_agent, build_intent, Agent, Intent, Message, SpeechPayload};
pub use report::{render_text, ReportBuilder, ReportWriter, ValidationReport};

/// Agent version (from Cargo.toml)
pub const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Agent identifier
pub const AGENT_ID: &str = "intent-audit-agent";

/// Run the CLI application
///
/// This is the main entry point for the CLI binary.
pub fn run_cli(cli: AuditCli) -> ExitCode {
    match cli::run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
