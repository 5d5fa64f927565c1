//! Console output for the Intent Audit Agent CLI
//!
//! The report file holds the full audit; the console only gets a colored
//! one-line summary per agent.

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

pub use crate::report::render::OutputFormat;

use crate::engine::{RuleDescriptor, RuleScope};
use crate::error::AuditError;
use crate::report::ValidationReport;

/// Per-agent line of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub agent: String,
    pub intents: usize,
    pub flagged: usize,
    pub malformed: usize,
    pub end_intent_present: bool,
    /// Set when the agent could not be audited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentSummary {
    pub fn from_report(report: &ValidationReport) -> Self {
        Self {
            agent: report.agent.clone(),
            intents: report.all_intent_names.len(),
            flagged: report.flagged_intent_count(),
            malformed: report.malformed_intents.len(),
            end_intent_present: report.end_intent_present,
            error: None,
        }
    }

    pub fn failed(agent: impl Into<String>, err: &AuditError) -> Self {
        Self {
            agent: agent.into(),
            intents: 0,
            flagged: 0,
            malformed: 0,
            end_intent_present: false,
            error: Some(err.to_string()),
        }
    }

    /// Whether the agent was audited without any finding
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.flagged == 0 && self.malformed == 0 && self.end_intent_present
    }

    fn status_line(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{} {}: {}", "x".red(), self.agent.bold(), error.red());
        }

        let icon = if self.is_clean() {
            "+".green()
        } else {
            "!".yellow()
        };
        let mut line = format!(
            "{} {}: {} intents, {} flagged",
            icon,
            self.agent.bold(),
            self.intents,
            self.flagged
        );
        if self.malformed > 0 {
            line.push_str(&format!(", {} unparsed", self.malformed.to_string().yellow()));
        }
        if !self.end_intent_present {
            line.push_str(&format!(", {}", "no end intent".yellow()));
        }
        line
    }
}

/// Print the per-agent summary of a run
pub fn print_run_summary(summaries: &[AgentSummary], report_path: &Path) {
    let mut stdout = io::stdout();

    writeln!(stdout).ok();
    writeln!(stdout, "{}", "Intent Audit Results".cyan().bold()).ok();
    writeln!(stdout, "{}", "=".repeat(60)).ok();

    if summaries.is_empty() {
        writeln!(stdout, "{}", "No agents found".dimmed()).ok();
    }
    for summary in summaries {
        writeln!(stdout, "{}", summary.status_line()).ok();
    }

    writeln!(stdout).ok();
    writeln!(
        stdout,
        "Report written to {}",
        report_path.display().to_string().cyan()
    )
    .ok();
    stdout.flush().ok();
}

/// Print the rule catalog as a table
pub fn print_rules_table(catalog: &[RuleDescriptor]) {
    let mut stdout = io::stdout();

    writeln!(stdout, "{}", "Audit Rules".cyan().bold()).ok();
    writeln!(stdout, "{}", "-".repeat(60)).ok();
    for rule in catalog {
        let scope = match rule.scope {
            RuleScope::Agent => "agent ".blue(),
            RuleScope::Intent => "intent".green(),
        };
        writeln!(stdout, "{} {:<24} {}", scope, rule.id, rule.description.dimmed()).ok();
    }
    stdout.flush().ok();
}
