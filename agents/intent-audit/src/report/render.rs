//! Report rendering and writing
//!
//! The text format is the long-standing audit document: a banner per agent,
//! one section per non-empty bucket, and the full intent roster. Reports of
//! several agents append to the same file. JSON and YAML outputs collect all
//! agents into a single document written on [`ReportWriter::finish`].

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::ValidationReport;
use crate::engine::rules::RuleTag;
use crate::error::{AuditError, Result};
use crate::{AGENT_ID, AGENT_VERSION};

const BANNER: &str = "$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$$";
const RULE_LINE: &str = "--------";
const SUCCESS_LINE: &str = "No problems found in any of the intents! Good job!";

/// Output format options for audit reports
#[derive(
    Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Sectioned plain-text report
    #[default]
    Text,
    /// JSON document for machine processing
    Json,
    /// YAML document
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(AuditError::invalid_input(format!(
                "Unknown output format: {}. Supported formats: text, json, yaml",
                s
            ))),
        }
    }
}

/// Section header for each per-intent bucket
pub fn section_header(tag: RuleTag) -> &'static str {
    match tag {
        RuleTag::NoWebhook => "INTENTS WITH NO WEBHOOK ENABLED",
        RuleTag::NoDefaultFulfillment => "INTENTS WITH NO DEFAULT FULFILLMENT TEXT",
        RuleTag::LongFulfillment => "INTENTS WITH FULFILLMENT TEXT LONGER THAN 640 CHARACTERS",
        RuleTag::DefaultNotFront => {
            "INTENTS WITH DEFAULT FULFILLMENT TEXT NOT SET TO THE FRONT OF RICH RESPONSES"
        }
        RuleTag::NoAccessibilityText => "INTENTS WITH NO ACCESSIBILITY TEXT",
    }
}

const MALFORMED_HEADER: &str = "INTENTS THAT COULD NOT BE PARSED";
// The trailing space is part of the established report format.
const ROSTER_HEADER: &str = "ALL INTENTS ";

/// Render one agent's report as the text document.
pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", BANNER);
    let _ = writeln!(out, "Results for {}", report.agent);
    let _ = writeln!(out, "{}\n", BANNER);

    let _ = write!(
        out,
        "Have end of conversation intent? {}\n\n",
        if report.end_intent_present { "True" } else { "False" }
    );

    for tag in RuleTag::ALL {
        let bucket = report.bucket(tag);
        if !bucket.is_empty() {
            push_section(&mut out, section_header(tag), bucket.iter());
        }
    }

    if !report.malformed_intents.is_empty() {
        let lines: Vec<String> = report
            .malformed_intents
            .iter()
            .map(|record| format!("{}: {}", record.intent, record.reason))
            .collect();
        push_section(&mut out, MALFORMED_HEADER, lines.iter().map(String::as_str));
    }

    if report.no_problems_found() {
        let _ = write!(out, "{}\n\n", SUCCESS_LINE);
    }

    push_section(
        &mut out,
        ROSTER_HEADER,
        report.all_intent_names.iter().map(String::as_str),
    );
    out.push_str("\n\n\n");
    out
}

fn push_section<'a>(out: &mut String, header: &str, lines: impl Iterator<Item = &'a str>) {
    let _ = write!(out, "{}\n{}\n{}\n\n", RULE_LINE, header, RULE_LINE);
    for line in lines {
        let _ = writeln!(out, "{}", line);
    }
    out.push('\n');
}

/// An agent that could not be audited, as listed in structured output
#[derive(Debug, Clone, Serialize)]
pub struct AgentFailure {
    pub agent: String,
    pub error: String,
}

/// Structured document written for JSON and YAML output
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    pub agent_id: &'static str,
    pub agent_version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub reports: Vec<ValidationReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<AgentFailure>,
}

/// Writes reports of a whole run to one destination
pub struct ReportWriter {
    path: PathBuf,
    format: OutputFormat,
    reports: Vec<ValidationReport>,
    failures: Vec<AgentFailure>,
}

impl ReportWriter {
    /// Create the writer, truncating any previous output at `path`.
    pub fn create(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuditError::file_error(format!(
                    "Failed to create output directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        File::create(&path).map_err(|e| {
            AuditError::file_error(format!(
                "Failed to create output file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            path,
            format,
            reports: Vec::new(),
            failures: Vec::new(),
        })
    }

    /// Append a report. Text output goes to disk immediately; structured
    /// formats are buffered until [`finish`](Self::finish).
    pub fn write_report(&mut self, report: &ValidationReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.append(render_text(report).as_bytes()),
            OutputFormat::Json | OutputFormat::Yaml => {
                self.reports.push(report.clone());
                Ok(())
            }
        }
    }

    /// Remember an agent that failed to load. Only structured formats list
    /// failures; the text document holds audit results only.
    pub fn record_failure(&mut self, agent: impl Into<String>, error: &AuditError) {
        self.failures.push(AgentFailure {
            agent: agent.into(),
            error: error.to_string(),
        });
    }

    /// Flush buffered output
    pub fn finish(self) -> Result<PathBuf> {
        let document = match self.format {
            OutputFormat::Text => return Ok(self.path),
            OutputFormat::Json | OutputFormat::Yaml => AuditSummary {
                agent_id: AGENT_ID,
                agent_version: AGENT_VERSION,
                generated_at: Utc::now(),
                reports: self.reports.clone(),
                failures: self.failures.clone(),
            },
        };

        let rendered = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&document)? + "\n",
            _ => serde_yaml::to_string(&document)?,
        };
        self.append(rendered.as_bytes())?;
        Ok(self.path)
    }

    fn append(&self, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                AuditError::file_error(format!(
                    "Failed to open output file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;
        file.write_all(bytes)?;
        Ok(())
    }
}
