//! Run configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `INTENT_AUDIT_*` environment variables, then command-line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};
use crate::report::render::OutputFormat;

/// Default directory holding one sub-directory per agent
pub const DEFAULT_PROJECTS_DIR: &str = "project_files";

/// Default report destination
pub const DEFAULT_OUTPUT_FILE: &str = "output_summary.txt";

/// Settings for one audit run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Directory holding one sub-directory per agent
    pub projects_dir: PathBuf,
    /// File the reports are written to
    pub output_file: PathBuf,
    /// Report format
    pub format: OutputFormat,
    /// Maximum number of agents audited at the same time
    pub jobs: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from(DEFAULT_PROJECTS_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            format: OutputFormat::Text,
            jobs: default_jobs(),
        }
    }
}

/// Shape of the optional TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    projects_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    format: Option<OutputFormat>,
    jobs: Option<usize>,
}

impl AuditConfig {
    /// Create a new config builder
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::new()
    }

    /// Defaults overlaid with the TOML file at `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::config_error(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::default().merge_toml(&content)
    }

    fn merge_toml(mut self, content: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(content)?;
        if let Some(dir) = file.projects_dir {
            self.projects_dir = dir;
        }
        if let Some(output) = file.output_file {
            self.output_file = output;
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(jobs) = file.jobs {
            self.jobs = jobs;
        }
        self.validate()
    }

    /// Overlay `INTENT_AUDIT_*` environment variables
    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(dir) = var("INTENT_AUDIT_PROJECTS_DIR") {
            self.projects_dir = PathBuf::from(dir);
        }
        if let Some(output) = var("INTENT_AUDIT_OUTPUT") {
            self.output_file = PathBuf::from(output);
        }
        if let Some(format) = var("INTENT_AUDIT_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(jobs) = var("INTENT_AUDIT_JOBS") {
            self.jobs = jobs.parse().map_err(|_| {
                AuditError::config_error(format!("INTENT_AUDIT_JOBS must be a number, got '{}'", jobs))
            })?;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.jobs == 0 {
            return Err(AuditError::config_error("jobs must be at least 1"));
        }
        Ok(self)
    }
}

/// Builder for AuditConfig
#[derive(Debug, Default)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already layered configuration
    pub fn from_config(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn projects_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.projects_dir = dir.into();
        self
    }

    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_file = path.into();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AuditConfig> {
        self.config.validate()
    }
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
