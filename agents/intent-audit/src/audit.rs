//! Audit pipeline
//!
//! Runs raw bundle → model builder → rule engine → report aggregator for one
//! agent, and fans that out over many agents.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::engine::RuleEngine;
use crate::error::{AuditError, IntentRef, Result};
use crate::loader::{agent_name, load_bundle, RawBundle};
use crate::model::{build_agent, build_intent};
use crate::report::{ReportBuilder, ValidationReport};

/// Result of auditing one agent directory
#[derive(Debug)]
pub struct AgentOutcome {
    pub agent: String,
    pub result: Result<ValidationReport>,
}

/// Audits agent bundles with the fixed rule set
#[derive(Default)]
pub struct Auditor {
    engine: RuleEngine,
}

impl Auditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Audit one loaded bundle.
    ///
    /// Fails only when the agent metadata is malformed. Intent records that
    /// cannot be built are listed in the report and the remaining intents
    /// are still evaluated.
    pub fn audit_bundle(&self, bundle: &RawBundle) -> Result<ValidationReport> {
        let agent = build_agent(&bundle.agent, &bundle.metadata)?;
        let end_intent_present = self.engine.evaluate_agent(&agent);
        let mut builder = ReportBuilder::new(agent.name.as_str(), end_intent_present);

        for (index, raw) in bundle.intents.iter().enumerate() {
            let record = match &raw.content {
                Ok(record) => record,
                Err(reason) => {
                    tracing::warn!(agent = %agent.name, source = %raw.source, "{}", reason);
                    builder.add_malformed(IntentRef::Source(raw.source.clone()), reason.as_str());
                    continue;
                }
            };

            match build_intent(index, record) {
                Ok(intent) => {
                    builder.add_evaluation(self.engine.evaluate_detailed(&intent));
                }
                Err(AuditError::MalformedIntent { intent, reason }) => {
                    tracing::warn!(agent = %agent.name, intent = %intent, source = %raw.source, "{}", reason);
                    builder.add_malformed(intent, format!("{} (in {})", reason, raw.source));
                }
                Err(other) => {
                    builder.add_malformed(IntentRef::Source(raw.source.clone()), other.to_string());
                }
            }
        }

        let report = builder.finalize();
        tracing::info!(
            agent = %report.agent,
            intents = report.all_intent_names.len(),
            flagged = report.flagged_intent_count(),
            malformed = report.malformed_intents.len(),
            end_intent_present = report.end_intent_present,
            "agent audited"
        );
        Ok(report)
    }

    /// Load and audit the agent stored in `agent_dir`
    pub fn audit_dir(&self, agent_dir: &Path) -> AgentOutcome {
        let result = load_bundle(agent_dir).and_then(|bundle| self.audit_bundle(&bundle));
        if let Err(err) = &result {
            tracing::warn!(agent_dir = %agent_dir.display(), "{}", err);
        }
        AgentOutcome {
            agent: agent_name(agent_dir),
            result,
        }
    }

    /// Audit many agents on blocking tasks, at most `jobs` at a time.
    ///
    /// Outcomes come back in the order of `agent_dirs`.
    pub async fn audit_agents(self: Arc<Self>, agent_dirs: Vec<PathBuf>, jobs: usize) -> Vec<AgentOutcome> {
        let semaphore = Arc::new(Semaphore::new(jobs.max(1)));

        let mut handles = Vec::with_capacity(agent_dirs.len());
        for dir in agent_dirs {
            let auditor = Arc::clone(&self);
            let semaphore = Arc::clone(&semaphore);
            let agent = agent_name(&dir);

            handles.push((
                agent,
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    tokio::task::spawn_blocking(move || auditor.audit_dir(&dir)).await
                }),
            ));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (agent, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(err)) | Err(err) => {
                    tracing::error!(agent = %agent, "audit task failed: {}", err);
                    outcomes.push(AgentOutcome {
                        result: Err(AuditError::InternalError(format!(
                            "audit of agent '{}' did not complete: {}",
                            agent, err
                        ))),
                        agent,
                    });
                }
            }
        }
        outcomes
    }
}
