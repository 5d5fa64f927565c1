//! Bundle loader
//!
//! Reads extracted agent exports from disk. Each agent lives in its own
//! directory under the projects directory:
//!
//! ```text
//! project_files/
//! └── <agent>/
//!     ├── agent.json
//!     └── intents/
//!         ├── <intent>.json
//!         └── <intent>_usersays_<lang>.json   (training phrases, skipped)
//! ```

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};

/// Agent metadata file inside an agent directory
pub const AGENT_METADATA_FILE: &str = "agent.json";

/// Directory holding the intent records
pub const INTENTS_DIR: &str = "intents";

/// File name marker of training-phrase files
pub const TRAINING_PHRASE_MARKER: &str = "usersays_";

/// One intent file as read from disk
#[derive(Debug, Clone)]
pub struct RawIntent {
    /// File name the record came from
    pub source: String,
    /// Parsed JSON, or the parse error message
    pub content: std::result::Result<Value, String>,
}

/// An agent bundle before model building
#[derive(Debug, Clone)]
pub struct RawBundle {
    pub agent: String,
    pub metadata: Value,
    pub intents: Vec<RawIntent>,
}

/// Whether `file_name` holds training phrases rather than an intent
pub fn is_training_phrase_file(file_name: &str) -> bool {
    file_name.contains(TRAINING_PHRASE_MARKER)
}

/// Agent name derived from its directory
pub fn agent_name(agent_dir: &Path) -> String {
    agent_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| agent_dir.display().to_string())
}

/// List agent directories under `projects_dir`, sorted by name.
pub fn discover_agents(projects_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(projects_dir).map_err(|e| {
        AuditError::file_error(format!(
            "Failed to read projects directory '{}': {}",
            projects_dir.display(),
            e
        ))
    })?;

    let mut agents = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            agents.push(entry.path());
        }
    }
    agents.sort();

    tracing::debug!(
        projects_dir = %projects_dir.display(),
        count = agents.len(),
        "discovered agent directories"
    );
    Ok(agents)
}

/// Load one agent bundle.
///
/// A missing or unparseable `agent.json` makes the whole bundle unavailable.
/// Intent files that are not valid JSON are kept with their parse error so
/// the audit can report them; a missing `intents/` directory means the agent
/// has no intents.
pub fn load_bundle(agent_dir: &Path) -> Result<RawBundle> {
    let agent = agent_name(agent_dir);
    let unavailable = |reason: String| AuditError::bundle_unavailable(agent.clone(), reason);

    let metadata_path = agent_dir.join(AGENT_METADATA_FILE);
    let metadata = fs::read_to_string(&metadata_path)
        .map_err(|e| unavailable(format!("cannot read {}: {}", metadata_path.display(), e)))?;
    let metadata: Value = serde_json::from_str(&metadata)
        .map_err(|e| unavailable(format!("invalid JSON in {}: {}", AGENT_METADATA_FILE, e)))?;

    let intents_dir = agent_dir.join(INTENTS_DIR);
    let intents = if intents_dir.is_dir() {
        read_intents(&intents_dir).map_err(|e| unavailable(e.to_string()))?
    } else {
        tracing::warn!(agent = %agent, "bundle has no intents directory");
        Vec::new()
    };

    Ok(RawBundle {
        agent,
        metadata,
        intents,
    })
}

fn read_intents(intents_dir: &Path) -> std::io::Result<Vec<RawIntent>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(intents_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if is_json && !is_training_phrase_file(&file_name) {
            files.push((file_name, path));
        }
    }
    files.sort();

    files
        .into_iter()
        .map(|(source, path)| -> std::io::Result<RawIntent> {
            let text = fs::read_to_string(&path)?;
            let content = serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {}", e));
            Ok(RawIntent { source, content })
        })
        .collect()
}
