//! Error types for the Intent Audit Agent
//!
//! Structural problems in an agent bundle are split by blast radius: a
//! malformed intent is recorded and the agent audit continues, a malformed or
//! unavailable agent bundle stops that agent only.

use std::fmt;

use thiserror::Error;

/// Identifies an intent record in error messages.
///
/// Records that carry a usable `name` are referred to by it; otherwise the
/// position in the bundle (or the source file name) is all we have.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum IntentRef {
    /// The intent's declared name
    Named(String),
    /// Zero-based index of the record within the bundle
    Index(usize),
    /// Source file the record was read from
    Source(String),
}

impl fmt::Display for IntentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentRef::Named(name) => write!(f, "{}", name),
            IntentRef::Index(index) => write!(f, "#{}", index),
            IntentRef::Source(source) => write!(f, "{}", source),
        }
    }
}

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// An intent record is missing mandatory structure
    #[error("Malformed intent {intent}: {reason}")]
    MalformedIntent { intent: IntentRef, reason: String },

    /// Agent metadata is missing required fields
    #[error("Malformed agent '{agent}': {reason}")]
    MalformedAgent { agent: String, reason: String },

    /// The agent bundle could not be loaded at all
    #[error("Bundle unavailable for agent '{agent}': {reason}")]
    BundleUnavailable { agent: String, reason: String },

    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Configuration file or environment error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error while rendering a report
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuditError {
    /// Create a malformed intent error
    pub fn malformed_intent(intent: IntentRef, reason: impl Into<String>) -> Self {
        AuditError::MalformedIntent {
            intent,
            reason: reason.into(),
        }
    }

    /// Create a malformed agent error
    pub fn malformed_agent(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::MalformedAgent {
            agent: agent.into(),
            reason: reason.into(),
        }
    }

    /// Create a bundle unavailable error
    pub fn bundle_unavailable(agent: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::BundleUnavailable {
            agent: agent.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AuditError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        AuditError::FileError(msg.into())
    }

    /// Create a configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        AuditError::ConfigError(msg.into())
    }

    /// Whether this error stops the audit of a single agent
    pub fn is_agent_fatal(&self) -> bool {
        matches!(
            self,
            AuditError::MalformedAgent { .. } | AuditError::BundleUnavailable { .. }
        )
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AuditError::InvalidInput(_) | AuditError::FileError(_) | AuditError::ConfigError(_)
        )
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        AuditError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::SerializationError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for AuditError {
    fn from(err: serde_yaml::Error) -> Self {
        AuditError::SerializationError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for AuditError {
    fn from(err: toml::de::Error) -> Self {
        AuditError::ConfigError(format!("TOML error: {}", err))
    }
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;
