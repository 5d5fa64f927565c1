//! Rule framework for intent auditing
//!
//! Every rule looks at one canonical [`Intent`] and reports zero or more
//! findings under a single [`RuleTag`]. The rule set is fixed; see
//! [`super::RuleEngine::new`].

pub mod accessibility;
pub mod fulfillment;
pub mod platform;
pub mod webhook;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Intent;

/// Tags for the per-intent rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTag {
    /// Webhook call is disabled
    NoWebhook,
    /// No usable default fulfillment text
    NoDefaultFulfillment,
    /// Fulfillment or simple response text is too long
    LongFulfillment,
    /// Default response is not placed in front of Google rich responses
    DefaultNotFront,
    /// A list card item has no image accessibility text
    NoAccessibilityText,
}

impl RuleTag {
    /// All per-intent tags in report order
    pub const ALL: [RuleTag; 5] = [
        RuleTag::NoWebhook,
        RuleTag::NoDefaultFulfillment,
        RuleTag::LongFulfillment,
        RuleTag::DefaultNotFront,
        RuleTag::NoAccessibilityText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleTag::NoWebhook => "no_webhook",
            RuleTag::NoDefaultFulfillment => "no_default_fulfillment",
            RuleTag::LongFulfillment => "long_fulfillment",
            RuleTag::DefaultNotFront => "default_not_front",
            RuleTag::NoAccessibilityText => "no_accessibility_text",
        }
    }
}

impl fmt::Display for RuleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation detected in an intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFinding {
    /// Rule that produced this finding
    pub tag: RuleTag,
    /// Human-readable description of the problem
    pub message: String,
    /// Location inside the intent record, e.g. `responses[0].messages[2].speech`
    pub location: String,
}

impl RuleFinding {
    pub fn new(tag: RuleTag, message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            tag,
            message: message.into(),
            location: location.into(),
        }
    }
}

impl fmt::Display for RuleFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] at '{}': {}", self.tag, self.location, self.message)
    }
}

/// Trait implemented by each per-intent rule
///
/// Rules are pure: the same intent always yields the same findings and no
/// rule depends on another rule's outcome.
pub trait IntentRule: Send + Sync {
    /// Tag every finding of this rule carries
    fn tag(&self) -> RuleTag;

    /// Description of what this rule checks
    fn description(&self) -> &str;

    /// Evaluate the rule. An empty result means the intent passes.
    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding>;
}

/// Path of the primary response group
pub(crate) const PRIMARY_GROUP_PATH: &str = "responses[0]";

/// Path of a message inside the primary response group
pub(crate) fn message_path(index: usize) -> String {
    format!("{}.messages[{}]", PRIMARY_GROUP_PATH, index)
}

/// Text length in characters, not bytes
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
