//! Report aggregation
//!
//! Folds per-intent evaluations and the agent-level result into one
//! [`ValidationReport`] per agent. Every bucket has set semantics: an intent
//! flagged several times by the same rule is listed once.

pub mod render;

pub use render::{render_text, ReportWriter};

use serde::Serialize;
use std::collections::HashSet;

use crate::engine::rules::RuleTag;
use crate::engine::IntentEvaluation;
use crate::error::IntentRef;

/// Ordered set of intent names, first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntentBucket {
    names: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl IntentBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name; returns `false` when it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if !self.seen.insert(name.to_string()) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

/// An intent record that could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedIntentRecord {
    pub intent: IntentRef,
    pub reason: String,
}

/// Audit result for one agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Agent name
    pub agent: String,
    /// Whether the agent declares an end-of-conversation intent
    pub end_intent_present: bool,
    pub no_webhook: IntentBucket,
    pub no_default_fulfillment: IntentBucket,
    pub long_fulfillment: IntentBucket,
    pub default_not_front: IntentBucket,
    pub no_accessibility_text: IntentBucket,
    /// Every successfully built intent, in input order
    pub all_intent_names: Vec<String>,
    /// Records that failed to build
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub malformed_intents: Vec<MalformedIntentRecord>,
    /// Findings of the intents that failed at least one rule
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub evaluations: Vec<IntentEvaluation>,
}

impl ValidationReport {
    /// Bucket holding the intents flagged with `tag`
    pub fn bucket(&self, tag: RuleTag) -> &IntentBucket {
        match tag {
            RuleTag::NoWebhook => &self.no_webhook,
            RuleTag::NoDefaultFulfillment => &self.no_default_fulfillment,
            RuleTag::LongFulfillment => &self.long_fulfillment,
            RuleTag::DefaultNotFront => &self.default_not_front,
            RuleTag::NoAccessibilityText => &self.no_accessibility_text,
        }
    }

    fn bucket_mut(&mut self, tag: RuleTag) -> &mut IntentBucket {
        match tag {
            RuleTag::NoWebhook => &mut self.no_webhook,
            RuleTag::NoDefaultFulfillment => &mut self.no_default_fulfillment,
            RuleTag::LongFulfillment => &mut self.long_fulfillment,
            RuleTag::DefaultNotFront => &mut self.default_not_front,
            RuleTag::NoAccessibilityText => &mut self.no_accessibility_text,
        }
    }

    /// True when all five per-intent buckets are empty.
    ///
    /// End-intent presence and malformed records do not affect this flag.
    pub fn no_problems_found(&self) -> bool {
        RuleTag::ALL.iter().all(|tag| self.bucket(*tag).is_empty())
    }

    /// Number of distinct intents flagged by at least one rule
    pub fn flagged_intent_count(&self) -> usize {
        self.all_intent_names
            .iter()
            .filter(|name| RuleTag::ALL.iter().any(|tag| self.bucket(*tag).contains(name)))
            .count()
    }
}

/// Builder for [`ValidationReport`]
pub struct ReportBuilder {
    report: ValidationReport,
}

impl ReportBuilder {
    pub fn new(agent: impl Into<String>, end_intent_present: bool) -> Self {
        Self {
            report: ValidationReport {
                agent: agent.into(),
                end_intent_present,
                no_webhook: IntentBucket::new(),
                no_default_fulfillment: IntentBucket::new(),
                long_fulfillment: IntentBucket::new(),
                default_not_front: IntentBucket::new(),
                no_accessibility_text: IntentBucket::new(),
                all_intent_names: Vec::new(),
                malformed_intents: Vec::new(),
                evaluations: Vec::new(),
            },
        }
    }

    /// Record an evaluated intent: roster entry plus one bucket entry per tag
    pub fn add_evaluation(&mut self, evaluation: IntentEvaluation) -> &mut Self {
        self.report.all_intent_names.push(evaluation.intent.clone());

        for tag in evaluation.tags() {
            self.report.bucket_mut(tag).insert(&evaluation.intent);
        }
        if !evaluation.is_clean() {
            self.report.evaluations.push(evaluation);
        }
        self
    }

    /// Record an intent that could not be built
    pub fn add_malformed(&mut self, intent: IntentRef, reason: impl Into<String>) -> &mut Self {
        self.report.malformed_intents.push(MalformedIntentRecord {
            intent,
            reason: reason.into(),
        });
        self
    }

    pub fn finalize(self) -> ValidationReport {
        self.report
    }
}
