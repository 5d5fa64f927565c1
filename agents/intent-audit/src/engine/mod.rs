//! Rule engine for the Intent Audit Agent
//!
//! Evaluates canonical intents against the fixed rule set, plus the single
//! agent-level end-intent check. Evaluation is deterministic and never
//! touches the input.

pub mod rules;

use rules::{
    accessibility::NoAccessibilityTextRule,
    fulfillment::{LongFulfillmentRule, NoDefaultFulfillmentRule},
    platform::DefaultNotFrontRule,
    webhook::NoWebhookRule,
    IntentRule, RuleFinding, RuleTag,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{Agent, Intent};

/// Identifier of the agent-level rule
pub const END_INTENT_RULE_ID: &str = "end_intent_missing";

/// Findings for a single intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentEvaluation {
    /// Name of the evaluated intent
    pub intent: String,
    /// All findings, grouped by rule in rule order
    pub findings: Vec<RuleFinding>,
}

impl IntentEvaluation {
    /// Distinct tags among the findings
    pub fn tags(&self) -> BTreeSet<RuleTag> {
        self.findings.iter().map(|f| f.tag).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Entry of the rule catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub scope: RuleScope,
    pub description: String,
}

/// What a rule is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Agent,
    Intent,
}

/// The intent rule engine
pub struct RuleEngine {
    rules: Vec<Box<dyn IntentRule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Create the engine with the fixed rule set
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(NoWebhookRule),
                Box::new(NoDefaultFulfillmentRule),
                Box::new(LongFulfillmentRule),
                Box::new(DefaultNotFrontRule),
                Box::new(NoAccessibilityTextRule),
            ],
        }
    }

    /// Registered intent rules
    pub fn rules(&self) -> &[Box<dyn IntentRule>] {
        &self.rules
    }

    /// Catalog of every rule, the agent-level check first
    pub fn catalog(&self) -> Vec<RuleDescriptor> {
        let agent_rule = RuleDescriptor {
            id: END_INTENT_RULE_ID,
            scope: RuleScope::Agent,
            description: "Agent must declare at least one end-of-conversation intent".to_string(),
        };

        std::iter::once(agent_rule)
            .chain(self.rules.iter().map(|rule| RuleDescriptor {
                id: rule.tag().as_str(),
                scope: RuleScope::Intent,
                description: rule.description().to_string(),
            }))
            .collect()
    }

    /// Tags violated by `intent`
    pub fn evaluate(&self, intent: &Intent) -> BTreeSet<RuleTag> {
        self.evaluate_detailed(intent).tags()
    }

    /// Evaluate every rule and keep the individual findings
    pub fn evaluate_detailed(&self, intent: &Intent) -> IntentEvaluation {
        let mut findings = Vec::new();

        for rule in &self.rules {
            let rule_findings = rule.evaluate(intent);
            for finding in &rule_findings {
                tracing::debug!(
                    intent = %intent.name,
                    rule = %finding.tag,
                    location = %finding.location,
                    "{}",
                    finding.message
                );
            }
            findings.extend(rule_findings);
        }

        IntentEvaluation {
            intent: intent.name.clone(),
            findings,
        }
    }

    /// Whether the agent declares an end-of-conversation intent
    pub fn evaluate_agent(&self, agent: &Agent) -> bool {
        let present = !agent.end_intent_ids.is_empty();
        if !present {
            tracing::info!(
                agent = %agent.name,
                "no end intents declared; the Google Assistant integration is probably missing"
            );
        }
        present
    }
}
