//! Webhook usage rule

use super::{IntentRule, RuleFinding, RuleTag};
use crate::model::Intent;

/// Flags intents that do not call the fulfillment webhook
#[derive(Debug, Default)]
pub struct NoWebhookRule;

impl IntentRule for NoWebhookRule {
    fn tag(&self) -> RuleTag {
        RuleTag::NoWebhook
    }

    fn description(&self) -> &str {
        "Intent must have the webhook call enabled"
    }

    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding> {
        if intent.webhook_used {
            return Vec::new();
        }
        vec![RuleFinding::new(
            self.tag(),
            "webhook call is not enabled",
            "webhookUsed",
        )]
    }
}
