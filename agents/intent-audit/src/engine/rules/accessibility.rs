//! Accessibility rule for list cards

use super::{message_path, IntentRule, RuleFinding, RuleTag};
use crate::model::Intent;

/// Flags intents with list card items lacking image accessibility text
#[derive(Debug, Default)]
pub struct NoAccessibilityTextRule;

impl IntentRule for NoAccessibilityTextRule {
    fn tag(&self) -> RuleTag {
        RuleTag::NoAccessibilityText
    }

    fn description(&self) -> &str {
        "Every Google list card item must carry image accessibility text"
    }

    /// Reports at most one finding per list card: scanning a card stops at
    /// its first item without accessibility text.
    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding> {
        let Some(group) = intent.primary_group() else {
            return Vec::new();
        };

        group
            .list_cards()
            .filter_map(|(index, items)| {
                items
                    .iter()
                    .position(|item| !item.has_accessibility_text())
                    .map(|item| {
                        RuleFinding::new(
                            self.tag(),
                            "list card item has no image accessibility text",
                            format!("{}.items[{}].image.accessibilityText", message_path(index), item),
                        )
                    })
            })
            .collect()
    }
}
