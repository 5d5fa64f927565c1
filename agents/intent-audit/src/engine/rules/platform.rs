//! Rich response ordering rule

use super::{IntentRule, RuleFinding, RuleTag, PRIMARY_GROUP_PATH};
use crate::model::{Intent, GOOGLE_PLATFORM};

/// Flags intents whose default response is not placed in front of the
/// Google Assistant rich responses
#[derive(Debug, Default)]
pub struct DefaultNotFrontRule;

impl IntentRule for DefaultNotFrontRule {
    fn tag(&self) -> RuleTag {
        RuleTag::DefaultNotFront
    }

    fn description(&self) -> &str {
        "Default response must be set to appear in front of Google Assistant rich responses"
    }

    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding> {
        let first_on_google = intent
            .primary_group()
            .is_some_and(|group| group.default_first_on(GOOGLE_PLATFORM));

        if first_on_google {
            return Vec::new();
        }
        vec![RuleFinding::new(
            self.tag(),
            "default response is not set to the front of Google rich responses",
            format!("{}.defaultResponsePlatforms.google", PRIMARY_GROUP_PATH),
        )]
    }
}
