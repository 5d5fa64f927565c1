//! Default fulfillment rules
//!
//! Covers presence of the default fulfillment text and the length limit on
//! spoken text.
//!
//! The two length checks use different boundaries: a default fulfillment
//! entry fails at 640 characters, a simple response entry only above 640.
//! Both boundaries are kept as they are in the existing audit reports.

use super::{char_len, message_path, IntentRule, RuleFinding, RuleTag, PRIMARY_GROUP_PATH};
use crate::model::{Intent, SpeechPayload};

/// A default fulfillment entry of this many characters or more is too long.
pub const DEFAULT_FULFILLMENT_MAX_CHARS: usize = 640;

/// A simple response entry longer than this many characters is too long.
pub const SIMPLE_RESPONSE_MAX_CHARS: usize = 640;

/// Flags intents whose first default fulfillment is missing or empty
#[derive(Debug, Default)]
pub struct NoDefaultFulfillmentRule;

impl IntentRule for NoDefaultFulfillmentRule {
    fn tag(&self) -> RuleTag {
        RuleTag::NoDefaultFulfillment
    }

    fn description(&self) -> &str {
        "Intent must have a non-empty default fulfillment text"
    }

    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding> {
        let first = intent
            .primary_group()
            .and_then(|group| group.default_fulfillments().next());

        match first {
            None => vec![RuleFinding::new(
                self.tag(),
                "no default fulfillment message",
                format!("{}.messages", PRIMARY_GROUP_PATH),
            )],
            Some((index, speech)) if speech.is_empty() => vec![RuleFinding::new(
                self.tag(),
                "default fulfillment text is empty",
                format!("{}.speech", message_path(index)),
            )],
            Some(_) => Vec::new(),
        }
    }
}

/// Flags intents with spoken text over the length limit
#[derive(Debug, Default)]
pub struct LongFulfillmentRule;

impl LongFulfillmentRule {
    fn default_fulfillment_finding(&self, index: usize, speech: &SpeechPayload) -> Option<RuleFinding> {
        let base = format!("{}.speech", message_path(index));
        long_entry(speech, |len| len >= DEFAULT_FULFILLMENT_MAX_CHARS).map(|(entry, len)| {
            let location = match speech {
                SpeechPayload::Scalar(_) => base,
                SpeechPayload::Sequence(_) => format!("{}[{}]", base, entry),
            };
            RuleFinding::new(
                self.tag(),
                format!(
                    "default fulfillment text has {} characters (limit {})",
                    len, DEFAULT_FULFILLMENT_MAX_CHARS
                ),
                location,
            )
        })
    }

    fn simple_response_finding(&self, index: usize, text: &SpeechPayload) -> Option<RuleFinding> {
        long_entry(text, |len| len > SIMPLE_RESPONSE_MAX_CHARS).map(|(entry, len)| {
            let location = match text {
                SpeechPayload::Scalar(_) => format!("{}.textToSpeech", message_path(index)),
                SpeechPayload::Sequence(_) => {
                    format!("{}.items[{}].textToSpeech", message_path(index), entry)
                }
            };
            RuleFinding::new(
                self.tag(),
                format!(
                    "simple response text has {} characters (limit {})",
                    len, SIMPLE_RESPONSE_MAX_CHARS
                ),
                location,
            )
        })
    }
}

impl IntentRule for LongFulfillmentRule {
    fn tag(&self) -> RuleTag {
        RuleTag::LongFulfillment
    }

    fn description(&self) -> &str {
        "Default fulfillment and simple response texts must stay within 640 characters"
    }

    fn evaluate(&self, intent: &Intent) -> Vec<RuleFinding> {
        let Some(group) = intent.primary_group() else {
            return Vec::new();
        };

        let defaults = group
            .default_fulfillments()
            .filter_map(|(index, speech)| self.default_fulfillment_finding(index, speech));
        let simple = group
            .simple_responses()
            .filter_map(|(index, text)| self.simple_response_finding(index, text));

        defaults.chain(simple).collect()
    }
}

/// First entry of `payload` whose length trips `too_long`, with its position
/// and length. Scanning a message stops at the first offending entry.
fn long_entry(payload: &SpeechPayload, too_long: impl Fn(usize) -> bool) -> Option<(usize, usize)> {
    payload
        .entries()
        .map(char_len)
        .enumerate()
        .find(|(_, len)| too_long(*len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, ResponseGroup};

    fn intent_with(messages: Vec<Message>) -> Intent {
        Intent {
            name: "faq.hours".into(),
            webhook_used: true,
            response_groups: vec![ResponseGroup {
                messages,
                ..Default::default()
            }],
        }
    }

    fn default_fulfillment(speech: SpeechPayload) -> Message {
        Message::DefaultFulfillment {
            speech,
            platform: None,
        }
    }

    fn text(len: usize) -> String {
        "a".repeat(len)
    }

    #[test]
    fn test_missing_default_fulfillment() {
        let findings = NoDefaultFulfillmentRule.evaluate(&intent_with(vec![Message::Other]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "responses[0].messages");
    }

    #[test]
    fn test_only_first_default_fulfillment_counts() {
        let intent = intent_with(vec![
            default_fulfillment(SpeechPayload::Scalar(String::new())),
            default_fulfillment(SpeechPayload::Scalar("Hello".into())),
        ]);
        let findings = NoDefaultFulfillmentRule.evaluate(&intent);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "responses[0].messages[0].speech");
    }

    #[test]
    fn test_sequence_with_empty_string_is_present() {
        let intent = intent_with(vec![default_fulfillment(SpeechPayload::Sequence(vec![
            String::new(),
        ]))]);
        assert!(NoDefaultFulfillmentRule.evaluate(&intent).is_empty());

        let intent = intent_with(vec![default_fulfillment(SpeechPayload::Sequence(vec![]))]);
        assert_eq!(NoDefaultFulfillmentRule.evaluate(&intent).len(), 1);
    }

    #[test]
    fn test_default_fulfillment_boundary() {
        let at_limit = intent_with(vec![default_fulfillment(SpeechPayload::Scalar(text(640)))]);
        assert_eq!(LongFulfillmentRule.evaluate(&at_limit).len(), 1);

        let below = intent_with(vec![default_fulfillment(SpeechPayload::Scalar(text(639)))]);
        assert!(LongFulfillmentRule.evaluate(&below).is_empty());

        let seq = intent_with(vec![default_fulfillment(SpeechPayload::Sequence(vec![
            text(10),
            text(640),
        ]))]);
        let findings = LongFulfillmentRule.evaluate(&seq);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "responses[0].messages[0].speech[1]");
    }

    #[test]
    fn test_simple_response_boundary() {
        let at_limit = intent_with(vec![Message::SimpleResponse {
            text_to_speech: SpeechPayload::Scalar(text(640)),
        }]);
        assert!(LongFulfillmentRule.evaluate(&at_limit).is_empty());

        let over = intent_with(vec![Message::SimpleResponse {
            text_to_speech: SpeechPayload::Scalar(text(641)),
        }]);
        let findings = LongFulfillmentRule.evaluate(&over);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "responses[0].messages[0].textToSpeech");
    }

    #[test]
    fn test_simple_response_items_stop_at_first_long_entry() {
        let intent = intent_with(vec![Message::SimpleResponse {
            text_to_speech: SpeechPayload::Sequence(vec![text(5), text(700), text(900)]),
        }]);
        let findings = LongFulfillmentRule.evaluate(&intent);
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].location,
            "responses[0].messages[0].items[1].textToSpeech"
        );
    }

    #[test]
    fn test_both_length_checks_share_one_tag() {
        let intent = intent_with(vec![
            default_fulfillment(SpeechPayload::Scalar(text(800))),
            Message::SimpleResponse {
                text_to_speech: SpeechPayload::Scalar(text(800)),
            },
        ]);
        let findings = LongFulfillmentRule.evaluate(&intent);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.tag == RuleTag::LongFulfillment));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let intent = intent_with(vec![default_fulfillment(SpeechPayload::Scalar(
            "é".repeat(639),
        ))]);
        assert!(LongFulfillmentRule.evaluate(&intent).is_empty());
    }
}
