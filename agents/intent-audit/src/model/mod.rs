//! Canonical in-memory model of an agent bundle
//!
//! Raw intent records are loosely shaped: a speech field may be a string or a
//! list of strings, and message kinds are implied by a `(type, platform)` pair.
//! The types here are the normalized form produced by [`builder`]; rules only
//! ever see these.

pub mod builder;

pub use builder::{build_agent, build_intent};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Platform name of the Google Assistant surface
pub const GOOGLE_PLATFORM: &str = "google";

/// Platform name of the Facebook Messenger surface
pub const FACEBOOK_PLATFORM: &str = "facebook";

/// Agent-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent name, unique within a run
    pub name: String,
    /// Identifiers of the intents that end a conversation
    pub end_intent_ids: BTreeSet<String>,
}

/// A named conversational action and its response configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub name: String,
    pub webhook_used: bool,
    /// Never empty once built
    pub response_groups: Vec<ResponseGroup>,
}

impl Intent {
    /// The only response group the rule set evaluates.
    ///
    /// Later groups are carried in the model when well formed, dropped
    /// otherwise, and no rule looks at them.
    pub fn primary_group(&self) -> Option<&ResponseGroup> {
        self.response_groups.first()
    }
}

/// One alternative set of messages an intent may return
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseGroup {
    pub messages: Vec<Message>,
    /// Platform name to "default response goes first" flag
    pub default_response_platforms: BTreeMap<String, bool>,
}

impl ResponseGroup {
    /// Whether the default response is placed in front of the rich responses
    /// for `platform`. Absent platforms count as `false`.
    pub fn default_first_on(&self, platform: &str) -> bool {
        self.default_response_platforms
            .get(platform)
            .copied()
            .unwrap_or(false)
    }

    /// Default fulfillment messages with their position in the group
    pub fn default_fulfillments(&self) -> impl Iterator<Item = (usize, &SpeechPayload)> {
        self.messages.iter().enumerate().filter_map(|(i, m)| match m {
            Message::DefaultFulfillment { speech, .. } => Some((i, speech)),
            _ => None,
        })
    }

    /// Google simple responses with their position in the group
    pub fn simple_responses(&self) -> impl Iterator<Item = (usize, &SpeechPayload)> {
        self.messages.iter().enumerate().filter_map(|(i, m)| match m {
            Message::SimpleResponse { text_to_speech } => Some((i, text_to_speech)),
            _ => None,
        })
    }

    /// Google list cards with their position in the group
    pub fn list_cards(&self) -> impl Iterator<Item = (usize, &[ListItem])> {
        self.messages.iter().enumerate().filter_map(|(i, m)| match m {
            Message::ListCard { items } => Some((i, items.as_slice())),
            _ => None,
        })
    }
}

/// A response message, classified once at build time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    /// Platform-agnostic text response (`type == 0`, not google/facebook)
    DefaultFulfillment {
        speech: SpeechPayload,
        platform: Option<String>,
    },
    /// Google Assistant simple response
    SimpleResponse { text_to_speech: SpeechPayload },
    /// Google Assistant list card
    ListCard { items: Vec<ListItem> },
    /// Any other message kind; ignored by the rules
    Other,
}

/// One entry of a list card
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub accessibility_text: Option<String>,
}

impl ListItem {
    pub fn has_accessibility_text(&self) -> bool {
        self.accessibility_text
            .as_deref()
            .is_some_and(|text| !text.is_empty())
    }
}

/// Text payload that arrives either as one string or as a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeechPayload {
    Scalar(String),
    Sequence(Vec<String>),
}

impl SpeechPayload {
    /// An empty string or an empty list. `[""]` is not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            SpeechPayload::Scalar(text) => text.is_empty(),
            SpeechPayload::Sequence(items) => items.is_empty(),
        }
    }

    /// Individual text entries: the scalar itself, or each list element
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            SpeechPayload::Scalar(text) => std::slice::from_ref(text),
            SpeechPayload::Sequence(items) => items,
        };
        slice.iter().map(String::as_str)
    }
}

impl Default for SpeechPayload {
    fn default() -> Self {
        SpeechPayload::Sequence(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_payload_emptiness() {
        assert!(SpeechPayload::Scalar(String::new()).is_empty());
        assert!(SpeechPayload::Sequence(vec![]).is_empty());
        assert!(!SpeechPayload::Sequence(vec![String::new()]).is_empty());
        assert!(!SpeechPayload::Scalar("hi".into()).is_empty());
    }

    #[test]
    fn test_speech_payload_entries() {
        let scalar = SpeechPayload::Scalar("hello".into());
        assert_eq!(scalar.entries().collect::<Vec<_>>(), vec!["hello"]);

        let seq = SpeechPayload::Sequence(vec!["a".into(), "b".into()]);
        assert_eq!(seq.entries().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_default_first_on_absent_platform() {
        let group = ResponseGroup::default();
        assert!(!group.default_first_on(GOOGLE_PLATFORM));
    }

    #[test]
    fn test_list_item_accessibility_text() {
        assert!(!ListItem::default().has_accessibility_text());
        assert!(!ListItem {
            accessibility_text: Some(String::new())
        }
        .has_accessibility_text());
        assert!(ListItem {
            accessibility_text: Some("A red bicycle".into())
        }
        .has_accessibility_text());
    }
}
