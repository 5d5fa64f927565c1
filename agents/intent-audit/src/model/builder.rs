//! Model builder
//!
//! Turns raw JSON records, as delivered by the bundle loader, into the
//! canonical [`Agent`] and [`Intent`] types. Optional fields that are absent
//! are treated as absent; missing mandatory structure is a
//! [`AuditError::MalformedIntent`] or [`AuditError::MalformedAgent`].

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::{
    Agent, Intent, ListItem, Message, ResponseGroup, SpeechPayload, FACEBOOK_PLATFORM,
    GOOGLE_PLATFORM,
};
use crate::error::{AuditError, IntentRef, Result};

const SIMPLE_RESPONSE_TYPE: &str = "simple_response";
const LIST_CARD_TYPE: &str = "list_card";

/// Build the agent from its metadata record (`agent.json`).
pub fn build_agent(name: &str, metadata: &Value) -> Result<Agent> {
    let assistant = metadata
        .get("googleAssistant")
        .and_then(Value::as_object)
        .ok_or_else(|| AuditError::malformed_agent(name, "missing 'googleAssistant' section"))?;

    let ids = match assistant.get("endIntentIds") {
        Some(Value::Array(ids)) => ids,
        Some(other) => {
            return Err(AuditError::malformed_agent(
                name,
                format!(
                    "'googleAssistant.endIntentIds' must be a list, found {}",
                    kind_of(other)
                ),
            ))
        }
        None => {
            return Err(AuditError::malformed_agent(
                name,
                "missing 'googleAssistant.endIntentIds'",
            ))
        }
    };

    let end_intent_ids = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            id.as_str().map(str::to_string).ok_or_else(|| {
                AuditError::malformed_agent(
                    name,
                    format!("endIntentIds[{}] must be a string, found {}", i, kind_of(id)),
                )
            })
        })
        .collect::<Result<BTreeSet<_>>>()?;

    Ok(Agent {
        name: name.to_string(),
        end_intent_ids,
    })
}

/// Build one intent from its raw record.
///
/// `index` is the record's position in the bundle and is used to identify
/// the record when it has no usable name.
pub fn build_intent(index: usize, record: &Value) -> Result<Intent> {
    let obj = record.as_object().ok_or_else(|| {
        AuditError::malformed_intent(
            IntentRef::Index(index),
            format!("record must be an object, found {}", kind_of(record)),
        )
    })?;

    let name = match obj.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(AuditError::malformed_intent(
                IntentRef::Index(index),
                "missing string field 'name'",
            ))
        }
    };

    let ctx = IntentCtx {
        intent: IntentRef::Named(name.clone()),
    };

    let webhook_used = match obj.get("webhookUsed") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(used)) => *used,
        Some(other) => {
            return Err(ctx.malformed(format!(
                "'webhookUsed' must be a boolean, found {}",
                kind_of(other)
            )))
        }
    };

    let responses = match obj.get("responses") {
        Some(Value::Array(groups)) if !groups.is_empty() => groups,
        Some(Value::Array(_)) => return Err(ctx.malformed("'responses' is empty")),
        Some(other) => {
            return Err(ctx.malformed(format!(
                "'responses' must be a list, found {}",
                kind_of(other)
            )))
        }
        None => return Err(ctx.malformed("missing 'responses'")),
    };

    // Only the first group is evaluated, so only it has to be well formed.
    let mut response_groups = vec![ctx.response_group(0, &responses[0])?];
    for (i, group) in responses.iter().enumerate().skip(1) {
        match ctx.response_group(i, group) {
            Ok(group) => response_groups.push(group),
            Err(err) => tracing::debug!(intent = %name, "skipping response group: {}", err),
        }
    }

    Ok(Intent {
        name,
        webhook_used,
        response_groups,
    })
}

/// Carries the intent identity so every error names the intent it came from.
struct IntentCtx {
    intent: IntentRef,
}

impl IntentCtx {
    fn malformed(&self, reason: impl Into<String>) -> AuditError {
        AuditError::malformed_intent(self.intent.clone(), reason)
    }

    fn response_group(&self, index: usize, raw: &Value) -> Result<ResponseGroup> {
        let path = format!("responses[{}]", index);
        let group = self.object(raw, &path)?;

        let messages = match group.get("messages") {
            Some(Value::Array(messages)) => messages,
            Some(other) => {
                return Err(self.malformed(format!(
                    "{}.messages must be a list, found {}",
                    path,
                    kind_of(other)
                )))
            }
            None => return Err(self.malformed(format!("missing {}.messages", path))),
        };

        let messages = messages
            .iter()
            .enumerate()
            .map(|(i, message)| self.message(&format!("{}.messages[{}]", path, i), message))
            .collect::<Result<Vec<_>>>()?;

        let default_response_platforms = match group.get("defaultResponsePlatforms") {
            None | Some(Value::Null) => BTreeMap::new(),
            Some(Value::Object(flags)) => flags
                .iter()
                .map(|(platform, flag)| (platform.clone(), is_truthy(flag)))
                .collect(),
            Some(other) => {
                return Err(self.malformed(format!(
                    "{}.defaultResponsePlatforms must be an object, found {}",
                    path,
                    kind_of(other)
                )))
            }
        };

        Ok(ResponseGroup {
            messages,
            default_response_platforms,
        })
    }

    /// Classify a message by its `(type, platform)` pair.
    fn message(&self, path: &str, raw: &Value) -> Result<Message> {
        let fields = self.object(raw, path)?;
        let platform = fields.get("platform").and_then(Value::as_str);

        let message = match fields.get("type") {
            Some(Value::Number(code)) if code.as_f64() == Some(0.0) => match platform {
                Some(FACEBOOK_PLATFORM) | Some(GOOGLE_PLATFORM) => Message::Other,
                _ => Message::DefaultFulfillment {
                    speech: self.optional_payload(fields.get("speech"), &format!("{}.speech", path))?,
                    platform: platform.map(str::to_string),
                },
            },
            Some(Value::String(kind))
                if kind == SIMPLE_RESPONSE_TYPE && platform == Some(GOOGLE_PLATFORM) =>
            {
                Message::SimpleResponse {
                    text_to_speech: self.simple_response_text(path, fields)?,
                }
            }
            Some(Value::String(kind))
                if kind == LIST_CARD_TYPE && platform == Some(GOOGLE_PLATFORM) =>
            {
                Message::ListCard {
                    items: self.list_items(path, fields)?,
                }
            }
            _ => Message::Other,
        };

        Ok(message)
    }

    /// A simple response carries its text either directly in `textToSpeech`
    /// or spread over `items[].textToSpeech`. A non-empty direct text wins.
    fn simple_response_text(&self, path: &str, message: &Map<String, Value>) -> Result<SpeechPayload> {
        let direct = match message.get("textToSpeech") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                return Err(self.malformed(format!(
                    "{}.textToSpeech must be a string, found {}",
                    path,
                    kind_of(other)
                )))
            }
        };
        if !direct.is_empty() {
            return Ok(SpeechPayload::Scalar(direct));
        }

        let items = match message.get("items") {
            None | Some(Value::Null) => return Ok(SpeechPayload::Sequence(Vec::new())),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(self.malformed(format!(
                    "{}.items must be a list, found {}",
                    path,
                    kind_of(other)
                )))
            }
        };

        let texts = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_path = format!("{}.items[{}]", path, i);
                let item = self.object(item, &item_path)?;
                match item.get("textToSpeech") {
                    None | Some(Value::Null) => Ok(String::new()),
                    Some(Value::String(text)) => Ok(text.clone()),
                    Some(other) => Err(self.malformed(format!(
                        "{}.textToSpeech must be a string, found {}",
                        item_path,
                        kind_of(other)
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SpeechPayload::Sequence(texts))
    }

    fn list_items(&self, path: &str, message: &Map<String, Value>) -> Result<Vec<ListItem>> {
        let items = match message.get("items") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(self.malformed(format!(
                    "{}.items must be a list, found {}",
                    path,
                    kind_of(other)
                )))
            }
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item = self.object(item, &format!("{}.items[{}]", path, i))?;
                let accessibility_text = item
                    .get("image")
                    .and_then(|image| image.get("accessibilityText"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Ok(ListItem { accessibility_text })
            })
            .collect()
    }

    /// Normalize a speech-like field; absence yields an empty payload.
    fn optional_payload(&self, raw: Option<&Value>, path: &str) -> Result<SpeechPayload> {
        match raw {
            None | Some(Value::Null) => Ok(SpeechPayload::default()),
            Some(value) => normalize_payload(value).ok_or_else(|| {
                self.malformed(format!(
                    "{} must be a string or a list of strings, found {}",
                    path,
                    kind_of(value)
                ))
            }),
        }
    }

    fn object<'a>(&self, raw: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
        raw.as_object().ok_or_else(|| {
            self.malformed(format!("{} must be an object, found {}", path, kind_of(raw)))
        })
    }
}

/// String → `Scalar`, list of strings → `Sequence`, anything else → `None`.
fn normalize_payload(raw: &Value) -> Option<SpeechPayload> {
    match raw {
        Value::String(text) => Some(SpeechPayload::Scalar(text.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(SpeechPayload::Sequence),
        _ => None,
    }
}

/// JSON truthiness for platform flags
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
