//! Integration tests for the Intent Audit Agent
//!
//! Drive the loader, pipeline and writer over agent exports laid out in a
//! temporary directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use intent_audit::{
    build_intent, discover_agents, load_bundle, render_text, AuditConfig, Auditor, ExitCode,
    OutputFormat, ReportWriter, RuleEngine, RuleTag,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

struct AgentFixture {
    dir: PathBuf,
}

impl AgentFixture {
    fn new(root: &Path, name: &str, end_intent_ids: Value) -> Self {
        let dir = root.join(name);
        fs::create_dir_all(dir.join("intents")).unwrap();
        fs::write(
            dir.join("agent.json"),
            json!({ "googleAssistant": { "endIntentIds": end_intent_ids } }).to_string(),
        )
        .unwrap();
        Self { dir }
    }

    fn intent(&self, file: &str, record: Value) -> &Self {
        fs::write(self.dir.join("intents").join(file), record.to_string()).unwrap();
        self
    }

    fn raw_file(&self, file: &str, content: &str) -> &Self {
        fs::write(self.dir.join("intents").join(file), content).unwrap();
        self
    }
}

fn clean_intent(name: &str) -> Value {
    json!({
        "name": name,
        "webhookUsed": true,
        "responses": [{
            "messages": [{ "type": 0, "platform": "default", "speech": "hi" }],
            "defaultResponsePlatforms": { "google": true }
        }]
    })
}

fn tags(record: Value) -> BTreeSet<RuleTag> {
    let intent = build_intent(0, &record).unwrap();
    RuleEngine::new().evaluate(&intent)
}

#[test]
fn test_clean_intent_has_no_tags() {
    assert!(tags(clean_intent("welcome")).is_empty());
}

#[test]
fn test_no_webhook_and_no_default_fulfillment() {
    let record = json!({
        "name": "order",
        "webhookUsed": false,
        "responses": [{
            "messages": [{ "type": "simple_response", "platform": "google", "textToSpeech": "Sure" }],
            "defaultResponsePlatforms": { "google": true }
        }]
    });
    assert_eq!(
        tags(record),
        BTreeSet::from([RuleTag::NoWebhook, RuleTag::NoDefaultFulfillment])
    );
}

#[test]
fn test_missing_google_flag_adds_default_not_front() {
    let record = json!({
        "name": "order",
        "webhookUsed": false,
        "responses": [{ "messages": [] }]
    });
    assert_eq!(
        tags(record),
        BTreeSet::from([
            RuleTag::NoWebhook,
            RuleTag::NoDefaultFulfillment,
            RuleTag::DefaultNotFront,
        ])
    );
}

#[test]
fn test_list_card_without_accessibility_text() {
    let record = json!({
        "name": "menu",
        "webhookUsed": true,
        "responses": [{
            "messages": [
                { "type": 0, "platform": "default", "speech": "Here is the menu" },
                {
                    "type": "list_card",
                    "platform": "google",
                    "items": [{ "title": "Margherita", "image": { "imageUri": "https://example.com/m.png" } }]
                }
            ],
            "defaultResponsePlatforms": { "google": true }
        }]
    });
    assert_eq!(tags(record), BTreeSet::from([RuleTag::NoAccessibilityText]));
}

#[test]
fn test_rules_ignore_later_response_groups() {
    let record = json!({
        "name": "welcome",
        "webhookUsed": true,
        "responses": [
            {
                "messages": [{ "type": 0, "platform": "default", "speech": "hi" }],
                "defaultResponsePlatforms": { "google": true }
            },
            {
                "messages": [
                    { "type": 0, "speech": "" },
                    { "type": "simple_response", "platform": "google", "textToSpeech": "z".repeat(900) },
                    { "type": "list_card", "platform": "google", "items": [{ "image": {} }] }
                ],
                "defaultResponsePlatforms": { "google": false }
            }
        ]
    });
    assert!(tags(record).is_empty());
}

#[test]
fn test_broken_later_group_keeps_intent_in_report() {
    let root = TempDir::new().unwrap();
    let agent = AgentFixture::new(root.path(), "pizza", json!(["end-1"]));
    agent.intent(
        "order.json",
        json!({
            "name": "order",
            "webhookUsed": false,
            "responses": [
                {
                    "messages": [{ "type": 0, "speech": "ok" }],
                    "defaultResponsePlatforms": { "google": true }
                },
                { "defaultResponsePlatforms": {} }
            ]
        }),
    );

    let report = Auditor::new()
        .audit_bundle(&load_bundle(&agent.dir).unwrap())
        .unwrap();
    assert_eq!(report.all_intent_names, vec!["order"]);
    assert_eq!(report.no_webhook.as_slice(), &["order".to_string()]);
    assert!(report.malformed_intents.is_empty());
}

#[test]
fn test_empty_end_intents_with_clean_intents() {
    let root = TempDir::new().unwrap();
    let agent = AgentFixture::new(root.path(), "pizza", json!([]));
    agent.intent("welcome.json", clean_intent("welcome"));

    let report = Auditor::new()
        .audit_bundle(&load_bundle(&agent.dir).unwrap())
        .unwrap();
    assert!(!report.end_intent_present);
    assert!(report.no_problems_found());
}

#[test]
fn test_roster_excludes_training_phrase_files() {
    let root = TempDir::new().unwrap();
    let agent = AgentFixture::new(root.path(), "pizza", json!(["end-1"]));
    agent
        .intent("welcome.json", clean_intent("welcome"))
        .intent("welcome_usersays_en.json", json!([{ "data": [{ "text": "hello" }] }]))
        .intent(
            "order.json",
            json!({ "name": "order", "webhookUsed": false, "responses": [{ "messages": [] }] }),
        )
        .intent("order_usersays_de.json", json!([]));

    let report = Auditor::new()
        .audit_bundle(&load_bundle(&agent.dir).unwrap())
        .unwrap();
    assert_eq!(report.all_intent_names, vec!["order", "welcome"]);
    assert!(report.end_intent_present);
    assert_eq!(report.no_webhook.as_slice(), &["order".to_string()]);
}

#[test]
fn test_malformed_records_are_reported_not_fatal() {
    let root = TempDir::new().unwrap();
    let agent = AgentFixture::new(root.path(), "pizza", json!(["end-1"]));
    agent
        .intent("welcome.json", clean_intent("welcome"))
        .intent("nameless.json", json!({ "responses": [{ "messages": [] }] }))
        .raw_file("truncated.json", "{\"name\": \"tru");

    let report = Auditor::new()
        .audit_bundle(&load_bundle(&agent.dir).unwrap())
        .unwrap();
    assert_eq!(report.all_intent_names, vec!["welcome"]);
    assert_eq!(report.malformed_intents.len(), 2);

    let text = render_text(&report);
    assert!(text.contains("INTENTS THAT COULD NOT BE PARSED"));
    assert!(text.contains("No problems found in any of the intents! Good job!"));
}

#[test]
fn test_length_boundaries() {
    let default_text = |len: usize| {
        json!({
            "name": "long",
            "webhookUsed": true,
            "responses": [{
                "messages": [{ "type": 0, "speech": "a".repeat(len) }],
                "defaultResponsePlatforms": { "google": true }
            }]
        })
    };
    assert!(tags(default_text(639)).is_empty());
    assert_eq!(tags(default_text(640)), BTreeSet::from([RuleTag::LongFulfillment]));

    let simple_text = |len: usize| {
        json!({
            "name": "long",
            "webhookUsed": true,
            "responses": [{
                "messages": [
                    { "type": 0, "speech": "ok" },
                    { "type": "simple_response", "platform": "google", "textToSpeech": "b".repeat(len) }
                ],
                "defaultResponsePlatforms": { "google": true }
            }]
        })
    };
    assert!(tags(simple_text(640)).is_empty());
    assert_eq!(tags(simple_text(641)), BTreeSet::from([RuleTag::LongFulfillment]));
}

#[test]
fn test_both_length_checks_listed_once() {
    let root = TempDir::new().unwrap();
    let agent = AgentFixture::new(root.path(), "pizza", json!(["end-1"]));
    agent.intent(
        "chatty.json",
        json!({
            "name": "chatty",
            "webhookUsed": true,
            "responses": [{
                "messages": [
                    { "type": 0, "speech": ["x".repeat(700)] },
                    { "type": "simple_response", "platform": "google", "textToSpeech": "y".repeat(700) }
                ],
                "defaultResponsePlatforms": { "google": true }
            }]
        }),
    );

    let report = Auditor::new()
        .audit_bundle(&load_bundle(&agent.dir).unwrap())
        .unwrap();
    assert_eq!(report.long_fulfillment.as_slice(), &["chatty".to_string()]);
    assert_eq!(report.evaluations[0].findings.len(), 2);
}

#[tokio::test]
async fn test_batch_run_writes_text_report() {
    let root = TempDir::new().unwrap();
    let projects = root.path().join("project_files");
    AgentFixture::new(&projects, "b-weather", json!([])).intent("forecast.json", clean_intent("forecast"));
    AgentFixture::new(&projects, "a-pizza", json!(["end-1"])).intent(
        "order.json",
        json!({ "name": "order", "webhookUsed": false, "responses": [{ "messages": [] }] }),
    );

    let agents = discover_agents(&projects).unwrap();
    let outcomes = Arc::new(Auditor::new()).audit_agents(agents, 2).await;

    let output = root.path().join("output_summary.txt");
    let mut writer = ReportWriter::create(&output, OutputFormat::Text).unwrap();
    for outcome in &outcomes {
        writer.write_report(outcome.result.as_ref().unwrap()).unwrap();
    }
    writer.finish().unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let pizza = text.find("Results for a-pizza").unwrap();
    let weather = text.find("Results for b-weather").unwrap();
    assert!(pizza < weather);
    assert!(text.contains("Have end of conversation intent? True"));
    assert!(text.contains("Have end of conversation intent? False"));
    assert!(text.contains("--------\nINTENTS WITH NO WEBHOOK ENABLED\n--------\n\norder\n"));
}

#[test]
fn test_cli_run_yaml_summary() {
    let root = TempDir::new().unwrap();
    let projects = root.path().join("project_files");
    AgentFixture::new(&projects, "pizza", json!(["end-1"])).intent("welcome.json", clean_intent("welcome"));
    fs::create_dir_all(projects.join("no-metadata")).unwrap();

    let output = root.path().join("reports").join("audit.yaml");
    let config = AuditConfig::builder()
        .projects_dir(&projects)
        .output_file(&output)
        .format(OutputFormat::Yaml)
        .jobs(1)
        .build()
        .unwrap();
    let code = intent_audit::cli::commands::execute_run(config, true).unwrap();
    assert_eq!(code, ExitCode::AgentFailed);

    let summary: Value = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(summary["reports"][0]["agent"], "pizza");
    assert_eq!(summary["reports"][0]["all_intent_names"], json!(["welcome"]));
    assert_eq!(summary["failures"][0]["agent"], "no-metadata");
}

fn arb_message() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0usize..700).prop_map(|n| json!({ "type": 0, "platform": "default", "speech": "s".repeat(n) })),
        prop::collection::vec(0usize..700, 0..3)
            .prop_map(|lens| json!({ "type": 0, "speech": lens.iter().map(|n| "s".repeat(*n)).collect::<Vec<_>>() })),
        (0usize..700).prop_map(|n| json!({ "type": "simple_response", "platform": "google", "textToSpeech": "t".repeat(n) })),
        prop::collection::vec(any::<bool>(), 0..4).prop_map(|flags| json!({
            "type": "list_card",
            "platform": "google",
            "items": flags.iter().map(|has| if *has {
                json!({ "image": { "accessibilityText": "photo" } })
            } else {
                json!({ "image": {} })
            }).collect::<Vec<_>>()
        })),
        Just(json!({ "type": "basic_card", "platform": "google" })),
    ]
}

fn arb_intent() -> impl Strategy<Value = Value> {
    (
        any::<bool>(),
        prop::option::of(any::<bool>()),
        prop::collection::vec(arb_message(), 0..5),
    )
        .prop_map(|(webhook, google, messages)| {
            let mut group = json!({ "messages": messages });
            if let Some(flag) = google {
                group["defaultResponsePlatforms"] = json!({ "google": flag });
            }
            json!({ "name": "generated", "webhookUsed": webhook, "responses": [group] })
        })
}

proptest! {
    #[test]
    fn prop_evaluation_is_idempotent(record in arb_intent()) {
        let intent = build_intent(0, &record).unwrap();
        let engine = RuleEngine::new();
        prop_assert_eq!(engine.evaluate_detailed(&intent), engine.evaluate_detailed(&intent));
    }

    #[test]
    fn prop_no_webhook_listed_exactly_once(record in arb_intent(), repeats in 1usize..4) {
        let intent = build_intent(0, &record).unwrap();
        let engine = RuleEngine::new();
        let mut builder = intent_audit::ReportBuilder::new("agent", true);
        for _ in 0..repeats {
            builder.add_evaluation(engine.evaluate_detailed(&intent));
        }
        let report = builder.finalize();

        let expected = usize::from(!intent.webhook_used);
        prop_assert_eq!(report.no_webhook.len(), expected);
        for tag in RuleTag::ALL {
            prop_assert!(report.bucket(tag).len() <= 1);
        }
        prop_assert_eq!(report.all_intent_names.len(), repeats);
    }
}
