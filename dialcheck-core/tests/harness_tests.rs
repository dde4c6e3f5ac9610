//! Integration tests for scenario runs
//!
//! These tests drive the public API end to end: scenario files on disk,
//! configuration layering, the batch harness, and the Markdown report.

use std::sync::Arc;
use std::time::Duration;

use dialcheck_core::prelude::*;
use tempfile::TempDir;

const SCENARIOS: &str = r#"{
  "scenarios": [
    {
      "id": "confirm_identity",
      "name": "Identity confirmed",
      "description": "Caller confirms who they are",
      "category": "identification",
      "messages": [
        { "role": "agent", "content": "Bonjour, puis-je parler à Mme Durand ?" },
        { "role": "user", "content": "Oui, c'est moi." }
      ],
      "expected_outcomes": ["identification_confirmed", "proceed_to_payment"]
    },
    {
      "id": "dispute",
      "name": "Debt disputed",
      "description": "Caller contests the amount",
      "category": "objection",
      "messages": [
        { "role": "user", "content": "Je ne dois rien du tout !" }
      ],
      "expected_outcomes": ["dispute_acknowledged", "escalation_offered"]
    },
    {
      "id": "hang_up",
      "name": "Caller leaves",
      "description": "Caller wants to end the call",
      "category": "closure",
      "messages": [
        { "role": "user", "content": "Je n'ai pas le temps." }
      ],
      "expected_outcomes": ["polite_closure"]
    }
  ]
}"#;

fn write_scenarios(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scenarios.json");
    std::fs::write(&path, SCENARIOS).expect("Failed to write scenarios");
    path
}

fn builtin_harness(stub: Arc<StubLLMProvider>) -> TestHarness {
    let catalog = OutcomeCatalog::builtin().expect("builtin catalog parses");
    TestHarness::new(stub, Arc::new(catalog))
}

#[tokio::test]
async fn test_scenario_file_run() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let set = ScenarioSet::load(write_scenarios(&dir)).expect("scenarios load");
    assert_eq!(set.len(), 3);

    let stub = Arc::new(StubLLMProvider::with_replies([
        StubReply::content("Merci de confirmer, nous allons procéder au paiement."),
        StubReply::content("Je comprends votre désaccord, un conseiller va vous rappeler."),
        StubReply::status(503, "overloaded"),
    ]));

    let summary = builtin_harness(stub.clone())
        .run_all(&set.scenarios, "Tu es Claire, conseillère en recouvrement.")
        .await
        .expect("run completes");

    assert_eq!(summary.total_scenarios, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.results[0].success);
    assert!(summary.results[1].success);
    assert!(summary.results[1].outcomes_met.contains(&"escalation_offered".to_string()));
    assert_eq!(summary.handoff_rate, 1.0 / 3.0);

    let failed = &summary.results[2];
    assert!(!failed.success);
    assert_eq!(failed.response_time_ms, 0);
    assert_eq!(failed.outcomes_missed, vec!["polite_closure"]);
    assert!(failed.error.as_deref().unwrap_or_default().contains("503"));

    // Agent turns in the file are not sent to the backend
    let requests = stub.requests().await;
    assert_eq!(requests[0].messages.len(), 2);
    assert_eq!(requests[0].messages[0].role, MessageRole::System);
    assert_eq!(requests[0].messages[1].content, "Oui, c'est moi.");
}

#[tokio::test]
async fn test_summary_json_wire_names() {
    let stub = Arc::new(StubLLMProvider::with_replies([StubReply::content("Au revoir.")]));
    let scenario = Scenario::new("bye", "Goodbye")
        .with_user_turn("Je raccroche.")
        .expecting("polite_closure");

    let summary = builtin_harness(stub)
        .run_all(&[scenario], "prompt")
        .await
        .expect("run completes");
    let json = serde_json::to_value(&summary).expect("summary serializes");

    for key in [
        "total_scenarios",
        "successful",
        "failed",
        "success_rate",
        "avg_response_time_ms",
        "p95_response_time_ms",
        "handoff_rate",
        "results",
        "notable_failures",
        "example_transcripts",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    let result = &json["results"][0];
    assert_eq!(result["scenario_id"], "bye");
    assert_eq!(result["transcript"][1]["role"], "assistant");
    assert!(result.get("error").is_none());
}

#[tokio::test]
async fn test_config_file_drives_harness() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let catalog_path = dir.path().join("outcomes.toml");
    std::fs::write(
        &catalog_path,
        "[outcomes]\ntransfer = [\"je vous transf[eè]re\"]\n",
    )
    .expect("Failed to write catalog");

    let config_path = dir.path().join("dialcheck.toml");
    std::fs::write(
        &config_path,
        format!(
            "catalog_path = {:?}\n\n[harness]\nsuccess_ratio = 1.0\nhandoff_outcomes = [\"transfer\"]\ncall_timeout = \"5s\"\n",
            catalog_path
        ),
    )
    .expect("Failed to write config");

    let config = DialcheckConfig::from_file(&config_path).expect("config loads");
    assert_eq!(config.harness.call_timeout, Some(Duration::from_secs(5)));

    let stub = Arc::new(StubLLMProvider::with_replies([
        StubReply::content("Je vous transfère à un collègue."),
        StubReply::content("Très bien."),
    ]));
    let harness = TestHarness::from_config(&config, stub).expect("harness builds");

    let scenarios = vec![
        Scenario::new("a", "Transfer").with_user_turn("Un humain !").expecting("transfer"),
        Scenario::new("b", "No transfer").with_user_turn("Ok.").expecting("transfer"),
    ];
    let summary = harness.run_all(&scenarios, "prompt").await.expect("run completes");

    assert_eq!(summary.successful, 1);
    assert_eq!(summary.handoff_rate, 0.5);
}

#[tokio::test]
async fn test_markdown_report_for_run() {
    let stub = Arc::new(StubLLMProvider::with_replies([
        StubReply::content("Je comprends, prenons le temps d'en parler."),
        StubReply::transport("connection refused"),
    ]));
    let scenarios = vec![
        Scenario::new("calm", "Upset caller")
            .with_category("emotions")
            .with_user_turn("Je suis furieux.")
            .expecting("empathy_shown"),
        Scenario::new("down", "Backend down")
            .with_user_turn("Allô ?")
            .expecting("polite_closure"),
    ];

    let summary = builtin_harness(stub)
        .run_all(&scenarios, "prompt")
        .await
        .expect("run completes");
    let report = render_markdown(&summary);

    assert!(report.contains("| Scénarios totaux | 2 |"));
    assert!(report.contains("- **emotions** : Upset caller"));
    assert!(report.contains("### Upset caller"));
    assert!(report.contains("connection refused"));
    assert!(report_file_name(summary.run_at).starts_with("test-report-"));
}

#[test]
fn test_invalid_scenario_file_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"scenarios\": [{\"id\": \"x\"}]}").expect("Failed to write");

    let err = ScenarioSet::load(&path).unwrap_err();
    assert!(matches!(err, DialcheckError::Scenario(_)));
    assert!(err.is_run_fatal());
}
