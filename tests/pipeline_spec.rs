//! End-to-end pipeline tests over real HTTP clients.
//!
//! The generation endpoint, draft collaborator and history service are all
//! simulated with wiremock; the orchestrator is wired exactly as `reqan serve`
//! wires it.

mod common;

use std::time::Duration;

use requirement_analyzer::config::AnalyzerConfig;
use requirement_analyzer::orchestrator::{AnalyzeError, AnalyzeOrchestrator};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

fn config_for(server: &MockServer) -> AnalyzerConfig {
    AnalyzerConfig {
        llm_url: server.uri(),
        llm_api_key: Some("sk-test".to_string()),
        draft_url: format!("{}/draft", server.uri()),
        history_url: Some(format!("{}/history", server.uri())),
        ..AnalyzerConfig::default()
    }
}

async fn requests_to(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == route)
        .count()
}

async fn mount_skeletons(server: &MockServer, titles: &[&str]) {
    let rounds = titles.len();
    for (i, title) in titles.iter().enumerate() {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(format!("variant {} of {}", i + 1, rounds)))
            .respond_with(chat_reply(&format!(
                "```json\n{}\n```",
                skeleton_json(title).replace("\"title\"", "\u{201C}title\u{201D}")
            )))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn drafts_every_skeleton_and_degrades_failures_in_place() {
    let server = MockServer::start().await;
    mount_skeletons(&server, &["Offline Variant", "Online Variant"]).await;

    Mock::given(method("POST"))
        .and(path("/draft"))
        .and(body_partial_json(serde_json::json!({ "title": "Offline Variant" })))
        .respond_with(ResponseTemplate::new(503))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/draft"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sections": [{ "title": "Introduction", "content": "Why now" }],
            "full_draft": "A long narrative",
            "feedback": "Reads well"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let orchestrator =
        AnalyzeOrchestrator::from_config(&config_for(&server), indexed(reference_corpus()))
            .expect("pipeline");

    let proposals = orchestrator
        .handle(WAREHOUSE_REQUIREMENTS, 2)
        .await
        .expect("analyze succeeds");

    assert_eq!(proposals.len(), 2);
    assert_eq!(proposals[0].skeleton.title, "Offline Variant");
    assert_eq!(proposals[0].draft.full_draft, "");
    assert!(proposals[0].draft.feedback.contains("unavailable"));
    assert_eq!(proposals[1].skeleton.title, "Online Variant");
    assert_eq!(proposals[1].draft.full_draft, "A long narrative");
    assert_eq!(proposals[1].draft.sections.len(), 1);
    assert_eq!(requests_to(&server, "/draft").await, 2);
}

#[tokio::test]
async fn history_is_notified_in_the_background() {
    let server = MockServer::start().await;
    mount_skeletons(&server, &["Only"]).await;
    Mock::given(method("POST"))
        .and(path("/draft"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "full_draft": "Text" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/history"))
        .and(body_partial_json(serde_json::json!({ "proposal_titles": ["Only"] })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let orchestrator =
        AnalyzeOrchestrator::from_config(&config_for(&server), indexed(reference_corpus()))
            .expect("pipeline");
    orchestrator
        .handle(WAREHOUSE_REQUIREMENTS, 1)
        .await
        .expect("analyze succeeds");

    let mut delivered = 0;
    for _ in 0..50 {
        delivered = requests_to(&server, "/history").await;
        if delivered > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn unreachable_history_service_does_not_fail_the_request() {
    let server = MockServer::start().await;
    mount_skeletons(&server, &["Only"]).await;
    Mock::given(method("POST"))
        .and(path("/draft"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "full_draft": "Text" })),
        )
        .mount(&server)
        .await;

    let config = AnalyzerConfig {
        history_url: Some("http://127.0.0.1:9/history".to_string()),
        ..config_for(&server)
    };
    let orchestrator =
        AnalyzeOrchestrator::from_config(&config, indexed(reference_corpus())).expect("pipeline");

    let proposals = orchestrator.handle(WAREHOUSE_REQUIREMENTS, 1).await.expect("analyze");
    assert_eq!(proposals[0].draft.full_draft, "Text");
}

#[tokio::test]
async fn slow_draft_service_times_out_into_placeholder() {
    let server = MockServer::start().await;
    mount_skeletons(&server, &["Patient"]).await;
    Mock::given(method("POST"))
        .and(path("/draft"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "full_draft": "Too late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = AnalyzerConfig {
        draft_timeout_secs: 1,
        history_url: None,
        ..config_for(&server)
    };
    let orchestrator =
        AnalyzeOrchestrator::from_config(&config, indexed(reference_corpus())).expect("pipeline");

    let proposals = orchestrator.handle(WAREHOUSE_REQUIREMENTS, 1).await.expect("analyze");
    assert!(proposals[0].draft.is_placeholder());
    assert!(!proposals[0].draft.feedback.is_empty());
}

#[tokio::test]
async fn rate_limited_generation_fails_before_any_drafting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let orchestrator =
        AnalyzeOrchestrator::from_config(&config_for(&server), indexed(reference_corpus()))
            .expect("pipeline");

    let err = orchestrator.handle(WAREHOUSE_REQUIREMENTS, 2).await.unwrap_err();
    assert!(matches!(err, AnalyzeError::Upstream { round: 1, .. }));
    assert_eq!(requests_to(&server, "/draft").await, 0);
}

#[tokio::test]
async fn garbage_generation_output_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_reply("Here are some thoughts, but no JSON."))
        .mount(&server)
        .await;

    let orchestrator =
        AnalyzeOrchestrator::from_config(&config_for(&server), indexed(reference_corpus()))
            .expect("pipeline");

    match orchestrator.handle(WAREHOUSE_REQUIREMENTS, 1).await {
        Err(AnalyzeError::Parse { source, .. }) => {
            assert_eq!(source.raw, "Here are some thoughts, but no JSON.");
        }
        other => panic!("expected parse error, got {:?}", other.map(|p| p.len())),
    }
}
