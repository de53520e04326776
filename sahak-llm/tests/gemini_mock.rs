mod common;

use sahak_common::SahakError;
use sahak_llm::gemini::GeminiClient;
use sahak_llm::traits::LlmClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash-lite";
const ENDPOINT: &str = "/models/gemini-2.5-flash-lite:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::with_base_url(&server.uri(), "test-key".into(), MODEL.into()).expect("client")
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15 }
    })
}

#[tokio::test]
async fn generate_returns_candidate_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "인물 '안중근'을 분석하세요." }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("최종 분류: 의열투쟁\n근거...")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate("인물 '안중근'을 분석하세요.", None, None, None)
        .await
        .expect("reply");

    assert_eq!(response.text, "최종 분류: 의열투쟁\n근거...");
    assert_eq!(response.tokens_used, Some(15));
    assert_eq!(response.model.as_deref(), Some(MODEL));
}

#[tokio::test]
async fn multi_part_replies_are_concatenated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "결론: 개화파" }, { "text": "\n이유" }] } }]
        })))
        .mount(&server)
        .await;

    let text = client_for(&server).complete("p").await.expect("reply");
    assert_eq!(text, "결론: 개화파\n이유");
}

#[tokio::test]
async fn rate_limit_is_reported_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p").await.unwrap_err();
    match err {
        SahakError::Llm(msg) => assert!(msg.contains("Rate limit"), "got {msg}"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn safety_block_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p").await.unwrap_err();
    assert!(err.to_string().contains("safety"), "got {err}");
}

#[tokio::test]
async fn missing_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("p").await.unwrap_err();
    assert!(err.to_string().contains("no candidates"), "got {err}");
}

#[tokio::test]
async fn health_check_reports_false_on_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "API key not valid", "status": "UNAUTHENTICATED" }
        })))
        .mount(&server)
        .await;

    assert!(!client_for(&server).health_check().await.expect("never errors"));
}

#[tokio::test]
async fn sampling_defaults_are_sent_with_complete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 0.5, "maxOutputTokens": 256 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("최종 분류: 주화론")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .with_sampling(Some(0.5), Some(256))
        .complete("p")
        .await
        .expect("reply");
    assert_eq!(text, "최종 분류: 주화론");
}
