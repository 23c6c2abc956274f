//! OpenAI-compatible completion client tests against a mock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auto_survey::config::LlmConfig;
use auto_survey::error::LlmError;
use auto_survey::llm::{
    ChatMessage, CompletionRequest, CompletionService, OpenAiCompatibleClient, complete_structured,
};
use auto_survey::models::{IsRelevant, Queries};

fn setup_client(mock_server: &MockServer) -> OpenAiCompatibleClient {
    OpenAiCompatibleClient::new(LlmConfig::for_testing(&mock_server.uri())).unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

#[tokio::test]
async fn test_free_text_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 100,
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hi there")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let request = CompletionRequest::new(
        vec![ChatMessage::system("Be brief."), ChatMessage::user("Hello")],
        0.5,
        100,
    );
    assert_eq!(client.complete(request).await.unwrap(), "Hi there");
}

#[tokio::test]
async fn test_structured_completion_sends_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "response_format": {"type": "json_schema", "json_schema": {"name": "queries"}}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"queries": ["graph learning", "gnn"]}"#)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let queries: Queries =
        complete_structured(&client, vec![ChatMessage::user("queries please")], 0.5, 256)
            .await
            .unwrap();
    assert_eq!(queries.queries, vec!["graph learning", "gnn"]);
}

#[tokio::test]
async fn test_structured_completion_rejects_wrong_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Yes, it is relevant.")))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let err = complete_structured::<IsRelevant>(&client, vec![ChatMessage::user("?")], 0.0, 32)
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::InvalidStructuredResponse { schema: "is_relevant", .. }));
}

#[tokio::test]
async fn test_missing_content_is_empty_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let request = CompletionRequest::new(vec![ChatMessage::user("Hello")], 0.0, 10);
    assert!(matches!(client.complete(request).await.unwrap_err(), LlmError::EmptyCompletion));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let client = setup_client(&mock_server);
    let request = CompletionRequest::new(vec![ChatMessage::user("Hello")], 0.0, 10);
    match client.complete(request).await.unwrap_err() {
        LlmError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("unexpected error: {other}"),
    }
}
