//! HTTP provider behavior against a local mock server.

#![cfg(all(
    feature = "openai",
    feature = "anthropic",
    feature = "gemini",
    feature = "grok"
))]

use std::time::Duration;

use agent_hq::agent::providers::{
    AnthropicProvider, GeminiProvider, GrokProvider, OpenAiProvider,
};
use agent_hq::agent::{
    AgentCatalog, AgentConfig, ChatRequest, LlmProvider, Orchestrator, ProviderKind,
    ProviderRegistry, ProviderSettings, QueryRequest, RuntimeConfig,
};
use agent_hq::error::{AgentError, ErrorKind};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        api_key: Some("test-api-key".to_string()),
        base_url: Some(server.uri()),
    }
}

/// The SDK appends `/chat/completions` to a base that already carries `/v1`.
fn openai_settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        api_key: Some("test-api-key".to_string()),
        base_url: Some(format!("{}/v1", server.uri())),
    }
}

fn openai_error_body(message: &str, kind: &str) -> serde_json::Value {
    json!({"error": {"message": message, "type": kind, "param": null, "code": null}})
}

fn request(model: &str) -> ChatRequest {
    ChatRequest::new(model, "You track recalls.", "recall status?", 256)
}

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_completion_tokens": 256,
            "messages": [
                {"role": "system", "content": "You track recalls."},
                {"role": "user", "content": "recall status?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Two open recalls."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 18, "completion_tokens": 4, "total_tokens": 22}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server), TIMEOUT)
        .unwrap_or_else(|_| unreachable!());
    let response = provider
        .chat(&request("gpt-4o-mini"))
        .await
        .unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(response.content, "Two open recalls.");
    assert_eq!(response.usage.total_tokens, 22);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn test_openai_rate_limit_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(openai_error_body("Rate limit reached", "rate_limit_exceeded")),
        )
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(&openai_settings(&server), TIMEOUT)
        .unwrap_or_else(|_| unreachable!());
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        provider.chat(&request("gpt-4o-mini")),
    )
    .await;
    let err = result.ok().and_then(Result::err);
    assert!(matches!(err, Some(AgentError::ApiRequest { .. })));
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_openai_server_error_through_orchestrator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(openai_error_body("The server had an error", "server_error")),
        )
        .mount(&server)
        .await;

    let config = RuntimeConfig::builder()
        .api_key(ProviderKind::OpenAi, "test-api-key")
        .base_url(ProviderKind::OpenAi, format!("{}/v1", server.uri()))
        .build()
        .unwrap_or_else(|_| unreachable!());
    let providers = ProviderRegistry::from_config(&config).unwrap_or_else(|_| unreachable!());
    let catalog = AgentCatalog::from_configs([AgentConfig::new("nlp_analyzer")
        .provider("openai")
        .model("gpt-4o-mini")]);
    let mut orchestrator = Orchestrator::new(catalog, providers);

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        orchestrator.process_query(QueryRequest::new("分析這筆資料")),
    )
    .await
    .ok()
    .and_then(Result::ok)
    .unwrap_or_else(|| unreachable!());
    assert_eq!(outcome.agent_name, "nlp_analyzer");
    assert!(
        outcome
            .response
            .text
            .starts_with("Error executing agent nlp_analyzer: API request failed:"),
        "{}",
        outcome.response.text
    );
    assert_eq!(outcome.response.error, Some(ErrorKind::UnexpectedFailure));
    assert_eq!(orchestrator.history().len(), 1);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_anthropic_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-api-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-haiku-latest",
            "max_tokens": 256,
            "system": "You track recalls.",
            "messages": [{"role": "user", "content": "recall status?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "No open recalls."}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new(&settings(&server), TIMEOUT)
        .unwrap_or_else(|_| unreachable!());
    let response = provider
        .chat(&request("claude-3-haiku-latest"))
        .await
        .unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(response.content, "No open recalls.");
    assert_eq!(response.usage.total_tokens, 16);
}

#[tokio::test]
async fn test_anthropic_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new(&settings(&server), TIMEOUT)
        .unwrap_or_else(|_| unreachable!());
    let err = provider.chat(&request("claude-3-haiku-latest")).await.err();
    assert_eq!(
        err.map(|e| e.to_string()).unwrap_or_default(),
        "Anthropic API error: 429 rate limited"
    );
}

#[tokio::test]
async fn test_gemini_success_combines_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-api-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": "You track recalls.\n\nUser Query:\nrecall status?"}]
            }],
            "generationConfig": {"maxOutputTokens": 256}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "兩筆"}, {"text": "回收"}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        GeminiProvider::new(&settings(&server), TIMEOUT).unwrap_or_else(|_| unreachable!());
    let response = provider
        .chat(&request("gemini-2.5-flash"))
        .await
        .unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(response.content, "兩筆回收");
}

#[tokio::test]
async fn test_gemini_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let provider =
        GeminiProvider::new(&settings(&server), TIMEOUT).unwrap_or_else(|_| unreachable!());
    let err = provider.chat(&request("gemini-2.5-flash")).await.err();
    assert!(matches!(
        err,
        Some(AgentError::Transport { status: 403, ref body, .. }) if body == "forbidden"
    ));
}

#[tokio::test]
async fn test_grok_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "model": "grok-3-mini",
            "max_tokens": 256,
            "messages": [
                {"role": "system", "content": "You track recalls."},
                {"role": "user", "content": "recall status?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "All clear."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GrokProvider::new(&settings(&server)).unwrap_or_else(|_| unreachable!());
    let response = provider
        .chat(&request("grok-3-mini"))
        .await
        .unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(response.content, "All clear.");
    assert_eq!(response.usage.total_tokens, 23);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn test_grok_only_accepts_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GrokProvider::new(&settings(&server)).unwrap_or_else(|_| unreachable!());
    let err = provider.chat(&request("grok-3-mini")).await.err();
    assert_eq!(
        err.map(|e| e.to_string()).unwrap_or_default(),
        "Grok API error: 201 created"
    );
}

#[tokio::test]
async fn test_providers_without_key_make_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let no_key = ProviderSettings {
        api_key: None,
        base_url: Some(server.uri()),
    };
    let providers: Vec<Box<dyn LlmProvider>> = vec![
        Box::new(OpenAiProvider::new(&no_key, TIMEOUT).unwrap_or_else(|_| unreachable!())),
        Box::new(AnthropicProvider::new(&no_key, TIMEOUT).unwrap_or_else(|_| unreachable!())),
        Box::new(GeminiProvider::new(&no_key, TIMEOUT).unwrap_or_else(|_| unreachable!())),
        Box::new(GrokProvider::new(&no_key).unwrap_or_else(|_| unreachable!())),
    ];
    for provider in providers {
        let err = provider.chat(&request("m")).await.err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::CredentialMissing));
    }
}

#[tokio::test]
async fn test_orchestrator_end_to_end_with_model_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "grok-4-fast-reasoning"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "報關資料一致"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = RuntimeConfig::builder()
        .api_key(ProviderKind::Grok, "test-api-key")
        .base_url(ProviderKind::Grok, server.uri())
        .build()
        .unwrap_or_else(|_| unreachable!());
    let providers = ProviderRegistry::from_config(&config).unwrap_or_else(|_| unreachable!());
    let catalog = AgentCatalog::from_configs([AgentConfig::new("customs_verifier")
        .provider("openai")
        .model("gpt-4o-mini")]);
    let mut orchestrator = Orchestrator::new(catalog, providers);

    let outcome = orchestrator
        .process_query(QueryRequest::new("海關查驗").model("grok-4-fast-reasoning"))
        .await
        .unwrap_or_else(|e| unreachable!("{e}"));
    assert_eq!(outcome.agent_name, "customs_verifier");
    assert_eq!(outcome.response.text, "報關資料一致");
    assert!(outcome.response.is_success());
    assert_eq!(orchestrator.history().len(), 1);
    assert_eq!(orchestrator.history().records()[0].model, "grok-4-fast-reasoning");
}
