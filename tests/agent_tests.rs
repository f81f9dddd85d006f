//! OpenAI-compatible chat backend against a mock completion endpoint.

use std::time::Duration;

use metis_balance_agent::agent::{
    Agent, AgentError, ChatMessage, LanguageModel, OpenAiChat, WindowBufferMemory,
};
use mockito::{mock, Matcher};
use secrecy::SecretString;
use serde_json::json;

fn client() -> OpenAiChat {
    OpenAiChat::new(
        &format!("{}/v1/", mockito::server_url()),
        SecretString::new("test-key".to_string()),
        "gpt-4",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn sends_model_messages_and_bearer_key() {
    let m = mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "  hello!  "}}]}).to_string())
        .create();

    let reply = client()
        .complete(&[ChatMessage::system("be brief"), ChatMessage::user("hi")])
        .await
        .unwrap();
    assert_eq!(reply, "hello!");
    m.assert();
}

#[tokio::test]
async fn api_errors_carry_status_and_body() {
    let _m = mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body("rate limited")
        .create();

    match client().complete(&[ChatMessage::user("hi")]).await {
        Err(AgentError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let _m = mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"choices": []}).to_string())
        .create();

    let agent = Agent::new("p".to_string(), client(), WindowBufferMemory::new(4));
    assert!(matches!(agent.prompt("hi").await, Err(AgentError::EmptyReply)));
    assert_eq!(agent.history_len().await, 0);
}
