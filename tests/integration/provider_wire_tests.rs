/*!
 * Integration tests for the request and response formats of the real backends,
 * run against a local HTTP stub
 */

use anyhow::Result;
use serde_json::json;
use std::time::Duration;

use gettext_cloud_translator::app_config::Backend;
use gettext_cloud_translator::errors::ProviderError;
use gettext_cloud_translator::providers::azure::AzureTranslator;
use gettext_cloud_translator::providers::chatgpt::ChatGptTranslator;
use gettext_cloud_translator::providers::openai::OpenAI;
use gettext_cloud_translator::providers::{Provider, create_provider};

use crate::common;
use crate::common::http_stub::HttpStub;

const TIMEOUT: Duration = Duration::from_secs(5);

fn texts(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn chat_completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string()
}

#[tokio::test]
async fn test_azure_translateBatch_shouldSendTranslatorV3Request() -> Result<()> {
    let response = json!([
        { "translations": [ { "text": "Hallo", "to": "de" } ] },
        { "translations": [ { "text": "Welt", "to": "de" } ] }
    ]);
    let stub = HttpStub::start(vec![(200, response.to_string())]).await;
    let provider = AzureTranslator::new("secret", "westeurope", stub.base_url.clone(), TIMEOUT);

    let translations = provider.translate_batch(&texts(&["Hello", "World"]), "en", "de").await?;

    assert_eq!(translations, vec![Some("Hallo".to_string()), Some("Welt".to_string())]);

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path(), "/translate");

    let query = request.query();
    for expected in [("api-version", "3.0"), ("from", "en"), ("to", "de"), ("textType", "html")] {
        assert!(
            query.iter().any(|(key, value)| key == expected.0 && value == expected.1),
            "missing query parameter {:?} in {:?}",
            expected,
            query
        );
    }

    assert_eq!(request.header("Ocp-Apim-Subscription-Key"), Some("secret"));
    assert_eq!(request.header("Ocp-Apim-Subscription-Region"), Some("westeurope"));
    assert_eq!(request.header("X-ClientTraceId").map(str::len), Some(36));
    assert!(request.header("Content-Type").unwrap_or_default().starts_with("application/json"));
    assert_eq!(request.json(), json!([{ "text": "Hello" }, { "text": "World" }]));
    Ok(())
}

#[tokio::test]
async fn test_azure_withoutLocation_shouldOmitRegionHeader() -> Result<()> {
    let response = json!([{ "translations": [ { "text": "Bonjour", "to": "fr" } ] }]);
    let stub = HttpStub::start(vec![(200, response.to_string())]).await;
    let provider = AzureTranslator::new("secret", "", stub.base_url.clone(), TIMEOUT);

    let translation = provider.translate_one("Hello", "en", "fr").await?;

    assert_eq!(translation, "Bonjour");
    assert_eq!(stub.requests()[0].header("Ocp-Apim-Subscription-Region"), None);
    Ok(())
}

#[tokio::test]
async fn test_azure_withUnauthorizedResponse_shouldReturnAuthenticationError() {
    let body = json!({ "error": { "code": 401000, "message": "Access denied" } });
    let stub = HttpStub::start(vec![(401, body.to_string())]).await;
    let provider = AzureTranslator::new("wrong", "westeurope", stub.base_url.clone(), TIMEOUT);

    let result = provider.translate_one("Hello", "en", "de").await;

    match result {
        Err(ProviderError::AuthenticationError(message)) => assert!(message.contains("Access denied")),
        other => panic!("expected an authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chatgpt_translateBatch_shouldSendNumberedPrompt() -> Result<()> {
    let stub = HttpStub::start(vec![(200, chat_completion("0: Hallo\n1: Welt"))]).await;
    let provider = ChatGptTranslator::new(OpenAI::new("sk-test", stub.base_url.clone(), TIMEOUT), "gpt-3.5-turbo-1106", 0.3);

    let translations = provider.translate_batch(&texts(&["Hello", "World"]), "en", "de").await?;

    assert_eq!(translations, vec![Some("Hallo".to_string()), Some("Welt".to_string())]);

    let request = &stub.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path(), "/chat/completions");
    assert_eq!(request.header("Authorization"), Some("Bearer sk-test"));

    let body = request.json();
    assert_eq!(body["model"], "gpt-3.5-turbo-1106");
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
    assert!(prompt.contains("from English into German"));
    assert!(prompt.contains("0: Hello\n1: World"));
    Ok(())
}

#[tokio::test]
async fn test_chatgpt_withMalformedLine_shouldOnlyLoseThatIndex() -> Result<()> {
    let stub = HttpStub::start(vec![(200, chat_completion("0: Eins\nZwei\n2: Drei"))]).await;
    let provider = ChatGptTranslator::new(OpenAI::new("sk-test", stub.base_url.clone(), TIMEOUT), "gpt-4o-mini", 0.3);

    let translations = provider
        .translate_batch(&texts(&["One", "Two", "Three"]), "en", "de")
        .await?;

    assert_eq!(translations, vec![Some("Eins".to_string()), None, Some("Drei".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_chatgpt_translateOne_withRefusal_shouldReturnRefused() {
    let answer = "The provided text does not seem to be in English.";
    let stub = HttpStub::start(vec![(200, chat_completion(answer))]).await;
    let provider = ChatGptTranslator::new(OpenAI::new("sk-test", stub.base_url.clone(), TIMEOUT), "gpt-4o-mini", 0.3);

    let result = provider.translate_one("%s", "en", "de").await;

    assert!(matches!(result, Err(ProviderError::Refused(_))));
}

#[tokio::test]
async fn test_chatgpt_withRateLimit_shouldReturnRetryableError() {
    let body = json!({ "error": { "message": "Rate limit reached", "type": "requests" } });
    let stub = HttpStub::start(vec![(429, body.to_string())]).await;
    let provider = ChatGptTranslator::new(OpenAI::new("sk-test", stub.base_url.clone(), TIMEOUT), "gpt-4o-mini", 0.3);

    let error = provider
        .translate_one("Hello", "en", "de")
        .await
        .expect_err("rate limited request should fail");

    assert!(matches!(error, ProviderError::RateLimitExceeded(_)));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn test_chatgpt_testConnection_shouldSendMinimalRequest() -> Result<()> {
    let stub = HttpStub::start(vec![(200, chat_completion("ok"))]).await;
    let provider = ChatGptTranslator::new(OpenAI::new("sk-test", stub.base_url.clone(), TIMEOUT), "gpt-4o-mini", 0.3);

    provider.test_connection().await?;

    let body = stub.requests()[0].json();
    assert_eq!(body["max_tokens"], 1);
    assert_eq!(body["messages"][0]["role"], "system");
    Ok(())
}

/// The factory honours the endpoint override from the configuration
#[tokio::test]
async fn test_createProvider_withEndpointOverride_shouldUseIt() -> Result<()> {
    let response = json!([{ "translations": [ { "text": "Hola", "to": "es" } ] }]);
    let stub = HttpStub::start(vec![(200, response.to_string())]).await;

    let temp_dir = common::create_temp_dir()?;
    let mut config = common::test_config(&temp_dir.path().join("es.po"), Backend::Azure, "es");
    config.endpoint = format!("{}/", stub.base_url);

    let provider = create_provider(&config);
    assert_eq!(provider.name(), "azure");
    assert_eq!(provider.translate_one("Hello", "en", "es").await?, "Hola");
    assert_eq!(stub.requests()[0].header("Ocp-Apim-Subscription-Key"), Some("test-key"));
    Ok(())
}
