/*!
 * ChatGPT translation backend.
 *
 * Single strings are sent as a plain instruction. Batches use the numbered
 * line protocol from `translation::numbered`, so a batch answer is parsed
 * line by line and every unusable line only costs its own slot.
 */

use async_trait::async_trait;
use log::{debug, trace};

use crate::errors::ProviderError;
use crate::language_utils::language_name;
use crate::providers::Provider;
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::translation::numbered;

/// Chat completion backend
#[derive(Debug)]
pub struct ChatGptTranslator {
    /// HTTP client for the chat completions API
    client: OpenAI,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

impl ChatGptTranslator {
    /// Create a new ChatGPT backend
    pub fn new(client: OpenAI, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    /// Send one prompt and return the trimmed answer
    async fn ask(&self, prompt: String) -> Result<String, ProviderError> {
        trace!("Translation request: {}", prompt);

        let request = OpenAIRequest::new(&self.model)
            .add_message("user", prompt)
            .temperature(self.temperature);

        let response = self.client.complete(request).await?;
        let raw = OpenAI::extract_text_from_response(&response)
            .ok_or_else(|| ProviderError::ParseError("OpenAI returned no choices".to_string()))?;

        debug!("Raw API response: {}", raw);
        Ok(raw)
    }
}

#[async_trait]
impl Provider for ChatGptTranslator {
    fn name(&self) -> &str {
        "chatgpt"
    }

    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let prompt = numbered::build_single_prompt(
            text,
            &language_name(source_language),
            &language_name(target_language),
        );

        let answer = self.ask(prompt).await?;
        if answer.is_empty() || numbered::is_refusal(&answer) {
            return Err(ProviderError::Refused(answer));
        }

        Ok(answer)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Option<String>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = numbered::build_batch_prompt(
            texts,
            &language_name(source_language),
            &language_name(target_language),
        );

        let answer = self.ask(prompt).await?;
        Ok(numbered::parse_batch_response(&answer, texts))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.client.test_connection(&self.model).await
    }
}
