use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Translator API version sent with every request
const API_VERSION: &str = "3.0";

/// Azure Translator client
///
/// The service answers a JSON array aligned with the request array, so batch
/// alignment comes for free.
#[derive(Debug)]
pub struct AzureTranslator {
    /// HTTP client for API requests
    client: Client,
    /// Subscription key
    api_key: String,
    /// Resource region; empty for global resources
    location: String,
    /// API base URL
    endpoint: String,
}

/// One element of the request body
#[derive(Debug, Serialize)]
pub struct AzureTextItem<'a> {
    /// Text to translate
    pub text: &'a str,
}

/// One element of the response body
#[derive(Debug, Deserialize)]
pub struct AzureTranslationResult {
    /// Translations, one per requested target language
    #[serde(default)]
    pub translations: Vec<AzureTranslation>,
}

/// A translation into one target language
#[derive(Debug, Deserialize)]
pub struct AzureTranslation {
    /// Translated text
    pub text: String,
    /// Target language code
    #[serde(default)]
    pub to: String,
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    error: AzureErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AzureErrorDetail {
    #[serde(default)]
    code: serde_json::Value,
    #[serde(default)]
    message: String,
}

impl AzureTranslator {
    /// Create a new Azure Translator client
    pub fn new(
        api_key: impl Into<String>,
        location: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            location: location.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Translate texts in one request
    pub async fn translate_texts(
        &self,
        texts: &[&str],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<AzureTranslationResult>, ProviderError> {
        let api_url = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        let body: Vec<AzureTextItem> = texts.iter().map(|&text| AzureTextItem { text }).collect();
        let trace_id = Uuid::new_v4().to_string();

        debug!("Sending {} texts to Azure Translator (trace id {})", texts.len(), trace_id);

        let mut request = self
            .client
            .post(&api_url)
            .query(&[
                ("api-version", API_VERSION),
                ("from", source_language),
                ("to", target_language),
                ("textType", "html"),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("X-ClientTraceId", trace_id)
            .json(&body);

        if !self.location.is_empty() {
            request = request.header("Ocp-Apim-Subscription-Region", &self.location);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            let message = serde_json::from_str::<AzureErrorBody>(&error_text)
                .map(|body| format!("{} ({})", body.error.message, body.error.code))
                .unwrap_or(error_text);
            error!("Azure Translator error ({}): {}", status, message);
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        response
            .json::<Vec<AzureTranslationResult>>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Azure Translator response: {}", e)))
    }

    /// First translation of a result element
    fn first_translation(result: AzureTranslationResult) -> Option<String> {
        result
            .translations
            .into_iter()
            .next()
            .map(|translation| translation.text)
            .filter(|text| !text.is_empty())
    }
}

#[async_trait]
impl Provider for AzureTranslator {
    fn name(&self) -> &str {
        "azure"
    }

    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let results = self.translate_texts(&[text], source_language, target_language).await?;

        results
            .into_iter()
            .next()
            .and_then(Self::first_translation)
            .ok_or_else(|| ProviderError::ParseError("Azure Translator returned no translation".to_string()))
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

        let borrowed: Vec<&str> = texts.iter().map(String::as_str).collect();
        let results = self.translate_texts(&borrowed, source_language, target_language).await?;

        Ok(results.into_iter().map(Self::first_translation).collect())
    }
}
