/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - Azure: Microsoft Azure Translator (HTTP translation service)
 * - ChatGPT: OpenAI chat completions, built on the `openai` client
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::app_config::{Backend, Config};
use crate::errors::ProviderError;

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the batching engine and the
/// controller.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Translate a single string
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translation or an error; the caller
    ///   decides whether to retry
    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Translate a batch of strings
    ///
    /// # Returns
    /// * `Result<Vec<Option<String>>, ProviderError>` - One slot per input string,
    ///   in input order; `None` marks an item without a usable translation
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Option<String>>, ProviderError>;

    /// Test the connection to the provider before the run starts
    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Build the provider selected by the configuration
pub fn create_provider(config: &Config) -> Box<dyn Provider> {
    match config.backend {
        Backend::Azure => Box::new(azure::AzureTranslator::new(
            config.api_key.clone(),
            config.location.clone(),
            config.get_endpoint(),
            config.timeout(),
        )),
        Backend::ChatGpt => Box::new(chatgpt::ChatGptTranslator::new(
            openai::OpenAI::new(config.api_key.clone(), config.get_endpoint(), config.timeout()),
            config.model.clone(),
            config.temperature,
        )),
    }
}

pub mod azure;
pub mod chatgpt;
pub mod mock;
pub mod openai;
