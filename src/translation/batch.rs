/*!
 * Batch translation processing.
 *
 * This module partitions the strings of a translation request into batches
 * that respect the provider's item and character limits, sends one provider
 * call per batch, and reassembles a result that lines up 1:1 with the
 * request. A failed batch degrades to failure markers for its own items and
 * never takes the rest of the run down with it.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, warn};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::errors::ProviderError;
use crate::providers::Provider;

use super::retry::RetryPolicy;

/// Provider limits a single batch must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// Maximum number of strings per batch
    pub max_items: usize,
    /// Maximum sum of string lengths (in characters) per batch
    pub max_chars: usize,
}

impl BatchLimits {
    /// Create limits; both are at least 1
    pub fn new(max_items: usize, max_chars: usize) -> Self {
        Self {
            max_items: max_items.max(1),
            max_chars: max_chars.max(1),
        }
    }
}

/// Length of a string as counted against `max_chars`
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `texts` into contiguous, order-preserving batches
///
/// Greedy single pass: the current batch is closed as soon as the next
/// string would push it over either limit. A string that is longer than
/// `max_chars` on its own still gets a batch of its own; whether the provider
/// accepts it is the provider's call.
pub fn partition<S: AsRef<str>>(texts: &[S], limits: BatchLimits) -> Vec<Range<usize>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (index, text) in texts.iter().enumerate() {
        let len = text_len(text.as_ref());
        let items = index - start;

        if items > 0 && (items + 1 > limits.max_items || chars + len > limits.max_chars) {
            batches.push(start..index);
            start = index;
            chars = 0;
        }

        if len > limits.max_chars {
            warn!(
                "Text {} is {} characters long, above the batch budget of {}; sending it alone",
                index + 1,
                len,
                limits.max_chars
            );
        }

        chars += len;
    }

    if start < texts.len() {
        batches.push(start..texts.len());
    }

    batches
}

/// One slot of a translation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPair {
    /// The source string exactly as it was requested
    pub source: String,
    /// The translation, or `None` when the provider gave nothing usable
    pub translated: Option<String>,
}

impl TranslationPair {
    /// Create a pair
    pub fn new(source: impl Into<String>, translated: Option<String>) -> Self {
        Self {
            source: source.into(),
            translated,
        }
    }

    /// Whether this slot carries a translation
    pub fn is_translated(&self) -> bool {
        self.translated.is_some()
    }
}

/// Batch translator for processing catalog strings in batches
pub struct BatchTranslator<'a> {
    /// The provider used for every batch
    provider: &'a dyn Provider,

    /// Batch limits of that provider
    limits: BatchLimits,

    /// Retry policy applied per batch
    retry: RetryPolicy,

    /// Maximum number of batches in flight
    max_concurrent_requests: usize,
}

impl<'a> BatchTranslator<'a> {
    /// Create a new batch translator that sends one batch at a time
    pub fn new(provider: &'a dyn Provider, limits: BatchLimits, retry: RetryPolicy) -> Self {
        Self {
            provider,
            limits,
            retry,
            max_concurrent_requests: 1,
        }
    }

    /// Allow up to `max_concurrent_requests` batches in flight
    pub fn with_concurrency(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests.max(1);
        self
    }

    /// Translate all texts; the result has one pair per input, in input order
    pub async fn translate_all(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
        progress_callback: impl Fn(usize, usize),
    ) -> Vec<TranslationPair> {
        let batches = partition(texts, self.limits);
        let total_batches = batches.len();
        let processed_batches = AtomicUsize::new(0);

        let processed_batches = &processed_batches;
        let progress_callback = &progress_callback;

        let results = stream::iter(batches.iter().cloned().enumerate())
            .map(|(batch_index, range)| async move {
                let batch = &texts[range.clone()];
                let label = format!(
                    "batch {}/{} (texts {}-{})",
                    batch_index + 1,
                    total_batches,
                    range.start + 1,
                    range.end
                );

                debug!("Translating {}", label);
                let start_time = Instant::now();

                let outcome = self
                    .retry
                    .run(&label, || self.translate_checked(batch, source_language, target_language))
                    .await;

                let translations = match outcome {
                    Ok(translations) => {
                        debug!("{} completed in {:?}", label, start_time.elapsed());
                        translations
                    }
                    Err(e) => {
                        error!("Maximum retries reached for {}. Skipping this batch: {}", label, e);
                        vec![None; batch.len()]
                    }
                };

                let current = processed_batches.fetch_add(1, Ordering::SeqCst) + 1;
                progress_callback(current, total_batches);

                (batch_index, translations)
            })
            .buffer_unordered(self.max_concurrent_requests)
            .collect::<Vec<_>>()
            .await;

        // Sort results by batch index to restore the original order
        let mut sorted_results = results;
        sorted_results.sort_by_key(|(batch_index, _)| *batch_index);

        let mut pairs = Vec::with_capacity(texts.len());
        for ((_, translations), range) in sorted_results.into_iter().zip(&batches) {
            for (source, translated) in texts[range.clone()].iter().zip(translations) {
                pairs.push(TranslationPair::new(source.clone(), translated));
            }
        }

        pairs
    }

    /// One provider call with the alignment contract enforced
    async fn translate_checked(
        &self,
        batch: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Option<String>>, ProviderError> {
        let translations = self
            .provider
            .translate_batch(batch, source_language, target_language)
            .await?;

        if translations.len() != batch.len() {
            return Err(ProviderError::ParseError(format!(
                "{} returned {} translations for a batch of {}",
                self.provider.name(),
                translations.len(),
                batch.len()
            )));
        }

        Ok(translations
            .into_iter()
            .map(|t| t.filter(|text| !text.trim().is_empty()))
            .collect())
    }
}
