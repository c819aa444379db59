/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::short_batches()` - Answers batches with one slot missing
 *
 * Every call is recorded so tests can assert on what reached the provider.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `[<target>] <text>`
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Batch answers are one element short
    ShortBatches,
}

/// A request that reached the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    /// `translate_one` with this text
    One(String),
    /// `translate_batch` with these texts
    Batch(Vec<String>),
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Recorded calls, shared between clones
    calls: Arc<Mutex<Vec<MockCall>>>,
    /// Requests whose texts match this predicate fail
    fail_when: Option<fn(&[String]) -> bool>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_when: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose batch answers are misaligned
    pub fn short_batches() -> Self {
        Self::new(MockBehavior::ShortBatches)
    }

    /// Fail every request whose texts match `predicate`, on every attempt
    pub fn failing_when(mut self, predicate: fn(&[String]) -> bool) -> Self {
        self.fail_when = Some(predicate);
        self
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of translate calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }

    /// Sizes of the batches received, in arrival order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Batch(texts) => Some(texts.len()),
                MockCall::One(_) => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn check_failure(&self, texts: &[String]) -> Result<(), ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_when.is_some_and(|predicate| predicate(texts)) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure for matching request".to_string(),
            });
        }

        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),
            MockBehavior::Intermittent { fail_every } if count % fail_every == fail_every - 1 => {
                Err(ProviderError::ApiError {
                    status_code: 503,
                    message: format!("Simulated intermittent failure (request #{})", count + 1),
                })
            }
            _ => Ok(()),
        }
    }

    fn translate(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate_one(
        &self,
        text: &str,
        _source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.record(MockCall::One(text.to_string()));
        self.check_failure(&[text.to_string()])?;
        Ok(Self::translate(text, target_language))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source_language: &str,
        target_language: &str,
    ) -> Result<Vec<Option<String>>, ProviderError> {
        self.record(MockCall::Batch(texts.to_vec()));
        self.check_failure(texts)?;

        let mut translations: Vec<Option<String>> = texts
            .iter()
            .map(|text| Some(Self::translate(text, target_language)))
            .collect();

        if self.behavior == MockBehavior::ShortBatches {
            translations.pop();
        }

        Ok(translations)
    }
}
