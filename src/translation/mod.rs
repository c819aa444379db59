/*!
 * Translation engine for gettext catalogs.
 *
 * This module contains everything between the catalog and the provider
 * clients. It is split into several submodules:
 *
 * - `batch`: Partitioning of strings into batches and batch execution
 * - `numbered`: Numbered-line prompt protocol used by chat completion backends
 * - `retry`: Retry policy applied to every provider call
 */

// Re-export main types for easier usage
pub use self::batch::{BatchLimits, BatchTranslator, TranslationPair};
pub use self::retry::RetryPolicy;

// Submodules
pub mod batch;
pub mod numbered;
pub mod retry;
