use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::catalog::Catalog;
use crate::errors::AppError;
use crate::language_utils::{self, LanguageCheck};
use crate::providers::Provider;
use crate::translation::{BatchTranslator, TranslationPair};

// @module: Application controller for catalog translation

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The catalog declares another language; nothing was touched
    LanguageMismatch { declared: String },
    /// No entry needed a translation
    NothingToTranslate { fuzzy_cleared: usize },
    /// Translations were requested and applied
    Completed(RunSummary),
}

// @struct: Counters of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    // @field: Unique source strings sent to the provider
    pub requested: usize,

    // @field: Source strings that came back translated
    pub translated: usize,

    // @field: Source strings without a usable translation
    pub failed: usize,

    // @field: Catalog entries updated (duplicates count separately)
    pub applied: usize,

    // @field: Entries whose fuzzy flag was removed
    pub fuzzy_cleared: usize,

    // @field: Time spent waiting for the provider
    pub duration: Duration,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} requested, {} translated, {} failed, {} entries updated in {}",
            self.requested,
            self.translated,
            self.failed,
            self.applied,
            Controller::format_duration(self.duration)
        )
    }
}

/// Main application controller for catalog translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole workflow on the configured catalog
    ///
    /// Load, check the declared language, optionally clear fuzzy flags, collect
    /// untranslated entries, translate them, apply the results and save.
    /// Provider failures never abort the run; they only leave entries
    /// untranslated. Catalog I/O failures do.
    pub async fn run(&self, provider: &dyn Provider) -> Result<RunOutcome, AppError> {
        let path = &self.config.file;
        let mut catalog = Catalog::load(path)?;
        info!("Loaded {}: {}", path.display(), catalog.stats());

        match language_utils::check_declared_language(&catalog.declared_language(), &self.config.target_language) {
            LanguageCheck::Mismatch { declared } => {
                warn!(
                    "Skipping {}: catalog language '{}' does not match destination language '{}'",
                    path.display(),
                    declared,
                    self.config.target_language
                );
                return Ok(RunOutcome::LanguageMismatch { declared });
            }
            LanguageCheck::Unknown => {
                warn!(
                    "{} does not declare a language; assuming '{}'",
                    path.display(),
                    self.config.target_language
                );
            }
            LanguageCheck::Match => {
                debug!("Catalog language matches '{}'", self.config.target_language);
            }
        }

        let fuzzy_cleared = if self.config.fuzzy {
            let cleared = catalog.strip_review_flag();
            info!("Cleared fuzzy flag on {} entries", cleared);
            cleared
        } else {
            0
        };

        let sources = catalog.eligible_entries();
        if sources.is_empty() {
            info!("Nothing to translate in {}", path.display());
            if fuzzy_cleared > 0 {
                catalog.save()?;
            }
            return Ok(RunOutcome::NothingToTranslate { fuzzy_cleared });
        }

        info!(
            "Translating {} strings from {} to {} with {}{}",
            sources.len(),
            self.config.source_language,
            self.config.target_language,
            self.config.backend.display_name(),
            if self.config.bulk { " (bulk mode)" } else { "" }
        );

        let start_time = Instant::now();
        let pairs = if self.config.bulk {
            self.translate_bulk(provider, &sources).await
        } else {
            self.translate_one_by_one(provider, &sources).await
        };

        let mut summary = RunSummary {
            requested: sources.len(),
            fuzzy_cleared,
            duration: start_time.elapsed(),
            ..RunSummary::default()
        };

        for pair in &pairs {
            match &pair.translated {
                Some(translated) => {
                    summary.translated += 1;
                    summary.applied += catalog.apply(&pair.source, translated);
                }
                None => {
                    summary.failed += 1;
                    debug!("No translation for '{}'", pair.source);
                }
            }
        }

        if summary.failed > 0 {
            warn!("{} strings were left untranslated", summary.failed);
        }

        if summary.applied > 0 || fuzzy_cleared > 0 {
            catalog.save()?;
            info!("Saved {}: {}", path.display(), catalog.stats());
        }

        info!("Translation completed: {}", summary);
        Ok(RunOutcome::Completed(summary))
    }

    /// Bulk mode: one provider call per batch
    async fn translate_bulk(&self, provider: &dyn Provider, sources: &[String]) -> Vec<TranslationPair> {
        let limits = self.config.batch_limits();
        debug!(
            "Batch limits: {} items, {} characters",
            limits.max_items, limits.max_chars
        );

        let batch_translator = BatchTranslator::new(provider, limits, self.config.retry_policy())
            .with_concurrency(self.config.concurrent_requests);

        let progress_bar = Self::progress_bar(0, "batches");
        let pb = progress_bar.clone();

        let pairs = batch_translator
            .translate_all(
                sources,
                &self.config.source_language,
                &self.config.target_language,
                move |completed, total| {
                    pb.set_length(total as u64);
                    pb.set_position(completed as u64);
                },
            )
            .await;

        progress_bar.finish_and_clear();
        pairs
    }

    /// One-by-one mode: one provider call per string
    async fn translate_one_by_one(&self, provider: &dyn Provider, sources: &[String]) -> Vec<TranslationPair> {
        let retry = self.config.retry_policy();
        let total = sources.len();
        let progress_bar = Self::progress_bar(total as u64, "strings");

        let source_language = self.config.source_language.as_str();
        let target_language = self.config.target_language.as_str();
        let progress = &progress_bar;

        let pairs = stream::iter(sources.iter().enumerate())
            .map(|(index, source)| async move {
                let label = format!("string {}/{}", index + 1, total);
                let translated = match retry
                    .run(&label, || provider.translate_one(source, source_language, target_language))
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => Some(text),
                    Ok(_) => {
                        warn!("Empty translation for {} ('{}')", label, source);
                        None
                    }
                    Err(e) => {
                        error!("Failed to translate {} ('{}'): {}", label, source, e);
                        None
                    }
                };
                progress.inc(1);
                TranslationPair::new(source.clone(), translated)
            })
            .buffered(self.config.concurrent_requests.max(1))
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_and_clear();
        pairs
    }

    fn progress_bar(length: u64, unit: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(length);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    // @returns: Human readable duration
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
