use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::errors::ConfigError;
use crate::language_utils;
use crate::translation::batch::BatchLimits;
use crate::translation::retry::RetryPolicy;

/// Application configuration module
/// This module handles the run configuration: loading it from an optional
/// JSON file, validating it, and deriving the batching and retry settings
/// the translation components consume.

/// Most items the chat backend is asked to translate in one completion
pub const CHATGPT_MAX_BATCH_ITEMS: usize = 50;

/// Character budget for one chat completion batch
pub const CHATGPT_MAX_BATCH_CHARS: usize = 8000;

/// Azure Translator accepts at most this many array elements per request
pub const AZURE_MAX_BATCH_ITEMS: usize = 1000;

/// Azure Translator request character budget, kept below the 50 000 hard limit
pub const AZURE_MAX_BATCH_CHARS: usize = 49_500;

/// Represents the run configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation backend to use
    #[serde(default)]
    pub backend: Backend,

    /// API key (subscription key for Azure, bearer token for ChatGPT)
    #[serde(default)]
    pub api_key: String,

    /// Chat completion model
    #[serde(default = "default_chatgpt_model")]
    pub model: String,

    /// Azure resource region
    #[serde(default)]
    pub location: String,

    /// Base URL override; empty means the backend's public endpoint
    #[serde(default)]
    pub endpoint: String,

    /// Catalog to translate in place
    #[serde(default)]
    pub file: PathBuf,

    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default)]
    pub target_language: String,

    /// Clear fuzzy flags before translating
    #[serde(default)]
    pub fuzzy: bool,

    /// Translate in batches instead of one request per string
    #[serde(default)]
    pub bulk: bool,

    /// Requested batch size; items for ChatGPT, characters for Azure
    #[serde(default)]
    pub bulk_size: Option<usize>,

    /// Maximum number of batches in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Attempts per unit of work (one string or one batch)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Fixed delay between attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature for chat completions
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    // @backend: Microsoft Azure Translator
    #[default]
    Azure,
    // @backend: OpenAI chat completions
    ChatGpt,
}

impl Backend {
    // @returns: Human readable backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Azure => "Azure Translator",
            Self::ChatGpt => "ChatGPT",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Azure => "azure".to_string(),
            Self::ChatGpt => "chatgpt".to_string(),
        }
    }

    // @returns: Public endpoint used when no override is configured
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Azure => "https://api.cognitive.microsofttranslator.com",
            Self::ChatGpt => "https://api.openai.com/v1",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "chatgpt" => Ok(Self::ChatGpt),
            _ => Err(ConfigError::Invalid {
                field: "backend",
                message: format!("unknown backend '{}'", s),
            }),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_chatgpt_model() -> String {
    "gpt-3.5-turbo-1106".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // fixed, not doubled between attempts
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.3
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            backend: Backend::default(),
            api_key: String::new(),
            model: default_chatgpt_model(),
            location: String::new(),
            endpoint: String::new(),
            file: PathBuf::new(),
            source_language: default_source_language(),
            target_language: String::new(),
            fuzzy: false,
            bulk: false,
            bulk_size: None,
            concurrent_requests: default_concurrent_requests(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file.as_os_str().is_empty() {
            return Err(ConfigError::Missing("file"));
        }

        if !language_utils::is_valid_language_code(language_utils::primary_subtag(&self.source_language)) {
            return Err(ConfigError::Invalid {
                field: "srclang",
                message: format!("'{}' is not an ISO 639 language code", self.source_language),
            });
        }

        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Missing("dstlang"));
        }
        if !language_utils::is_valid_language_code(language_utils::primary_subtag(&self.target_language)) {
            return Err(ConfigError::Invalid {
                field: "dstlang",
                message: format!("'{}' is not an ISO 639 language code", self.target_language),
            });
        }

        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("apikey"));
        }

        if self.backend == Backend::ChatGpt && self.model.trim().is_empty() {
            return Err(ConfigError::Missing("model"));
        }

        if !self.endpoint.is_empty() {
            Url::parse(&self.endpoint).map_err(|e| ConfigError::Invalid {
                field: "endpoint",
                message: e.to_string(),
            })?;
        }

        if self.bulk_size == Some(0) {
            return Err(ConfigError::Invalid {
                field: "bulksize",
                message: "must be at least 1".to_string(),
            });
        }

        if self.concurrent_requests == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                message: "must be at least 1".to_string(),
            });
        }

        if self.retry_count == 0 {
            return Err(ConfigError::Invalid {
                field: "retries",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Endpoint for the selected backend
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            self.backend.default_endpoint().to_string()
        } else {
            self.endpoint.trim_end_matches('/').to_string()
        }
    }

    /// Batch limits for the selected backend, with the requested size capped
    /// at the backend maximum
    pub fn batch_limits(&self) -> BatchLimits {
        match self.backend {
            Backend::ChatGpt => BatchLimits::new(
                self.bulk_size
                    .unwrap_or(CHATGPT_MAX_BATCH_ITEMS)
                    .clamp(1, CHATGPT_MAX_BATCH_ITEMS),
                CHATGPT_MAX_BATCH_CHARS,
            ),
            Backend::Azure => BatchLimits::new(
                AZURE_MAX_BATCH_ITEMS,
                self.bulk_size
                    .unwrap_or(AZURE_MAX_BATCH_CHARS)
                    .clamp(1, AZURE_MAX_BATCH_CHARS),
            ),
        }
    }

    /// Whether the requested bulk size exceeds what the backend allows
    pub fn bulk_size_capped(&self) -> bool {
        let maximum = match self.backend {
            Backend::ChatGpt => CHATGPT_MAX_BATCH_ITEMS,
            Backend::Azure => AZURE_MAX_BATCH_CHARS,
        };
        self.bulk_size.is_some_and(|size| size > maximum)
    }

    /// Retry policy applied to every provider call
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_backoff_ms))
    }

    /// HTTP timeout for provider clients
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
