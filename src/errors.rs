/*!
 * Error types for the gettext-cloud-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider answered, but with a refusal instead of a translation
    #[error("Provider refused to translate: {0}")]
    Refused(String),
}

impl ProviderError {
    /// Whether repeating the same request has any chance of succeeding
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthenticationError(_) | Self::Refused(_))
    }

    /// Map a non-success HTTP status and body to the matching error variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// A chat-completion response line that does not follow the `index: text` format
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LineParseError {
    /// No `:` separator after the index
    #[error("missing ':' separator in line '{0}'")]
    MissingSeparator(String),

    /// The text before the separator is not an integer
    #[error("invalid index in line '{0}'")]
    InvalidIndex(String),

    /// The index does not belong to the batch
    #[error("index {index} is out of range for a batch of {batch_len}")]
    OutOfRange { index: usize, batch_len: usize },
}

/// Errors raised while reading or writing the message catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog could not be read or parsed
    #[error("Failed to load catalog {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// The catalog could not be written back
    #[error("Failed to save catalog {path}: {message}")]
    Save { path: PathBuf, message: String },
}

/// Invalid or missing startup configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required value was not supplied
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// A value was supplied but is not acceptable
    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    /// The configuration file could not be read
    #[error("Failed to read config file {path}: {message}")]
    File { path: PathBuf, message: String },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the catalog store
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error in the startup configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Catalog(_) => 1,
            Self::Config(_) => 2,
            Self::Provider(_) => 3,
        }
    }
}

/// Exit code for an error that reached the binary; anything but an `AppError` exits with 1
pub fn exit_code_for(error: &anyhow::Error) -> u8 {
    error.downcast_ref::<AppError>().map_or(1, AppError::exit_code)
}
