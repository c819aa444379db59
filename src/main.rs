// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use gettext_cloud_translator::app_config::{self, Backend, Config};
use gettext_cloud_translator::app_controller::{Controller, RunOutcome};
use gettext_cloud_translator::errors::{self, AppError, ConfigError};
use gettext_cloud_translator::providers::create_provider;

/// CLI Wrapper for Backend to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliBackend {
    Azure,
    #[value(name = "chatgpt")]
    ChatGpt,
}

impl From<CliBackend> for Backend {
    fn from(cli_backend: CliBackend) -> Self {
        match cli_backend {
            CliBackend::Azure => Backend::Azure,
            CliBackend::ChatGpt => Backend::ChatGpt,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// gettext-cloud-translator - fill in gettext catalogs with cloud translations
///
/// Reads a .po catalog, sends every untranslated string to Azure Translator or
/// ChatGPT, and writes the translations back into the same file.
#[derive(Parser, Debug)]
#[command(name = "gettext-cloud-translator")]
#[command(version)]
#[command(about = "Translate gettext .po catalogs using cloud translation services")]
#[command(long_about = "Translates the untranslated entries of a gettext .po catalog in place.

EXAMPLES:
    gettext-cloud-translator --backend azure --location westeurope --file de.po --dstlang de
    gettext-cloud-translator --backend chatgpt --bulk --bulksize 20 --file fr.po --dstlang fr
    gettext-cloud-translator --backend chatgpt --fuzzy --file es.po --dstlang es
    gettext-cloud-translator completions bash > gettext-cloud-translator.bash

CONFIGURATION:
    Settings can also come from a JSON file passed with --config; command line
    values override it. The API key falls back to the API_KEY environment
    variable, which may be set in a .env file.

BULK SIZE:
    chatgpt - maximum strings per request (at most 50)
    azure   - maximum characters per request (at most 49500)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Translation backend to use
    #[arg(long, value_enum)]
    backend: Option<CliBackend>,

    /// API key (Azure subscription key or OpenAI key)
    #[arg(long = "apikey", env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat completion model (chatgpt backend)
    #[arg(long)]
    model: Option<String>,

    /// Azure resource region (azure backend)
    #[arg(long)]
    location: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// The .po catalog to translate in place
    #[arg(long)]
    file: Option<PathBuf>,

    /// Source language code (e.g., 'en')
    #[arg(long = "srclang")]
    source_language: Option<String>,

    /// Destination language code (e.g., 'de', 'pt')
    #[arg(long = "dstlang")]
    target_language: Option<String>,

    /// Remove fuzzy flags and translate the entries they marked
    #[arg(long)]
    fuzzy: bool,

    /// Translate many strings per request
    #[arg(long)]
    bulk: bool,

    /// Batch size in bulk mode (strings for chatgpt, characters for azure)
    #[arg(long = "bulksize")]
    bulk_size: Option<usize>,

    /// Maximum number of requests in flight
    #[arg(long = "concurrency")]
    concurrent_requests: Option<usize>,

    /// Attempts per request before giving up
    #[arg(long = "retries")]
    retry_count: Option<u32>,

    /// Delay between attempts in milliseconds
    #[arg(long = "retry-delay-ms")]
    retry_backoff_ms: Option<u64>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON configuration file
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The max level is the only filter; the logger itself lets everything through
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Build the run configuration: config file first, command line on top
fn build_config(options: &CommandLineOptions) -> Result<Config, AppError> {
    let mut config = match &options.config_path {
        Some(path) => Config::from_file(path)?,
        None if options.backend.is_none() => return Err(ConfigError::Missing("backend").into()),
        None => Config::default(),
    };

    if let Some(backend) = options.backend {
        config.backend = backend.into();
    }
    if let Some(api_key) = &options.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(model) = &options.model {
        config.model = model.clone();
    }
    if let Some(location) = &options.location {
        config.location = location.clone();
    }
    if let Some(endpoint) = &options.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(file) = &options.file {
        config.file = file.clone();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.target_language = target_language.clone();
    }
    if options.fuzzy {
        config.fuzzy = true;
    }
    if options.bulk {
        config.bulk = true;
    }
    if let Some(bulk_size) = options.bulk_size {
        config.bulk_size = Some(bulk_size);
    }
    if let Some(concurrent_requests) = options.concurrent_requests {
        config.concurrent_requests = concurrent_requests;
    }
    if let Some(retry_count) = options.retry_count {
        config.retry_count = retry_count;
    }
    if let Some(retry_backoff_ms) = options.retry_backoff_ms {
        config.retry_backoff_ms = retry_backoff_ms;
    }
    if let Some(timeout_secs) = options.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }

    config.validate()?;
    Ok(config)
}

async fn run_translate(options: CommandLineOptions) -> Result<()> {
    // Apply the command line log level right away so config errors respect it
    if let Some(log_level) = options.log_level {
        let level: app_config::LogLevel = log_level.into();
        log::set_max_level(level.into());
    }

    let config = build_config(&options)?;
    log::set_max_level(config.log_level.into());

    if config.bulk && config.bulk_size_capped() {
        let limits = config.batch_limits();
        warn!(
            "Bulk size {} is above what {} accepts; using {}",
            config.bulk_size.unwrap_or_default(),
            config.backend.display_name(),
            match config.backend {
                Backend::ChatGpt => limits.max_items,
                Backend::Azure => limits.max_chars,
            }
        );
    }

    let provider = create_provider(&config);
    info!("Checking connection to {}", config.backend.display_name());
    provider
        .test_connection()
        .await
        .map_err(AppError::from)
        .with_context(|| format!("Could not reach {}", config.backend.display_name()))?;

    let controller = Controller::with_config(config);
    match controller.run(provider.as_ref()).await? {
        RunOutcome::LanguageMismatch { declared } => {
            info!("Catalog language '{}' left untouched", declared);
        }
        RunOutcome::NothingToTranslate { .. } => {}
        RunOutcome::Completed(summary) if summary.failed > 0 => {
            warn!("{} strings could not be translated; run again to retry them", summary.failed);
        }
        RunOutcome::Completed(_) => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "gettext-cloud-translator", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run_translate(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(errors::exit_code_for(&e))
        }
    }
}
