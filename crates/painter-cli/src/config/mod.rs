//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── credentials: CredentialConfig  # OpenAI and Tinify API keys
//! ├── provider: ProviderConfig        # fixture replay, batch concurrency
//! ├── pricing: PricingConfig          # per-token unit prices
//! ├── openai: OpenAiConfig            # chat completions endpoint and model
//! ├── tinify: TinifyConfig            # compression endpoint
//! ├── telemetry: TelemetryConfig      # log filter
//! └── command: Command                # shell (default) or run
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod credentials;
mod pricing;
mod provider;
mod telemetry;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
pub use credentials::CredentialConfig;
use painter_openai::OpenAiConfig;
use painter_tinify::TinifyConfig;
pub use pricing::PricingConfig;
pub use provider::{ProviderConfig, ServiceProviders};
pub use telemetry::TelemetryConfig;

use crate::shell::{Action, DEFAULT_REPORT_TITLE};
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "painter")]
#[command(about = "Reads painting metadata from images and exports PDF reports")]
#[command(version)]
pub struct Cli {
    /// API keys.
    #[clap(flatten)]
    pub credentials: CredentialConfig,

    /// Provider selection and batch behaviour.
    #[clap(flatten)]
    pub provider: ProviderConfig,

    /// Unit prices used for the cost estimate.
    #[clap(flatten)]
    pub pricing: PricingConfig,

    /// Extraction and recommendation endpoint.
    #[clap(flatten)]
    pub openai: OpenAiConfig,

    /// Compression endpoint.
    #[clap(flatten)]
    pub tinify: TinifyConfig,

    /// Logging.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// What to do; defaults to the interactive shell.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Debug, Clone, Default, Subcommand)]
pub enum Command {
    /// Start the interactive shell.
    #[default]
    Shell,
    /// Extract every image once, print the results and exit.
    Run(RunArgs),
}

/// Arguments of the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Image files to read.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Also ask for a similar painting for every image.
    #[arg(long)]
    pub recommend: bool,

    /// Write a PDF report to this path.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compress images before embedding them in the report.
    #[arg(long, requires = "output")]
    pub compress: bool,

    /// Report title.
    #[arg(long, default_value = DEFAULT_REPORT_TITLE)]
    pub title: String,
}

impl RunArgs {
    /// Returns the shell actions this run performs, in order.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = vec![
            Action::Upload(self.files.clone()),
            Action::Extract(Vec::new()),
        ];

        if self.recommend {
            actions.push(Action::Recommend(Vec::new()));
        }

        actions.push(Action::Show(None));
        actions.push(Action::Cost);

        if let Some(output) = &self.output {
            actions.push(Action::Report {
                path: output.clone(),
                compress: self.compress,
                title: Some(self.title.clone()),
            });
        }

        actions
    }
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded first so that clap's `env` lookups see its
    /// values.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.openai
            .validate()
            .context("invalid OpenAI configuration")?;
        self.tinify
            .validate()
            .context("invalid Tinify configuration")?;
        self.provider
            .validate()
            .context("invalid provider configuration")?;
        self.telemetry
            .validate()
            .context("invalid telemetry configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openai_base_url = %self.openai.openai_base_url,
            openai_model = %self.openai.openai_model,
            tinify_base_url = %self.tinify.tinify_base_url,
            image_price = %self.pricing.image_price,
            text_price = %self.pricing.text_price,
            concurrency = self.provider.concurrency,
            fixture = ?self.provider.fixture,
            openai_key = self.credentials.has_openai_key(),
            tinify_key = self.credentials.tinify_api_key.is_some(),
            "Configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
