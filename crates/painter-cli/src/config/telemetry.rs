//! Logging configuration.

use anyhow::Context;
use clap::Args;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log output settings.
#[derive(Debug, Clone, Args)]
pub struct TelemetryConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info,painter_openai=debug`)
    #[arg(long, env = "PAINTER_LOG", default_value = "info")]
    pub log_filter: String,
}

impl TelemetryConfig {
    /// Validates the filter directives.
    pub fn validate(&self) -> anyhow::Result<()> {
        EnvFilter::try_new(&self.log_filter)
            .with_context(|| format!("invalid log filter '{}'", self.log_filter))?;
        Ok(())
    }

    /// Returns the active filter: `RUST_LOG` if set, else the configured one.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_filter))
    }

    /// Installs the global subscriber.
    ///
    /// Logs go to stderr so they do not interleave with shell output.
    pub fn init_tracing(&self) {
        tracing_subscriber::registry()
            .with(self.env_filter())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
