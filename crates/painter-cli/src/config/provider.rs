//! Provider configuration and construction.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Args;
use painter_core::{ImageCompressor, MetadataExtractor, PaintingRecommender, Session};
use painter_openai::{
    FixtureExtractor, OpenAiClient, OpenAiConfig, PaintingAdvisor, PaintingExtractor,
};
use painter_tinify::{TinifyClient, TinifyConfig};

use super::Cli;
use crate::TRACING_TARGET_CONFIG;
use crate::shell::ProviderFactory;

/// Provider selection and batch behaviour.
#[derive(Debug, Clone, Args)]
pub struct ProviderConfig {
    /// Replay extraction results from this JSON file instead of calling the API
    #[arg(long, env = "PAINTER_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Maximum number of extraction calls in flight during a batch
    #[arg(long, env = "PAINTER_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,
}

impl ProviderConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(())
    }
}

/// Builds service clients from configuration and the session's keys.
///
/// Clients are built per action because the OpenAI key may be entered at a
/// prompt after startup.
#[derive(Debug)]
pub struct ServiceProviders {
    openai: OpenAiConfig,
    tinify: TinifyConfig,
    fixture: Option<Arc<FixtureExtractor>>,
}

impl ServiceProviders {
    /// Creates providers from the CLI configuration, loading the fixture if
    /// one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be read.
    pub async fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let fixture = match &cli.provider.fixture {
            Some(path) => {
                let fixture = FixtureExtractor::load(path)
                    .await
                    .with_context(|| format!("failed to load fixture {}", path.display()))?;

                tracing::info!(
                    target: TRACING_TARGET_CONFIG,
                    path = %path.display(),
                    entries = fixture.len(),
                    "Extraction results will be replayed from fixture"
                );
                Some(Arc::new(fixture))
            }
            None => None,
        };

        Ok(Self {
            openai: cli.openai.clone(),
            tinify: cli.tinify.clone(),
            fixture,
        })
    }

    /// Returns true if extraction is replayed from a fixture.
    pub fn has_fixture(&self) -> bool {
        self.fixture.is_some()
    }

    fn openai_client(&self, session: &Session) -> painter_core::Result<OpenAiClient> {
        let key = session.require_openai_api_key()?.clone();
        Ok(OpenAiClient::new(self.openai.clone(), key)?)
    }
}

impl ProviderFactory for ServiceProviders {
    fn extractor(&self, session: &Session) -> painter_core::Result<Arc<dyn MetadataExtractor>> {
        if let Some(fixture) = &self.fixture {
            return Ok(fixture.clone());
        }
        Ok(Arc::new(PaintingExtractor::new(self.openai_client(session)?)))
    }

    fn recommender(
        &self,
        session: &Session,
    ) -> painter_core::Result<Arc<dyn PaintingRecommender>> {
        Ok(Arc::new(PaintingAdvisor::new(self.openai_client(session)?)))
    }

    fn compressor(&self, session: &Session) -> painter_core::Result<Arc<dyn ImageCompressor>> {
        let key = session.require_tinify_api_key()?.clone();
        Ok(Arc::new(TinifyClient::new(self.tinify.clone(), key)?))
    }
}
