//! API key configuration.

use clap::Args;
use painter_core::Credentials;

/// Name older `.env` files use for the OpenAI key.
const LEGACY_OPENAI_KEY_VAR: &str = "API_KEY";

/// API keys for the external services.
///
/// Keys are optional at startup: without an OpenAI key the shell asks for
/// one, and without a Tinify key `report --compress` is refused.
#[derive(Clone, Args)]
pub struct CredentialConfig {
    /// OpenAI API key used for extraction and recommendation
    ///
    /// Falls back to `API_KEY` when unset.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Tinify API key used to compress report images
    #[arg(long, env = "TINIFY_API_KEY", hide_env_values = true)]
    pub tinify_api_key: Option<String>,
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("tinify_api_key", &self.tinify_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl CredentialConfig {
    /// Returns the OpenAI key, including the legacy variable.
    fn openai_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var(LEGACY_OPENAI_KEY_VAR).ok())
    }

    /// Returns true if an OpenAI key is configured.
    pub fn has_openai_key(&self) -> bool {
        self.openai_key().is_some_and(|key| !key.trim().is_empty())
    }

    /// Converts into session credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.openai_key(), self.tinify_api_key.clone())
    }
}
