//! HTTP client and configuration.

mod openai_client;
mod openai_config;

#[cfg(test)]
pub(crate) use openai_client::response_schema;
pub use openai_client::{OpenAiClient, StructuredResponse};
pub use openai_config::OpenAiConfig;
