//! Chat completions client with structured output.

use reqwest::{Client as HttpClient, ClientBuilder};
use schemars::JsonSchema;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::OpenAiConfig;
use crate::completion::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat, Usage, strip_code_fence};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Longest body or content excerpt quoted in an error message.
const EXCERPT_LEN: usize = 200;

/// A parsed structured answer with the usage of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredResponse<T> {
    /// The deserialized answer.
    pub value: T,
    /// Token usage reported for the call.
    pub usage: Usage,
}

impl<T> StructuredResponse<T> {
    /// Returns the total token usage.
    pub fn usage_tokens(&self) -> u32 {
        self.usage.total_tokens
    }
}

/// Client for an OpenAI-compatible chat completions endpoint.
///
/// Every call asks for a strict JSON schema response generated from the
/// target Rust type, so the same client serves extraction and
/// recommendation.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    config: OpenAiConfig,
    api_key: SecretString,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: OpenAiConfig, api_key: SecretString) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.openai_base_url,
            model = %config.openai_model,
            "Creating OpenAI client"
        );

        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(std::time::Duration::from_secs(10)))
            .user_agent(format!("painter-openai/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Sends a chat request whose answer must match the schema of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failures, [`Error::Api`] on a
    /// non-success status, [`Error::Serde`] on a malformed body, and
    /// [`Error::Validation`] when the answer does not match `T`.
    pub async fn complete_structured<T>(
        &self,
        messages: Vec<ChatMessage>,
        schema_name: &str,
    ) -> Result<StructuredResponse<T>>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let request = ChatRequest {
            model: self.config.openai_model.clone(),
            messages,
            max_tokens: Some(self.config.openai_max_tokens),
            temperature: Some(0.0),
            response_format: ResponseFormat::json_schema(schema_name, response_schema::<T>()?),
        };

        let response = self.send(&request).await?;
        let content = strip_code_fence(response.content()?);

        let value = serde_json::from_str::<T>(content).map_err(|e| {
            Error::validation(format!("{e} (content: {})", excerpt(content)))
        })?;

        let usage = response.usage.unwrap_or_default();

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            schema = schema_name,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Structured completion parsed"
        );

        Ok(StructuredResponse { value, usage })
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.config.completions_url()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!(
                target: TRACING_TARGET_CLIENT,
                status = status.as_u16(),
                message = %excerpt(&message),
                "Chat completion request failed"
            );

            return Err(Error::api_error(status.as_u16(), excerpt(&message)));
        }

        let body = response.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&body)?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            status = status.as_u16(),
            id = parsed.id.as_deref().unwrap_or_default(),
            "Chat completion response received"
        );

        Ok(parsed)
    }
}

/// Builds the strict response schema for `T`.
///
/// Drops the `$schema` marker and integer `format` hints, which strict mode
/// rejects.
pub(crate) fn response_schema<T: JsonSchema>() -> Result<Value> {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))?;
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    strip_integer_formats(&mut schema);
    Ok(schema)
}

fn strip_integer_formats(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("integer") {
                map.remove("format");
            }
            map.values_mut().for_each(strip_integer_formats);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_integer_formats),
        _ => {}
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_LEN {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(EXCERPT_LEN).collect();
    cut.push_str("...");
    cut
}
