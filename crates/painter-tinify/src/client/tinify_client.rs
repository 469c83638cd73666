//! Tinify compression client.

use bytes::Bytes;
use reqwest::header::LOCATION;
use reqwest::{Client as HttpClient, ClientBuilder, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::TinifyConfig;
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Header reporting how many compressions the key has used this month.
const COMPRESSION_COUNT: &str = "Compression-Count";

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Client for a Tinify-compatible compression API.
#[derive(Clone)]
pub struct TinifyClient {
    http_client: HttpClient,
    config: TinifyConfig,
    api_key: SecretString,
}

impl std::fmt::Debug for TinifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TinifyClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TinifyClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: TinifyConfig, api_key: SecretString) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            base_url = %config.tinify_base_url,
            "Creating Tinify client"
        );

        let http_client = ClientBuilder::new()
            .timeout(config.timeout())
            .user_agent(format!("painter-tinify/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &TinifyConfig {
        &self.config
    }

    fn add_auth_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("api", Some(self.api_key.expose_secret()))
    }

    /// Uploads `image` and downloads the compressed result.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, non-success statuses on either request, or
    /// a response without an output location.
    pub async fn shrink(&self, image: Bytes) -> Result<Bytes> {
        let input_size = image.len();
        let url = self.config.shrink_url()?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            url = %url,
            input_size,
            "Uploading image for compression"
        );

        let response = self
            .add_auth_headers(self.http_client.post(url))
            .body(image)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::api_error(response).await);
        }

        if let Some(count) = response
            .headers()
            .get(COMPRESSION_COUNT)
            .and_then(|value| value.to_str().ok())
        {
            tracing::info!(
                target: TRACING_TARGET_CLIENT,
                compression_count = count,
                "Compression quota used"
            );
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?;
        let output = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_slice::<ShrinkResponse>(&body)?.output)
        };

        let output_url = output
            .as_ref()
            .and_then(|output| output.url.clone())
            .or(location)
            .ok_or(Error::MissingOutput)?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            output_url = %output_url,
            output_size = output.and_then(|output| output.size),
            "Downloading compressed image"
        );

        let response = self
            .add_auth_headers(self.http_client.get(&output_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let compressed = response.bytes().await?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            input_size,
            output_size = compressed.len(),
            "Image compressed"
        );

        Ok(compressed)
    }

    async fn api_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(ErrorResponse {
                error,
                message: Some(message),
            }) => format!("{error}: {message}"),
            Ok(ErrorResponse { error, .. }) => error,
            Err(_) => text,
        };

        tracing::error!(
            target: TRACING_TARGET_CLIENT,
            status,
            message = %message,
            "Compression request failed"
        );

        Error::api_error(status, message)
    }
}

#[async_trait::async_trait]
impl painter_core::ImageCompressor for TinifyClient {
    async fn compress(&self, image: Bytes) -> painter_core::Result<Bytes> {
        self.shrink(image).await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    // base64("api:tinify-key")
    const BASIC_AUTH: &str = "Basic YXBpOnRpbmlmeS1rZXk=";

    fn client(server: &MockServer) -> TinifyClient {
        TinifyClient::new(
            TinifyConfig::new(server.uri()),
            SecretString::new("tinify-key".to_string()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_shrink_then_download() {
        let server = MockServer::start().await;
        let output_url = format!("{}/output/abc", server.uri());

        Mock::given(method("POST"))
            .and(path("/shrink"))
            .and(header("authorization", BASIC_AUTH))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Location", output_url.as_str())
                    .insert_header("Compression-Count", "7")
                    .set_body_json(json!({
                        "input": {"size": 10, "type": "image/png"},
                        "output": {"size": 4, "type": "image/png", "url": output_url}
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/output/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]))
            .expect(1)
            .mount(&server)
            .await;

        let compressed = client(&server)
            .shrink(Bytes::from_static(&[0u8; 10]))
            .await
            .unwrap();
        assert_eq!(compressed.as_ref(), &[1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_location_header_fallback() {
        let server = MockServer::start().await;
        let output_url = format!("{}/output/xyz", server.uri());

        Mock::given(method("POST"))
            .and(path("/shrink"))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", output_url.as_str()))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/output/xyz"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8]))
            .mount(&server)
            .await;

        let compressed = client(&server).shrink(Bytes::from_static(b"img")).await.unwrap();
        assert_eq!(compressed.as_ref(), &[9]);
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Unauthorized",
                "message": "Credentials are invalid."
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .shrink(Bytes::from_static(b"img"))
            .await
            .unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized: Credentials are invalid.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let err = client(&server)
            .shrink(Bytes::from_static(b"img"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingOutput));
    }
}
