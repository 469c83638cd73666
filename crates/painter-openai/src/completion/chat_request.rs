//! Chat completion request types.

use serde::Serialize;
use serde_json::Value;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// The user's request.
    User,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// An image referenced by URL or `data:` URL.
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an image part from a base64 payload.
    pub fn image_base64(mime_type: &str, base64: &str) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{mime_type};base64,{base64}"),
                detail: None,
            },
        }
    }
}

/// Image reference inside a [`ContentPart`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    /// `https://` or `data:` URL.
    pub url: String,
    /// Optional fidelity hint (`low`, `high`, `auto`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Message content: either a plain string or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Text-only content.
    Text(String),
    /// Multimodal content.
    Parts(Vec<ContentPart>),
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Message body.
    pub content: MessageContent,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Creates a text-only user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Creates a multimodal user message.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

/// Strict JSON schema the response must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    /// Schema name, reported back by the API.
    pub name: String,
    /// Whether the API must enforce the schema exactly.
    pub strict: bool,
    /// The JSON schema document.
    pub schema: Value,
}

/// Requested response format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Structured output constrained by a JSON schema.
    JsonSchema { json_schema: JsonSchemaFormat },
}

impl ResponseFormat {
    /// Creates a strict JSON schema response format.
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }
}

/// A chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Structured output format.
    pub response_format: ResponseFormat,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serializes_multimodal_request() {
        let request = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![
                ChatMessage::system("Be precise."),
                ChatMessage::user_parts(vec![
                    ContentPart::text("Describe"),
                    ContentPart::image_base64("image/png", "AAAA"),
                ]),
            ],
            max_tokens: None,
            temperature: Some(0.0),
            response_format: ResponseFormat::json_schema("painting", json!({"type": "object"})),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "Be precise."},
                    {"role": "user", "content": [
                        {"type": "text", "text": "Describe"},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                    ]}
                ],
                "temperature": 0.0,
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": "painting", "strict": true, "schema": {"type": "object"}}
                }
            })
        );
    }
}
