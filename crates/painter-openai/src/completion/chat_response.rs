//! Chat completion response types.

use serde::Deserialize;

use crate::{Error, Result};

/// Token usage reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt, images included.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens in the generated answer.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Prompt and completion tokens combined.
    #[serde(default)]
    pub total_tokens: u32,
}

/// Assistant message inside a choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    /// Generated content, absent on refusal.
    #[serde(default)]
    pub content: Option<String>,
    /// Refusal explanation, present when the model declined.
    #[serde(default)]
    pub refusal: Option<String>,
}

/// One generated alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Position in the choice list.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: ResponseMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A chat completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated alternatives.
    pub choices: Vec<Choice>,
    /// Token usage; absent from some compatible servers.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Returns the content of the first choice.
    ///
    /// # Errors
    ///
    /// Fails if there is no choice, the model refused, the output was cut off
    /// by the token limit, or the content is empty.
    pub fn content(&self) -> Result<&str> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| Error::validation("response contains no choices"))?;

        if let Some(refusal) = &choice.message.refusal {
            return Err(Error::validation(format!("model refused: {refusal}")));
        }

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(Error::validation("response truncated by token limit"));
        }

        choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::validation("response content is empty"))
    }

    /// Returns the total token usage, or zero when unreported.
    pub fn total_tokens(&self) -> u32 {
        self.usage.map(|usage| usage.total_tokens).unwrap_or_default()
    }
}

/// Strips a surrounding markdown code fence, if any.
///
/// Compatible servers without strict schema support sometimes wrap JSON in
/// a fenced block.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: serde_json::Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_content_and_usage() {
        let resp = response(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": " {} "}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 200, "total_tokens": 1200}
        }));

        assert_eq!(resp.content().unwrap(), "{}");
        assert_eq!(resp.total_tokens(), 1200);
    }

    #[test]
    fn test_missing_usage_counts_as_zero() {
        let resp = response(json!({
            "choices": [{"message": {"content": "{}"}}]
        }));
        assert_eq!(resp.total_tokens(), 0);
    }

    #[test]
    fn test_refusal_and_truncation_are_errors() {
        let refused = response(json!({
            "choices": [{"message": {"content": null, "refusal": "I can't help"}}]
        }));
        assert!(matches!(refused.content(), Err(Error::Validation(_))));

        let truncated = response(json!({
            "choices": [{"message": {"content": "{\"title\":"}, "finish_reason": "length"}]
        }));
        assert!(matches!(truncated.content(), Err(Error::Validation(_))));

        let empty = response(json!({"choices": []}));
        assert!(empty.content().is_err());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
    }
}
