//! Wire types for the chat completions endpoint.

mod chat_request;
mod chat_response;

pub use chat_request::{
    ChatMessage, ChatRequest, ContentPart, ImageUrl, JsonSchemaFormat, MessageContent,
    ResponseFormat, Role,
};
pub(crate) use chat_response::strip_code_fence;
pub use chat_response::{ChatResponse, Choice, ResponseMessage, Usage};
