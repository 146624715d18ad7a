use serde::{ Serialize, Deserialize };
use super::chat::ChatMessage;

/// Body of `POST /api/chat`, and of the upstream `chats/message` call.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub source_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SourceCreated {
    pub source_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatReply {
    pub content: String,
}

/// Error payload returned by every `/api` route. `message`, when present,
/// is preferred over `error` for display.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
