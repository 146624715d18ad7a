pub mod terminal;

use crate::config::endpoint;
use crate::models::api::{ ChatReply, ChatRequest, ErrorBody, SourceCreated };
use crate::models::chat::{ ChatMessage, Source };
use crate::session::{ Session, SessionError };

use log::{ info, warn };
use reqwest::{ Client as HttpClient, Response, multipart::{ Form, Part } };
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const CHAT_FALLBACK: &str = "Sorry, an error occurred while processing your request.";
pub const UPLOAD_FALLBACK: &str = "Error uploading file. Please try again.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid server URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Text to show the user when an upload fails.
    pub fn upload_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } if !message.is_empty() => message.clone(),
            ClientError::Io(e) => format!("Could not read file: {}", e),
            ClientError::Session(e) => e.to_string(),
            _ => UPLOAD_FALLBACK.to_string(),
        }
    }
}

/// HTTP client for the relay's own `/api` surface.
#[derive(Clone)]
pub struct RelayClient {
    http: HttpClient,
    base_url: Url,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url: Url::parse(base_url)? })
    }

    pub async fn add_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<Source, ClientError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));
        let resp = self.http
            .post(endpoint(&self.base_url, "api/add-file"))
            .multipart(form)
            .send()
            .await?;
        let created: SourceCreated = read_reply(resp).await?;
        if created.source_id.is_empty() {
            return Err(ClientError::InvalidResponse("empty sourceId".into()));
        }
        Ok(Source::new(created.source_id))
    }

    pub async fn chat(&self, source: &Source, messages: &[ChatMessage]) -> Result<ChatMessage, ClientError> {
        let body = ChatRequest {
            source_id: source.id().to_string(),
            messages: messages.to_vec(),
        };
        let resp = self.http
            .post(endpoint(&self.base_url, "api/chat"))
            .json(&body)
            .send()
            .await?;
        let reply: ChatReply = read_reply(resp).await?;
        if reply.content.is_empty() {
            return Err(ClientError::InvalidResponse("empty content".into()));
        }
        Ok(ChatMessage::assistant(reply.content))
    }
}

async fn read_reply<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.message.unwrap_or(b.error))
            .unwrap_or_default();
        return Err(ClientError::Server { status: status.as_u16(), message });
    }
    serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))
}

/// Headless counterpart of the upload and chat views: owns the session and
/// keeps the conversation intact when a chat request fails.
pub struct ChatSession {
    client: RelayClient,
    session: Session,
}

impl ChatSession {
    pub fn new(client: RelayClient) -> Self {
        Self { client, session: Session::new() }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub async fn upload(&mut self, path: &Path) -> Result<&Source, ClientError> {
        if self.session.source().is_some() {
            return Err(SessionError::SourceAlreadyActive.into());
        }
        let _guard = self.session.begin_request()?;

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let source = self.client.add_file(&file_name, bytes).await?;
        info!("Uploaded '{}' as source {}", file_name, source.id());
        self.session.set_source(source);
        self.session.source().ok_or(ClientError::Session(SessionError::NoActiveSource))
    }

    /// Sends `text` with the whole conversation so far. Blank input is
    /// ignored. Returns the assistant turn that was appended, which is the
    /// fallback apology if the relay failed.
    pub async fn ask(&mut self, text: &str) -> Result<Option<&ChatMessage>, SessionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let source = self.session.source().cloned().ok_or(SessionError::NoActiveSource)?;
        let _guard = self.session.begin_request()?;

        self.session.append_message(ChatMessage::user(text))?;
        let history = self.session
            .conversation()
            .map(|c| c.messages().to_vec())
            .unwrap_or_default();

        let reply = match self.client.chat(&source, &history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Error sending message: {}", e);
                ChatMessage::assistant(CHAT_FALLBACK)
            }
        };
        self.session.append_message(reply)?;
        Ok(self.session.conversation().and_then(|c| c.messages().last()))
    }
}
