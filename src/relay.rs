use crate::error::RelayError;
use crate::models::api::ChatRequest;
use crate::models::chat::{ ChatMessage, Role, Source };
use crate::upstream::{ DocumentQaClient, FileUpload };

use log::warn;
use std::sync::Arc;

pub const NO_FILE_MESSAGE: &str = "No file uploaded";

/// Stateless front for the two upstream operations. Each call makes at most
/// one upstream request and never retries.
#[derive(Clone)]
pub struct Relay {
    upstream: Arc<dyn DocumentQaClient>,
}

impl Relay {
    pub fn new(upstream: Arc<dyn DocumentQaClient>) -> Self {
        Self { upstream }
    }

    /// Document ingestion: forward exactly one file, return the new source.
    pub async fn ingest(&self, file: Option<FileUpload>) -> Result<Source, RelayError> {
        let file = file.ok_or_else(|| RelayError::input(NO_FILE_MESSAGE))?;
        self.upstream.add_file(file).await
    }

    /// Conversation relay: forward the caller's whole history, return the
    /// assistant's reply.
    pub async fn converse(
        &self,
        source_id: &str,
        history: Vec<ChatMessage>
    ) -> Result<ChatMessage, RelayError> {
        if source_id.trim().is_empty() {
            return Err(RelayError::input("sourceId is required"));
        }
        match history.last() {
            None => {
                return Err(RelayError::input("messages must contain at least one user message"));
            }
            Some(last) if last.role() != Role::User => {
                warn!("Rejected chat for source {}: last message is from {}", source_id, last.role());
                return Err(RelayError::input("the last message must be from the user"));
            }
            Some(_) => {}
        }

        let request = ChatRequest {
            source_id: source_id.to_string(),
            messages: history,
        };
        self.upstream.send_message(&request).await
    }
}
