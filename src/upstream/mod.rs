pub mod chatpdf;

use async_trait::async_trait;
use crate::error::RelayError;
use crate::models::api::ChatRequest;
use crate::models::chat::{ ChatMessage, Source };

pub use self::chatpdf::ChatPdfClient;

/// A single uploaded document, held in memory.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The external document question-answering service.
#[async_trait]
pub trait DocumentQaClient: Send + Sync {
    /// Index a document and return the handle the service assigned to it.
    async fn add_file(&self, file: FileUpload) -> Result<Source, RelayError>;

    /// Send the full history and return the assistant's next turn.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatMessage, RelayError>;
}
