use async_trait::async_trait;
use log::{ info, error };
use reqwest::{ Client as HttpClient, Response, multipart::{ Form, Part } };
use serde_json::Value as JsonValue;
use std::time::Duration;
use url::Url;

use super::{ DocumentQaClient, FileUpload };
use crate::config::{ endpoint, ApiKey, RelayConfig };
use crate::error::{ details_from_body, RelayError };
use crate::models::api::ChatRequest;
use crate::models::chat::{ ChatMessage, Source };

const API_KEY_HEADER: &str = "x-api-key";
const ADD_FILE_PATH: &str = "sources/add-file";
const CHAT_PATH: &str = "chats/message";

/// Client for the ChatPDF-style API: one multipart upload endpoint and one
/// JSON chat endpoint, both authenticated with a static `x-api-key`.
pub struct ChatPdfClient {
    http: HttpClient,
    api_key: ApiKey,
    base_url: Url,
    timeout: Duration,
}

impl ChatPdfClient {
    pub fn new(config: &RelayConfig) -> Result<Self, reqwest::Error> {
        let http = HttpClient::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.api_url.clone(),
            timeout: config.upstream_timeout,
        })
    }

    /// Reads the body and returns it as JSON for 2xx answers, or the
    /// pass-through error otherwise.
    async fn read_json(&self, resp: Response) -> Result<JsonValue, RelayError> {
        let status = resp.status();
        let body = resp.text().await
            .map_err(|e| RelayError::transport(&e, self.timeout))?;

        if !status.is_success() {
            return Err(RelayError::Upstream { status, details: details_from_body(&body) });
        }

        serde_json::from_str(&body).map_err(|e| RelayError::Upstream {
            status: reqwest::StatusCode::BAD_GATEWAY,
            details: serde_json::json!({
                "message": format!("upstream returned invalid JSON: {}", e),
                "body": body,
            }),
        })
    }
}

fn string_field(body: JsonValue, field: &str) -> Result<String, RelayError> {
    match body.get(field).and_then(|v| v.as_str()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(RelayError::malformed(field, body)),
    }
}

#[async_trait]
impl DocumentQaClient for ChatPdfClient {
    async fn add_file(&self, file: FileUpload) -> Result<Source, RelayError> {
        let size = file.bytes.len();
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(mime) = file.content_type.as_deref() {
            part = part.mime_str(mime)
                .map_err(|e| RelayError::input(format!("Invalid content type '{}': {}", mime, e)))?;
        }
        let form = Form::new().part("file", part);

        info!("Sending '{}' ({} bytes) to document API...", file.file_name, size);
        let resp = self.http
            .post(endpoint(&self.base_url, ADD_FILE_PATH))
            .header(API_KEY_HEADER, self.api_key.expose())
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::transport(&e, self.timeout));

        let body = match resp {
            Ok(resp) => self.read_json(resp).await,
            Err(e) => Err(e),
        }
        .inspect_err(|e| error!("Error uploading file: {}", e))?;

        let source_id = string_field(body, "sourceId")
            .inspect_err(|e| error!("Error uploading file: {}", e))?;
        info!("Document API created source {}", source_id);
        Ok(Source::new(source_id))
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatMessage, RelayError> {
        info!(
            "Forwarding {} message(s) for source {} to document API",
            request.messages.len(),
            request.source_id
        );
        let resp = self.http
            .post(endpoint(&self.base_url, CHAT_PATH))
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(|e| RelayError::transport(&e, self.timeout));

        let body = match resp {
            Ok(resp) => self.read_json(resp).await,
            Err(e) => Err(e),
        }
        .inspect_err(|e| error!("Error in chat: {}", e))?;

        let content = string_field(body, "content")
            .inspect_err(|e| error!("Error in chat: {}", e))?;
        Ok(ChatMessage::assistant(content))
    }
}
