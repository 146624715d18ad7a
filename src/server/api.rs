use crate::config::RelayConfig;
use crate::models::api::{ ChatRequest, SourceCreated, ChatReply };
use crate::relay::Relay;
use crate::upstream::FileUpload;
use super::error::ApiError;

use std::sync::Arc;
use axum::{
    routing::post,
    Router,
    Json,
    extract::{ DefaultBodyLimit, Multipart, State },
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use tower::ServiceBuilder;
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::{ ServeDir, ServeFile };
use log::{ info, warn };

const UPLOAD_LABEL: &str = "Error uploading file";
const CHAT_LABEL: &str = "Error in chat";

#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    pub config: Arc<RelayConfig>,
}

/// `/api` routes plus the single page app: files from the static directory,
/// anything else falls back to its `index.html`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/add-file", post(add_file_handler))
        .route("/chat", post(chat_handler));

    let static_dir = &state.config.static_dir;
    let spa = ServeDir::new(static_dir)
        .fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .fallback_service(spa)
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        )
        .with_state(state)
}

async fn add_file_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SourceCreated>, ApiError> {
    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(rejection) => {
            warn!("add-file request is not multipart: {}", rejection.body_text());
            None
        }
    };

    let source = state.relay.ingest(file).await
        .map_err(|e| ApiError::new(e, UPLOAD_LABEL))?;
    Ok(Json(SourceCreated { source_id: source.id().to_string() }))
}

/// Returns the first field named `file` that carries a file name.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<FileUpload>, ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(ApiError::rejection(e.status(), e.body_text())),
        };
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await
            .map_err(|e| ApiError::rejection(e.status(), e.body_text()))?;

        info!("Received upload '{}' ({} bytes)", file_name, bytes.len());
        return Ok(Some(FileUpload { file_name, content_type, bytes: bytes.to_vec() }));
    }
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload
        .map_err(|rejection| ApiError::rejection(StatusCode::BAD_REQUEST, rejection.body_text()))?;

    let reply = state.relay.converse(&req.source_id, req.messages).await
        .map_err(|e| ApiError::new(e, CHAT_LABEL))?;
    Ok(Json(ChatReply { content: reply.content().to_string() }))
}
