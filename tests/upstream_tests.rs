//! Tests for the ChatPDF client and the relay on top of it, with wiremock
//! standing in for the document API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{ json, Value };
use url::Url;
use wiremock::matchers::{ body_json, header, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

use paper_whisper::config::{ ApiKey, RelayConfig };
use paper_whisper::error::RelayError;
use paper_whisper::models::api::ChatRequest;
use paper_whisper::models::chat::{ ChatMessage, Role };
use paper_whisper::relay::Relay;
use paper_whisper::upstream::{ ChatPdfClient, DocumentQaClient, FileUpload };

const TEST_KEY: &str = "sec_wiremock";

fn client_for(server: &MockServer, timeout: Duration) -> ChatPdfClient {
    let config = RelayConfig {
        api_key: ApiKey::new(TEST_KEY),
        api_url: Url::parse(&format!("{}/v1", server.uri())).unwrap(),
        upstream_timeout: timeout,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        max_upload_bytes: 1024 * 1024,
        static_dir: PathBuf::new(),
        tls: None,
    };
    ChatPdfClient::new(&config).unwrap()
}

fn sample_file() -> FileUpload {
    FileUpload {
        file_name: "paper.txt".into(),
        content_type: Some("text/plain".into()),
        bytes: b"Attention is all you need.".to_vec(),
    }
}

#[tokio::test]
async fn add_file_sends_key_and_returns_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sources/add-file"))
        .and(header("x-api-key", TEST_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sourceId": "src_abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    let source = client_for(&server, Duration::from_secs(5)).add_file(sample_file()).await.unwrap();
    assert_eq!(source.id(), "src_abc123");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"paper.txt\""));
    assert!(body.contains("Attention is all you need."));
}

#[tokio::test]
async fn add_file_without_source_id_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sources/add-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "wrong-field" })))
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5)).add_file(sample_file()).await.unwrap_err();
    match err {
        RelayError::Upstream { status, details } => {
            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(details["body"]["id"], "wrong-field");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn add_file_error_status_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sources/add-file"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API key" })))
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5)).add_file(sample_file()).await.unwrap_err();
    match err {
        RelayError::Upstream { status, details } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(details["message"], "Invalid API key");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn chat_posts_full_request_and_reads_content() {
    let server = MockServer::start().await;
    let request = ChatRequest {
        source_id: "src_abc123".into(),
        messages: vec![ChatMessage::user("Summarize the paper")],
    };
    Mock::given(method("POST"))
        .and(path("/v1/chats/message"))
        .and(header("x-api-key", TEST_KEY))
        .and(body_json(json!({
            "sourceId": "src_abc123",
            "messages": [{ "role": "user", "content": "Summarize the paper" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "It introduces transformers." })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server, Duration::from_secs(5)).send_message(&request).await.unwrap();
    assert_eq!(reply.role(), Role::Assistant);
    assert_eq!(reply.content(), "It introduces transformers.");
}

#[tokio::test]
async fn chat_with_non_json_success_body_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chats/message"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let request = ChatRequest { source_id: "s".into(), messages: vec![ChatMessage::user("hi")] };
    let err = client_for(&server, Duration::from_secs(5)).send_message(&request).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream { status, .. } if status == StatusCode::BAD_GATEWAY));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chats/message"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "content": "late" }))
                .set_delay(Duration::from_secs(3))
        )
        .mount(&server)
        .await;

    let request = ChatRequest { source_id: "s".into(), messages: vec![ChatMessage::user("hi")] };
    let err = client_for(&server, Duration::from_millis(300)).send_message(&request).await.unwrap_err();
    assert!(matches!(err, RelayError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn sequential_chats_forward_growing_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chats/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "answer" })))
        .expect(2)
        .mount(&server)
        .await;

    let relay = Relay::new(Arc::new(client_for(&server, Duration::from_secs(5))));
    let mut history = vec![ChatMessage::user("first question")];
    let reply = relay.converse("src_1", history.clone()).await.unwrap();
    history.push(reply);
    history.push(ChatMessage::user("second question"));
    relay.converse("src_1", history.clone()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(first["messages"].as_array().unwrap().len(), 1);
    assert_eq!(second["messages"], serde_json::to_value(&history).unwrap());
    assert_eq!(second["messages"][0]["content"], "first question");
    assert_eq!(second["messages"][1]["role"], "assistant");
}

#[tokio::test]
async fn empty_source_id_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/sources/add-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sourceId": "" })))
        .mount(&server)
        .await;

    let err = client_for(&server, Duration::from_secs(5)).add_file(sample_file()).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream { status, .. } if status == StatusCode::BAD_GATEWAY));
}

#[tokio::test]
async fn empty_chat_content_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chats/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "content": "" })))
        .mount(&server)
        .await;

    let request = ChatRequest { source_id: "s".into(), messages: vec![ChatMessage::user("hi")] };
    let err = client_for(&server, Duration::from_secs(5)).send_message(&request).await.unwrap_err();
    assert!(matches!(err, RelayError::Upstream { status, .. } if status == StatusCode::BAD_GATEWAY));
}
