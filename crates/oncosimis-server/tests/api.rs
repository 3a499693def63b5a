//! Router tests: build the app against a temp document directory and call it
//! in-process.

use std::path::Path;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use oncosimis_server::{router, AppState, DocumentStore, OllamaClient};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn docs_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("SOP-001 Cell Culture.txt"),
        "Passage CHO cells at 80% confluence.",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("SOP-002 Cleaning Validation.txt"),
        "Swab every surface twice.",
    )
    .unwrap();
    dir
}

fn app(docs: &Path, ollama_url: &str) -> Router {
    let ollama = OllamaClient::new(ollama_url, "llama2:7b")
        .with_timeouts(Duration::from_secs(2), Duration::from_millis(500));
    let state = AppState::new(ollama, DocumentStore::load(docs), "You answer for Oncosimis.");
    router(state)
}

/// An Ollama address with nothing listening.
fn dead_ollama() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

fn chat_request(message: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "message": message }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_disconnected_runtime() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["ollama"], "disconnected");
    assert_eq!(json["documents_loaded"], 2);
    assert_eq!(json["backend"], "running");
}

#[tokio::test]
async fn health_reports_connected_runtime() {
    let ollama = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ollama is running"))
        .mount(&ollama)
        .await;

    let docs = docs_dir();
    let response = app(docs.path(), &ollama.uri())
        .oneshot(get("/health"))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["ollama"], "connected");
    assert_eq!(json["model"], "llama2:7b");
}

#[tokio::test]
async fn root_describes_service() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama()).oneshot(get("/")).await.unwrap();

    let json = body_json(response).await;
    assert_eq!(json["status"], "running");
    assert_eq!(json["documents"], 2);
}

#[tokio::test]
async fn documents_lists_loaded_names() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(get("/documents"))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    assert_eq!(
        json["documents"],
        json!(["SOP-001 Cell Culture.txt", "SOP-002 Cleaning Validation.txt"])
    );
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(chat_request("   "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Message cannot be empty");
}

#[tokio::test]
async fn greeting_skips_the_model() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(chat_request("Hello!"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["response"].as_str().unwrap().contains("Oncosimis"));
    assert!(json["files"].is_null());
}

#[tokio::test]
async fn file_request_returns_references() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(chat_request("send me the cleaning SOP"))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(
        json["files"],
        json!([{
            "filename": "SOP-002 Cleaning Validation.txt",
            "path": "/download/SOP-002 Cleaning Validation.txt"
        }])
    );
    assert!(json["response"]
        .as_str()
        .unwrap()
        .starts_with("I found this document for you:"));
}

#[tokio::test]
async fn question_is_answered_by_ollama() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "AcceTT is a CHO cell-based platform.",
            "done": true
        })))
        .expect(1)
        .mount(&ollama)
        .await;

    let docs = docs_dir();
    let response = app(docs.path(), &ollama.uri())
        .oneshot(chat_request("What is AcceTT?"))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["response"], "AcceTT is a CHO cell-based platform.");

    let requests = ollama.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = sent["prompt"].as_str().unwrap();
    assert!(prompt.starts_with("You answer for Oncosimis."));
    assert!(prompt.contains("Swab every surface twice."));
    assert!(prompt.contains("User Question: What is AcceTT?"));
}

#[tokio::test]
async fn unreachable_model_still_answers_200() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(chat_request("What is AcceTT?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["response"],
        "An error occurred while processing your request."
    );
}

#[tokio::test]
async fn download_serves_file_bytes() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(get("/download/SOP-001%20Cell%20Culture.txt"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"SOP-001 Cell Culture.txt\""
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"Passage CHO cells at 80% confluence.");
}

#[tokio::test]
async fn download_rejects_traversal() {
    let docs = docs_dir();
    for uri in ["/download/..%2Fsecret.txt", "/download/a%5Cb.txt", "/download/..secret"] {
        let response = app(docs.path(), &dead_ollama()).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["detail"], "Invalid filename");
    }
}

#[tokio::test]
async fn download_missing_file_is_404() {
    let docs = docs_dir();
    let response = app(docs.path(), &dead_ollama())
        .oneshot(get("/download/SOP-999.docx"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["detail"],
        "File 'SOP-999.docx' not found"
    );
}

#[tokio::test]
async fn download_directory_is_rejected() {
    let docs = docs_dir();
    std::fs::create_dir(docs.path().join("archive")).unwrap();

    let response = app(docs.path(), &dead_ollama())
        .oneshot(get("/download/archive"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Invalid file");
}
