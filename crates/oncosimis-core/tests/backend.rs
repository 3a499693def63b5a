use std::time::Duration;

use oncosimis_core::monitor::StatusMonitor;
use oncosimis_core::{
    downloads, Action, BackendClient, ClientError, Connectivity, ConnectivityState, DownloadError,
    Effect, FailureKind, MessageKind, Session,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&server.uri()).unwrap()
}

/// A port nothing listens on.
fn dead_backend() -> BackendClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    BackendClient::new(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn health_request_carries_tunnel_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("ngrok-skip-browser-warning", "69420"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "ollama": "connected",
            "model": "llama2:7b",
            "documents_loaded": 3,
            "backend": "running"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = client_for(&server).await.health().await.unwrap();

    assert!(report.is_healthy());
    assert_eq!(report.documents_loaded, Some(3));
}

#[tokio::test]
async fn monitor_classifies_live_payloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "ollama": "disconnected"
        })))
        .mount(&server)
        .await;

    let monitor = StatusMonitor::new(client_for(&server).await, Duration::from_millis(10));
    assert_eq!(monitor.poll_once().await, Connectivity::RUNTIME_DISCONNECTED);
}

#[tokio::test]
async fn monitor_reports_offline_on_http_error_and_bad_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let monitor = StatusMonitor::new(client_for(&server).await, Duration::from_millis(10));
    assert_eq!(monitor.poll_once().await, Connectivity::BACKEND_OFFLINE);

    let html = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>tunnel</html>"))
        .mount(&html)
        .await;
    let monitor = StatusMonitor::new(client_for(&html).await, Duration::from_millis(10));
    assert_eq!(monitor.poll_once().await, Connectivity::BACKEND_ISSUES);
}

#[tokio::test]
async fn monitor_reports_offline_when_unreachable() {
    let monitor = StatusMonitor::new(dead_backend(), Duration::from_millis(10));
    let connectivity = monitor.poll_once().await;
    assert_eq!(connectivity.state, ConnectivityState::Offline);
    assert_eq!(connectivity.reason, "backend offline");
}

#[tokio::test]
async fn monitor_keeps_polling_until_told_to_stop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "ollama": "connected"
        })))
        .expect(3)
        .mount(&server)
        .await;

    let monitor = StatusMonitor::new(client_for(&server).await, Duration::from_millis(5));
    let mut seen = Vec::new();
    monitor
        .run(|connectivity| {
            seen.push(connectivity);
            seen.len() < 3
        })
        .await;

    assert_eq!(seen, vec![Connectivity::ONLINE; 3]);
}

#[tokio::test]
async fn chat_posts_message_and_reads_files() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "send me the cell culture SOP" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "I found this document for you:\n• SOP-001.docx",
            "files": [{ "filename": "SOP-001.docx", "path": "/download/SOP-001.docx" }]
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .await
        .chat("send me the cell culture SOP")
        .await
        .unwrap();

    assert_eq!(reply.file_refs().len(), 1);
    assert_eq!(reply.file_refs()[0].filename, "SOP-001.docx");
}

#[tokio::test]
async fn chat_failures_are_classified_by_kind() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let err = client_for(&server).await.chat("hi").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::NotFound);

    let err = dead_backend().chat("hi").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.kind(), FailureKind::Connection);
}

#[tokio::test]
async fn download_escapes_filename() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/SOP%20001.docx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"docx-bytes".to_vec()))
        .mount(&server)
        .await;

    let bytes = client_for(&server).await.download("SOP 001.docx").await.unwrap();
    assert_eq!(bytes, b"docx-bytes");
}

#[tokio::test]
async fn failed_download_saves_nothing_and_adds_one_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/missing.docx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let client = client_for(&server).await;

    let result = downloads::fetch_and_save(&client, "missing.docx", dir.path()).await;
    assert!(matches!(result, Err(DownloadError::Fetch(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let mut session = Session::new(None);
    session.apply(Action::DownloadSettled {
        filename: "missing.docx".into(),
        result,
    });
    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, MessageKind::Error);
    assert!(entries[0].content.contains("missing.docx"));
}

#[tokio::test]
async fn full_exchange_through_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "ollama": "connected"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "AcceTT® is a CHO cell-based platform.",
            "files": [{ "filename": "SOP-001.docx" }]
        })))
        .mount(&server)
        .await;
    let client = client_for(&server).await;
    let monitor = StatusMonitor::new(client.clone(), Duration::from_secs(10));

    let mut session = Session::new(None);
    session.apply(Action::HealthPolled(monitor.poll_once().await));

    let effect = session.apply(Action::Submit("What is AcceTT?".into()));
    let Some(Effect::SendChat(text)) = effect else {
        panic!("expected a chat effect, got {:?}", effect);
    };
    session.apply(Action::ChatSettled(client.chat(&text).await));

    let entries = session.transcript().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].content, "What is AcceTT?");
    assert_eq!(entries[1].content, "AcceTT® is a CHO cell-based platform.");
    let names: Vec<_> = session
        .transcript()
        .file_refs()
        .map(|f| f.filename.as_str())
        .collect();
    assert_eq!(names, ["SOP-001.docx"]);
}
