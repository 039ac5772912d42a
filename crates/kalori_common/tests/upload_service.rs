//! Upload client tests against an in-process analysis service
//!
//! Covers the wire contract (one `foodImage` part, `food.jpg`, `image/jpeg`),
//! response field extraction and failure classification, plus a full session
//! driven through the real HTTP client.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use kalori_common::presenter::{ERROR_MESSAGE, RESULT_TITLE};
use kalori_common::{
    FileCamera, HttpUploadClient, Orchestrator, PhotoArtifact, ScriptedSurface, UploadError,
    UploadOutcome, Uploader, UserAction,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00kalori-test-plate\xff\xd9";

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

type Requests = Arc<Mutex<Vec<Vec<ReceivedPart>>>>;

#[derive(Clone)]
struct ServiceState {
    status: StatusCode,
    body: String,
    requests: Requests,
}

async fn analyze_food(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            bytes,
        });
    }
    state.requests.lock().unwrap().push(parts);
    (state.status, state.body.clone())
}

/// Start a service answering every request with `status` and `body`
async fn spawn_service(status: StatusCode, body: &str) -> (String, Requests) {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let state = ServiceState {
        status,
        body: body.to_string(),
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/analyze-food", post(analyze_food))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/analyze-food", addr), requests)
}

fn write_photo(dir: &Path) -> PathBuf {
    let path = dir.join("plate.jpg");
    std::fs::write(&path, JPEG_BYTES).unwrap();
    path
}

async fn upload_once(endpoint: &str) -> UploadOutcome {
    let dir = tempfile::tempdir().unwrap();
    let artifact = PhotoArtifact::jpeg(write_photo(dir.path()));
    let client = HttpUploadClient::new(endpoint).unwrap();
    client.upload(&artifact).await
}

#[tokio::test]
async fn test_upload_sends_single_food_image_part() {
    let body = json!({"data": {"nama_makanan": "Nasi Goreng", "jumlah_kalori": 350}});
    let (endpoint, requests) = spawn_service(StatusCode::OK, &body.to_string()).await;
    let dir = tempfile::tempdir().unwrap();
    let artifact = PhotoArtifact::jpeg(write_photo(dir.path()));

    let outcome = HttpUploadClient::new(&endpoint).unwrap().upload(&artifact).await;

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1, "exactly one request per upload");
    let parts = &requests[0];
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "foodImage");
    assert_eq!(parts[0].file_name.as_deref(), Some("food.jpg"));
    assert_eq!(parts[0].content_type.as_deref(), Some(artifact.mime_type()));
    assert_eq!(parts[0].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(parts[0].bytes, JPEG_BYTES);

    match outcome {
        UploadOutcome::Success(result) => {
            assert_eq!(result.food_name, "Nasi Goreng");
            assert_eq!(result.calorie_value, json!(350));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_uses_estimate_and_unknown_name() {
    let body = json!({"data": {"perkiraan_kalori": "~400 kcal"}});
    let (endpoint, _) = spawn_service(StatusCode::OK, &body.to_string()).await;

    match upload_once(&endpoint).await {
        UploadOutcome::Success(result) => {
            assert_eq!(result.food_name, "Tidak diketahui");
            assert_eq!(result.calorie_value, json!("~400 kcal"));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_empty_data_is_still_success() {
    let (endpoint, _) = spawn_service(StatusCode::OK, r#"{"data":{}}"#).await;

    match upload_once(&endpoint).await {
        UploadOutcome::Success(result) => {
            assert_eq!(result.food_name, "Tidak diketahui");
            assert_eq!(result.calorie_value, json!("Kalori tidak diketahui"));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_non_json_success_body_is_parse_error() {
    let (endpoint, _) = spawn_service(StatusCode::OK, "<html>ok</html>").await;

    let outcome = upload_once(&endpoint).await;
    assert!(matches!(outcome, UploadOutcome::Failure(UploadError::Parse(_))));
}

#[tokio::test]
async fn test_upload_server_error_with_json_body() {
    let (endpoint, _) = spawn_service(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"model unavailable"}"#,
    )
    .await;

    let outcome = upload_once(&endpoint).await;
    assert!(matches!(outcome, UploadOutcome::Failure(UploadError::Server(_))));
}

#[tokio::test]
async fn test_upload_gateway_error_without_json_is_network() {
    let (endpoint, requests) = spawn_service(StatusCode::BAD_GATEWAY, "Bad Gateway").await;

    let outcome = upload_once(&endpoint).await;
    assert!(matches!(outcome, UploadOutcome::Failure(UploadError::Network(_))));
    // No retry after a failure
    assert_eq!(requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_connection_refused_is_network() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let outcome = upload_once(&format!("http://{}/analyze-food", addr)).await;
    match outcome {
        UploadOutcome::Failure(e) => assert_eq!(e.kind(), "network"),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_missing_photo_makes_no_request() {
    let (endpoint, requests) = spawn_service(StatusCode::OK, r#"{"data":{}}"#).await;
    let client = HttpUploadClient::new(&endpoint).unwrap();

    let outcome = client
        .upload(&PhotoArtifact::jpeg("/nonexistent/kalori/plate.jpg"))
        .await;

    assert!(matches!(outcome, UploadOutcome::Failure(UploadError::Server(_))));
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_full_session_against_service() {
    let body = json!({"data": {"nama_makanan": "Gado-gado", "perkiraan_kalori": 420}});
    let (endpoint, requests) = spawn_service(StatusCode::OK, &body.to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let still = write_photo(dir.path());
    let camera = FileCamera::new(&still, dir.path().join("captures"));
    let mut session = Orchestrator::new(camera, HttpUploadClient::new(&endpoint).unwrap());
    let mut surface = ScriptedSurface::new(vec![
        UserAction::Capture,
        UserAction::Retake,
        UserAction::Capture,
        UserAction::Confirm,
    ]);

    session.run(&mut surface).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0][0].bytes, JPEG_BYTES);
    assert_eq!(surface.alerts().len(), 1);
    assert_eq!(surface.alerts()[0].title, RESULT_TITLE);
    assert_eq!(surface.alerts()[0].message, "Makanan: Gado-gado\nKalori: 420");
    assert!(session.state().artifact().is_none());
}

#[tokio::test]
async fn test_full_session_failure_alert() {
    let (endpoint, _) = spawn_service(StatusCode::SERVICE_UNAVAILABLE, "").await;

    let dir = tempfile::tempdir().unwrap();
    let still = write_photo(dir.path());
    let camera = FileCamera::new(&still, dir.path().join("captures"));
    let mut session = Orchestrator::new(camera, HttpUploadClient::new(&endpoint).unwrap());
    let mut surface = ScriptedSurface::new(vec![UserAction::Capture, UserAction::Confirm]);

    session.run(&mut surface).await.unwrap();

    assert_eq!(surface.alerts().len(), 1);
    assert_eq!(surface.alerts()[0].message, ERROR_MESSAGE);
    assert_eq!(surface.views().last().map(String::as_str), Some("camera"));
}
