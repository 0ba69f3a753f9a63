//! REST client tests against an in-process backend.

use anuario_core::{Character, CharacterPayload, PageMode};
use anuario_tui::api_client::{ApiClientError, RestClient};
use anuario_tui::session::Session;
use anuario_tui::sync::{run_sync, SyncOptions, SyncOutcome};
use axum::{
    body::Bytes,
    extract::{Multipart, Path, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Backend {
    hits: AtomicUsize,
    auth_headers: Mutex<Vec<Option<String>>>,
    paths: Mutex<Vec<String>>,
}

impl Backend {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn last_auth(&self) -> Option<String> {
        self.auth_headers.lock().unwrap().last().cloned().flatten()
    }

    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

async fn record(State(backend): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    backend.hits.fetch_add(1, Ordering::SeqCst);
    let auth = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.auth_headers.lock().unwrap().push(auth);
    backend.paths.lock().unwrap().push(req.uri().path().to_string());
    next.run(req).await
}

async fn list_characters() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Harry Potter", "house": "Gryffindor", "died": null, "alias_names": ["The Chosen One", "Undesirable No. 1"], "is_favorite": true},
        "not a character",
        {"id": "2", "name": "Sirius Black", "house": "Gryffindor", "died": "1996"}
    ]))
}

async fn create_character(Json(body): Json<Value>) -> Response {
    if body.get("name").and_then(Value::as_str).unwrap_or_default().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "name required"}))).into_response();
    }
    (StatusCode::CREATED, Json(json!({"id": 42}))).into_response()
}

async fn update_character(Path(_id): Path<String>, Json(_body): Json<Value>) -> StatusCode {
    StatusCode::OK
}

async fn delete_character(Path(id): Path<String>) -> Response {
    if id == "missing" {
        (StatusCode::NOT_FOUND, Json(json!({"error": "Character not found"}))).into_response()
    } else {
        StatusCode::OK.into_response()
    }
}

async fn favorite(Path(_id): Path<String>, body: Bytes) -> Json<Value> {
    let desired = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("is_favorite").and_then(Value::as_bool))
        .unwrap_or(true);
    Json(json!({"is_favorite": desired}))
}

async fn upload_image(Path(_id): Path<String>, mut multipart: Multipart) -> StatusCode {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let bytes = field.bytes().await.unwrap_or_default();
            if !bytes.is_empty() {
                return StatusCode::OK;
            }
        }
    }
    StatusCode::BAD_REQUEST
}

async fn sync_pull() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "upstream down"}))).into_response()
}

async fn sync_push() -> StatusCode {
    StatusCode::OK
}

async fn image_status() -> Json<Value> {
    Json(json!({"running": false, "total": 3}))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body.get("password").and_then(Value::as_str) == Some("alohomora") {
        Json(json!({"token": "tok-123", "username": body["username"]})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"}))).into_response()
    }
}

async fn register(Json(body): Json<Value>) -> StatusCode {
    if body.get("master_password").and_then(Value::as_str) == Some("hogwarts") {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_backend() -> (RestClient, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let router = Router::new()
        .route("/characters", get(list_characters).post(create_character))
        .route("/characters/:id", delete(delete_character).put(update_character))
        .route("/characters/:id/favorite", post(favorite))
        .route("/characters/:id/upload-image", post(upload_image))
        .route("/admin/sync-pull", post(sync_pull))
        .route("/admin/sync-mysql", post(sync_push))
        .route("/admin/sync-images/status", get(image_status))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(sync_push))
        .layer(middleware::from_fn_with_state(Arc::clone(&backend), record));
    let base_url = serve(router).await;
    let client = RestClient::with_timeouts(&base_url, Duration::from_secs(5), Duration::from_secs(5)).unwrap();
    (client, backend)
}

fn payload(name: &str) -> CharacterPayload {
    let character = Character {
        name: name.to_string(),
        ..Character::default()
    };
    CharacterPayload::from_character(&character).unwrap()
}

fn session() -> Session {
    Session::new("tok-123", Some("harry".to_string()))
}

#[tokio::test]
async fn fetch_skips_non_object_elements() {
    let (client, _) = spawn_backend().await;
    let characters = client.fetch_characters(&Session::anonymous()).await.unwrap();

    assert_eq!(characters.len(), 2);
    assert_eq!(characters[0].id, "1");
    assert_eq!(characters[0].alias, "The Chosen One, Undesirable No. 1");
    assert_eq!(characters[0].status, "Vivo");
    assert!(characters[0].favorite);
    assert_eq!(characters[1].status, "Fallecido");
}

#[tokio::test]
async fn create_while_not_logged_in_makes_no_request() {
    let (client, backend) = spawn_backend().await;
    let result = client
        .create_character(&Session::anonymous(), &payload("Neville Longbottom"))
        .await;

    assert!(matches!(result, Err(ApiClientError::NotLoggedIn)));
    assert_eq!(backend.hits(), 0);

    let update = client
        .update_character(&Session::anonymous(), "1", &payload("Neville"))
        .await;
    let delete = client.delete_character(&Session::anonymous(), "1").await;
    let upload = client
        .upload_image(&Session::anonymous(), "1", "neville.png", vec![1, 2, 3])
        .await;
    assert!(update.unwrap_err().is_auth());
    assert!(delete.unwrap_err().is_auth());
    assert!(upload.unwrap_err().is_auth());
    assert_eq!(backend.hits(), 0);
}

#[tokio::test]
async fn create_sends_raw_token_and_returns_id() {
    let (client, backend) = spawn_backend().await;
    let id = client
        .create_character(&session(), &payload("Neville Longbottom"))
        .await
        .unwrap();

    assert_eq!(id.as_deref(), Some("42"));
    assert_eq!(backend.last_auth().as_deref(), Some("tok-123"));
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization() {
    let (client, backend) = spawn_backend().await;
    client.fetch_characters(&Session::anonymous()).await.unwrap();
    assert_eq!(backend.last_auth(), None);
}

#[tokio::test]
async fn update_and_delete_report_status() {
    let (client, _) = spawn_backend().await;
    client
        .update_character(&session(), "1", &payload("Harry Potter"))
        .await
        .unwrap();
    client.delete_character(&session(), "1").await.unwrap();

    match client.delete_character(&session(), "missing").await {
        Err(ApiClientError::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "Character not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn favorite_toggle_works_without_session() {
    let (client, backend) = spawn_backend().await;
    let reported = client
        .toggle_favorite(&Session::anonymous(), "1", Some(false))
        .await
        .unwrap();
    assert_eq!(reported, Some(false));

    let toggled = client.toggle_favorite(&Session::anonymous(), "1", None).await.unwrap();
    assert_eq!(toggled, Some(true));
    assert_eq!(backend.hits(), 2);
}

#[tokio::test]
async fn upload_uses_image_part() {
    let (client, _) = spawn_backend().await;
    client
        .upload_image(&session(), "1", "harry.png", vec![0x89, 0x50, 0x4e, 0x47])
        .await
        .unwrap();
}

#[tokio::test]
async fn upload_file_reads_from_disk() {
    let (client, _) = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("luna.jpg");
    std::fs::write(&path, b"jpeg bytes").unwrap();

    client.upload_image_file(&session(), "2", &path).await.unwrap();

    let missing = client
        .upload_image_file(&session(), "2", &dir.path().join("nope.jpg"))
        .await;
    assert!(matches!(missing, Err(ApiClientError::Io(_))));
}

#[tokio::test]
async fn login_returns_session_or_auth_error() {
    let (client, _) = spawn_backend().await;
    let session = client.login("harry", "alohomora").await.unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.token(), Some("tok-123"));
    assert_eq!(session.username(), Some("harry"));

    let err = client.login("harry", "wrong").await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.to_string(), "HTTP 401: Invalid credentials");
}

#[tokio::test]
async fn register_sends_master_password() {
    let (client, _) = spawn_backend().await;
    client.register("ron", "scabbers", "hogwarts").await.unwrap();
    assert!(client.register("ron", "scabbers", "wrong").await.is_err());
}

#[tokio::test]
async fn logout_requires_session() {
    let (client, backend) = spawn_backend().await;
    assert!(matches!(
        client.logout(&Session::anonymous()).await,
        Err(ApiClientError::NotLoggedIn)
    ));
    client.logout(&session()).await.unwrap();
    assert_eq!(backend.paths(), vec!["/auth/logout".to_string()]);
}

#[tokio::test]
async fn full_sync_attempts_push_then_pull() {
    let (client, backend) = spawn_backend().await;
    let result = client.full_sync(&session()).await;

    assert!(matches!(result, Err(ApiClientError::Status { status: 500, .. })));
    assert_eq!(
        backend.paths(),
        vec!["/admin/sync-mysql".to_string(), "/admin/sync-pull".to_string()]
    );
}

#[tokio::test]
async fn image_status_defaults_missing_fields() {
    let (client, _) = spawn_backend().await;
    let status = client.image_sync_status(&Session::anonymous()).await.unwrap();
    assert!(!status.running);
    assert_eq!(status.current, 0);
    assert_eq!(status.total, 3);
}

#[tokio::test]
async fn sync_against_backend_with_failing_pull_goes_offline() {
    let (client, backend) = spawn_backend().await;
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let options = SyncOptions {
        poll_interval: Duration::from_millis(10),
        max_missed_status: 5,
        page_mode: PageMode::Reset,
    };

    let outcome = run_sync(&client, &Session::anonymous(), &options, &tx, &CancellationToken::new()).await;

    assert_eq!(outcome, SyncOutcome::Offline);
    assert_eq!(
        backend.paths(),
        vec!["/characters".to_string(), "/admin/sync-pull".to_string()]
    );
    assert!(matches!(
        rx.try_recv(),
        Ok(anuario_tui::events::TuiEvent::Sync(anuario_tui::sync::SyncUpdate::LocalLoaded { .. }))
    ));
}

async fn slow_list() -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    Json(json!([]))
}

#[tokio::test]
async fn list_fetch_uses_its_own_timeout() {
    let base_url = serve(Router::new().route("/characters", get(slow_list))).await;

    let patient = RestClient::with_timeouts(&base_url, Duration::from_millis(100), Duration::from_secs(5)).unwrap();
    assert!(patient.fetch_characters(&Session::anonymous()).await.unwrap().is_empty());

    let impatient = RestClient::with_timeouts(&base_url, Duration::from_secs(5), Duration::from_millis(50)).unwrap();
    let err = impatient.fetch_characters(&Session::anonymous()).await.unwrap_err();
    assert!(err.is_network());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::with_timeouts(&format!("http://{}", addr), Duration::from_secs(2), Duration::from_secs(2)).unwrap();
    let err = client.trigger_pull(&Session::anonymous()).await.unwrap_err();
    assert!(err.is_network());
}
