//! API client layer for the character backend REST API.

use crate::config::TuiConfig;
use crate::session::Session;
use anuario_core::{Character, CharacterPayload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
    /// Local file access, such as reading an image to upload.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiClientError {
    /// Connection, timeout, or transport failure. `Io` is local and never counts.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(err) if !err.is_decode())
    }

    pub fn is_auth(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Status { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }

    pub fn is_decode(&self) -> bool {
        match self {
            Self::Decode(_) | Self::InvalidResponse(_) => true,
            Self::Http(err) => err.is_decode(),
            _ => false,
        }
    }
}

/// Background image-cache progress reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSyncStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub errors: u64,
}

/// Read side of the backend used by the synchronization flow.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_characters(&self, session: &Session) -> Result<Vec<Character>, ApiClientError>;

    /// Ask the backend to pull from its upstream source.
    async fn trigger_pull(&self, session: &Session) -> Result<(), ApiClientError>;

    async fn image_sync_status(&self, session: &Session) -> Result<ImageSyncStatus, ApiClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FavoriteResponse {
    is_favorite: Option<bool>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    master_password: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FavoriteRequest {
    is_favorite: bool,
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    list_timeout: Duration,
}

impl RestClient {
    pub fn new(config: &TuiConfig) -> Result<Self, ApiClientError> {
        Self::with_timeouts(&config.api_base_url, config.request_timeout(), config.list_timeout())
    }

    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        list_timeout: Duration,
    ) -> Result<Self, ApiClientError> {
        if base_url.trim().is_empty() {
            return Err(ApiClientError::Config("base url must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            list_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------------

    pub async fn fetch_characters(&self, session: &Session) -> Result<Vec<Character>, ApiClientError> {
        let response = self
            .request(Method::GET, "/characters", session)
            .timeout(self.list_timeout)
            .send()
            .await?;
        let values: Vec<serde_json::Value> = self.parse_response(response).await?;
        let (characters, skipped) = Character::from_json_array(&values);
        if skipped > 0 {
            tracing::warn!(skipped, "Skipped non-object elements in character list");
        }
        tracing::debug!(count = characters.len(), "Fetched characters");
        Ok(characters)
    }

    /// Create a character. Returns the id assigned by the backend, when it
    /// reports one.
    pub async fn create_character(
        &self,
        session: &Session,
        payload: &CharacterPayload,
    ) -> Result<Option<String>, ApiClientError> {
        require_session(session)?;
        let response = self
            .request(Method::POST, "/characters", session)
            .json(payload)
            .send()
            .await?;
        let body: serde_json::Value = self.parse_response(response).await?;
        let id = match body.get("id") {
            Some(serde_json::Value::String(id)) => Some(id.clone()),
            Some(serde_json::Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        tracing::info!(id = ?id, "Character created");
        Ok(id)
    }

    pub async fn update_character(
        &self,
        session: &Session,
        id: &str,
        payload: &CharacterPayload,
    ) -> Result<(), ApiClientError> {
        require_session(session)?;
        let path = format!("/characters/{}", id);
        let response = self
            .request(Method::PUT, &path, session)
            .json(payload)
            .send()
            .await?;
        self.expect_success(response).await?;
        tracing::info!(id, "Character updated");
        Ok(())
    }

    pub async fn delete_character(&self, session: &Session, id: &str) -> Result<(), ApiClientError> {
        require_session(session)?;
        let path = format!("/characters/{}", id);
        let response = self.request(Method::DELETE, &path, session).send().await?;
        self.expect_success(response).await?;
        tracing::info!(id, "Character deleted");
        Ok(())
    }

    /// Toggle (or set, when `desired` is given) the favorite flag.
    ///
    /// Returns the flag reported by the backend, if any.
    pub async fn toggle_favorite(
        &self,
        session: &Session,
        id: &str,
        desired: Option<bool>,
    ) -> Result<Option<bool>, ApiClientError> {
        let path = format!("/characters/{}/favorite", id);
        let mut request = self.request(Method::POST, &path, session);
        if let Some(is_favorite) = desired {
            request = request.json(&FavoriteRequest { is_favorite });
        }
        let response = request.send().await?;
        let body: FavoriteResponse = self.parse_response(response).await?;
        Ok(body.is_favorite)
    }

    /// Upload an image using multipart/form-data.
    pub async fn upload_image(
        &self,
        session: &Session,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ApiClientError> {
        require_session(session)?;
        let path = format!("/characters/{}/upload-image", id);
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("image", part);
        let response = self
            .request(Method::POST, &path, session)
            .multipart(form)
            .send()
            .await?;
        self.expect_success(response).await?;
        tracing::info!(id, file_name, "Image uploaded");
        Ok(())
    }

    pub async fn upload_image_file(
        &self,
        session: &Session,
        id: &str,
        path: &std::path::Path,
    ) -> Result<(), ApiClientError> {
        require_session(session)?;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.upload_image(session, id, &file_name, bytes).await
    }

    // ------------------------------------------------------------------------
    // Admin / sync endpoints (POST)
    // ------------------------------------------------------------------------

    pub async fn trigger_pull(&self, session: &Session) -> Result<(), ApiClientError> {
        self.post_without_body("/admin/sync-pull", session).await
    }

    /// Ask the backend to push its local data upstream.
    pub async fn trigger_push(&self, session: &Session) -> Result<(), ApiClientError> {
        self.post_without_body("/admin/sync-mysql", session).await
    }

    /// Push then pull. Both are attempted; the first failure is returned.
    pub async fn full_sync(&self, session: &Session) -> Result<(), ApiClientError> {
        let push = self.trigger_push(session).await;
        tracing::info!(ok = push.is_ok(), "Push finished");
        let pull = self.trigger_pull(session).await;
        tracing::info!(ok = pull.is_ok(), "Pull finished");
        push.and(pull)
    }

    pub async fn image_sync_status(&self, session: &Session) -> Result<ImageSyncStatus, ApiClientError> {
        let response = self
            .request(Method::GET, "/admin/sync-images/status", session)
            .send()
            .await?;
        self.parse_response(response).await
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    /// Log in and return the new session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiClientError> {
        let body = Credentials {
            username,
            password,
            master_password: None,
        };
        let response = self
            .request(Method::POST, "/auth/login", &Session::anonymous())
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = self.parse_response(response).await?;
        let token = login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiClientError::InvalidResponse("login response has no token".to_string()))?;
        let session = Session::new(token, Some(login.username.unwrap_or_else(|| username.to_string())));
        tracing::info!(token = %session.redacted(), username, "Logged in");
        Ok(session)
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        master_password: &str,
    ) -> Result<(), ApiClientError> {
        let body = Credentials {
            username,
            password,
            master_password: Some(master_password),
        };
        let response = self
            .request(Method::POST, "/auth/register", &Session::anonymous())
            .json(&body)
            .send()
            .await?;
        self.expect_success(response).await
    }

    /// Invalidate the token on the backend. The caller clears its session.
    pub async fn logout(&self, session: &Session) -> Result<(), ApiClientError> {
        require_session(session)?;
        let response = self.request(Method::POST, "/auth/logout", session).send().await?;
        self.expect_success(response).await
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match session.token() {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }

    async fn post_without_body(&self, path: &str, session: &Session) -> Result<(), ApiClientError> {
        let response = self.request(Method::POST, path, session).send().await?;
        self.expect_success(response).await.map_err(|err| {
            tracing::warn!(path, error = %err, "Sync request failed");
            err
        })
    }

    async fn expect_success(&self, response: reqwest::Response) -> Result<(), ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.status_error(status, response).await)
        }
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice::<T>(&bytes)?)
        } else {
            Err(self.status_error(status, response).await)
        }
    }

    async fn status_error(&self, status: StatusCode, response: reqwest::Response) -> ApiClientError {
        let text = response.text().await.unwrap_or_default();
        let body = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(err) => err.error,
            Err(_) => text,
        };
        ApiClientError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

fn require_session(session: &Session) -> Result<(), ApiClientError> {
    if session.is_logged_in() {
        Ok(())
    } else {
        tracing::warn!("Write attempted without a session");
        Err(ApiClientError::NotLoggedIn)
    }
}

#[async_trait]
impl CatalogSource for RestClient {
    async fn fetch_characters(&self, session: &Session) -> Result<Vec<Character>, ApiClientError> {
        RestClient::fetch_characters(self, session).await
    }

    async fn trigger_pull(&self, session: &Session) -> Result<(), ApiClientError> {
        RestClient::trigger_pull(self, session).await
    }

    async fn image_sync_status(&self, session: &Session) -> Result<ImageSyncStatus, ApiClientError> {
        RestClient::image_sync_status(self, session).await
    }
}
