//! HTTP plumbing shared by every resource: bearer authentication, error
//! mapping, and the single-flight refresh-and-retry on 401.

use crate::domain::model::TokenPair;
use crate::domain::photo::PhotoEvidence;
use crate::domain::ports::{ConfigProvider, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::utils::error::{ClientError, Result};
use reqwest::{multipart, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const MAX_ERROR_BODY_CHARS: usize = 200;

pub(crate) enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartBody),
}

/// Multipart payload kept as plain data so it can be rebuilt for a retry;
/// `reqwest::multipart::Form` is consumed on send.
#[derive(Debug, Default)]
pub(crate) struct MultipartBody {
    fields: Vec<(String, String)>,
    file: Option<(String, PhotoEvidence)>,
}

impl MultipartBody {
    pub(crate) fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub(crate) fn photo(mut self, name: &str, photo: PhotoEvidence) -> Self {
        self.file = Some((name.to_string(), photo));
        self
    }

    fn to_form(&self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        if let Some((name, photo)) = &self.file {
            let part = multipart::Part::bytes(photo.bytes.clone())
                .file_name(photo.file_name.clone())
                .mime_str(photo.content_type)?;
            form = form.part(name.clone(), part);
        }
        Ok(form)
    }
}

pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Body,
    authenticated: bool,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            authenticated: true,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub(crate) fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Body::Multipart(body);
        self
    }

    pub(crate) fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Sent without a bearer token; a 401 is returned to the caller as-is.
    pub(crate) fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Client for the time tracking REST API. Cheap to share behind an `Arc`;
/// concurrent calls coordinate token refreshes through one guard.
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    refresh_lock: Mutex<()>,
    refresh_calls: AtomicU64,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
            store,
            refresh_lock: Mutex::new(()),
            refresh_calls: AtomicU64::new(0),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Number of refresh calls this client has sent to the server.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.store.get(ACCESS_TOKEN_KEY).await?.is_some())
    }

    /// Exchange the stored refresh token for a new pair. Clears stored
    /// credentials if the exchange fails.
    pub async fn refresh_session(&self) -> Result<TokenPair> {
        let _guard = self.refresh_lock.lock().await;
        match self.perform_refresh().await {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                warn!("Token refresh failed: {}", e);
                self.store.clear_tokens().await?;
                Err(e)
            }
        }
    }

    pub(crate) async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.dispatch(&request).await?;
        decode(response).await
    }

    /// Like `execute`, for endpoints whose response body carries nothing the
    /// caller needs.
    pub(crate) async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(&request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_once(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        let url = self.url(&request.path);
        debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(body) => builder.multipart(body.to_form()?),
        };

        let response = builder.send().await?;
        debug!("{} {} -> {}", request.method, url, response.status());
        Ok(response)
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Response> {
        let token = if request.authenticated {
            self.store.get(ACCESS_TOKEN_KEY).await?
        } else {
            None
        };

        let response = self.send_once(request, token.as_deref()).await?;
        if !request.authenticated || response.status() != StatusCode::UNAUTHORIZED {
            return ensure_success(response).await;
        }

        let original = error_from_response(response).await;
        match self.refresh_after_rejection(token.as_deref()).await? {
            Some(fresh) => {
                debug!("Retrying {} with refreshed token", request.path);
                let retried = self.send_once(request, Some(&fresh)).await?;
                ensure_success(retried).await
            }
            None => Err(original),
        }
    }

    /// Returns the token to retry with, or `None` when the caller should
    /// surface the original 401. Only the first caller rejected with the
    /// current token hits the refresh endpoint; the rest queue on the guard
    /// and pick up its result.
    async fn refresh_after_rejection(&self, rejected: Option<&str>) -> Result<Option<String>> {
        let _guard = self.refresh_lock.lock().await;

        match self.store.get(ACCESS_TOKEN_KEY).await? {
            None => {
                debug!("No stored credentials, not refreshing");
                return Ok(None);
            }
            Some(current) if Some(current.as_str()) != rejected => {
                debug!("Token was refreshed by a concurrent request");
                return Ok(Some(current));
            }
            Some(_) => {}
        }

        match self.perform_refresh().await {
            Ok(tokens) => Ok(Some(tokens.access_token)),
            Err(e) => {
                warn!("Token refresh failed, clearing stored credentials: {}", e);
                self.store.clear_tokens().await?;
                Ok(None)
            }
        }
    }

    // Caller must hold `refresh_lock`.
    async fn perform_refresh(&self) -> Result<TokenPair> {
        let refresh_token = self
            .store
            .get(REFRESH_TOKEN_KEY)
            .await?
            .ok_or(ClientError::NotAuthenticated)?;

        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let request = ApiRequest::post("auth/refresh")
            .anonymous()
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })?;
        let response = ensure_success(self.send_once(&request, None).await?).await?;
        let refreshed: RefreshResponse = decode(response).await?;

        let tokens = TokenPair {
            access_token: refreshed.access_token,
            refresh_token: refreshed.refresh_token.unwrap_or(refresh_token),
        };
        self.store.save_tokens(&tokens).await?;
        info!("Access token refreshed");
        Ok(tokens)
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    if status == StatusCode::UNAUTHORIZED {
        ClientError::Unauthorized { message }
    } else {
        ClientError::ApiError {
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull the human readable message out of an error body.
fn extract_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error", "detail"].iter().find_map(|key| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(|message| message.to_string())
        }),
        Err(_) => Some(trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()),
    }
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` work for
/// 204 responses.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_message_fields_in_order() {
        assert_eq!(
            extract_message(r#"{"message":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            extract_message(r#"{"error":"Forbidden","detail":"nope"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(
            extract_message(r#"{"detail":"Not found"}"#).as_deref(),
            Some("Not found")
        );
    }

    #[test]
    fn falls_back_to_plain_text_bodies() {
        assert_eq!(
            extract_message("Bad Gateway\n").as_deref(),
            Some("Bad Gateway")
        );
        assert!(extract_message("   ").is_none());
        assert!(extract_message(r#"{"code":42}"#).is_none());
    }

    #[test]
    fn multipart_body_keeps_fields_for_rebuild() {
        let photo = PhotoEvidence::from_bytes("in.jpg", vec![1, 2, 3]).unwrap();
        let body = MultipartBody::default()
            .text("latitude", -33.45)
            .text("longitude", -70.66)
            .photo("photo", photo);

        assert_eq!(body.fields.len(), 2);
        assert_eq!(body.fields[0], ("latitude".to_string(), "-33.45".to_string()));
        assert!(body.to_form().is_ok());
        assert!(body.to_form().is_ok());
    }
}
