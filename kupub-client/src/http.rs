//! HTTP transport
//!
//! Every backend response is a `{data, error}` envelope. [`HttpClient`]
//! methods return the unwrapped `data` or a [`ClientError`].
//!
//! [`NetworkHttpClient`] attaches the admin bearer token to every request
//! outside `/api/auth`. A 401 on an authenticated request triggers exactly
//! one token refresh and one retry; if the refresh fails the stored auth is
//! cleared and [`ClientError::Unauthorized`] is returned.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::client::{RefreshRequest, RefreshResponse};
use shared::error::ApiResponse;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::AuthStore;
use crate::{ClientConfig, ClientError, ClientResult};

/// Paths under this prefix never carry a bearer token
const AUTH_PATH_PREFIX: &str = "/api/auth";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// HTTP client trait
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn post<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn post_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn patch<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn patch_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
    async fn put<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T>;
    async fn delete<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T>;
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    auth: AuthStore,
    /// Serializes refreshes so concurrent 401s share one refresh call
    refresh_lock: Arc<Mutex<()>>,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig, auth: AuthStore) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            auth,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}{}", self.base_url, path)
    }

    fn should_skip_auth(path: &str) -> bool {
        let path = match path.find("://") {
            // absolute URL: compare the path component only
            Some(idx) => {
                let rest = &path[idx + 3..];
                rest.find('/').map_or("/", |p| &rest[p..])
            }
            None => path,
        };
        path.starts_with(AUTH_PATH_PREFIX)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let mut req = self.client.request(method, self.resolve_url(path));
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let token = if Self::should_skip_auth(path) {
            None
        } else {
            self.auth.access_token()
        };

        let response = self
            .send(method.clone(), path, body.as_ref(), token.as_deref())
            .await
            .inspect_err(|e| tracing::warn!(%method, path, error = %e, "Request failed"))?;

        if response.status() == StatusCode::UNAUTHORIZED
            && let Some(rejected) = token
        {
            tracing::info!(path, "Access token rejected, refreshing");
            let Some(next) = self.refresh_access_token(&rejected).await else {
                return Err(ClientError::Unauthorized);
            };
            let retried = self
                .send(method, path, body.as_ref(), Some(&next))
                .await?;
            return decode_envelope(retried).await;
        }

        decode_envelope(response).await
    }

    /// Obtain a fresh access token, or `None` after clearing the stored auth.
    async fn refresh_access_token(&self, rejected: &str) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;

        // Another request refreshed while we waited
        if let Some(current) = self.auth.access_token()
            && current != rejected
        {
            return Some(current);
        }

        let Some(refresh_token) = self.auth.refresh_token() else {
            self.drop_auth();
            return None;
        };

        match self.request_refresh(refresh_token).await {
            Ok(RefreshResponse { access_token }) if !access_token.is_empty() => {
                if let Err(e) = self.auth.update_access_token(access_token.clone()) {
                    tracing::warn!(error = %e, "Failed to persist refreshed token");
                }
                tracing::info!("Access token refreshed");
                Some(access_token)
            }
            Ok(_) => {
                tracing::warn!("Refresh returned an empty token");
                self.drop_auth();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh access token");
                self.drop_auth();
                None
            }
        }
    }

    async fn request_refresh(&self, refresh_token: String) -> ClientResult<RefreshResponse> {
        let response = self
            .client
            .post(self.resolve_url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        decode_envelope(response).await
    }

    fn drop_auth(&self) {
        if let Err(e) = self.auth.clear() {
            tracing::warn!(error = %e, "Failed to clear stored auth");
        }
    }
}

/// Decode the `{data, error}` envelope of a response
async fn decode_envelope<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if text.trim().is_empty() {
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        return Err(ClientError::EmptyResponse);
    }

    let envelope: ApiResponse<Value> = match serde_json::from_str(&text) {
        Ok(envelope) => envelope,
        Err(_) if status == StatusCode::UNAUTHORIZED => return Err(ClientError::Unauthorized),
        Err(e) => {
            return Err(ClientError::InvalidResponse(format!(
                "HTTP {status}: not a JSON envelope ({e})"
            )));
        }
    };

    if let Some(err) = envelope.error {
        tracing::debug!(%status, code = %err.code, "API error");
        return Err(err.into());
    }

    match envelope.data {
        Some(data) => Ok(serde_json::from_value(data)?),
        // `data: null` is fine for targets that accept null (unit, Option)
        None => serde_json::from_value(Value::Null).map_err(|_| ClientError::EmptyResponse),
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn get<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::POST, path, None).await
    }

    async fn patch<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PATCH, path, Some(body)).await
    }

    async fn patch_empty<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::PATCH, path, None).await
    }

    async fn put<T: DeserializeOwned + Send, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PUT, path, Some(body)).await
    }

    async fn delete<T: DeserializeOwned + Send>(&self, path: &str) -> ClientResult<T> {
        self.execute(Method::DELETE, path, None).await
    }
}
