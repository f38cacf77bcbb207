use serde_json::Value;
use shared::client::{AuthUser, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

use crate::auth::{AuthStore, StoredAuth};
use crate::http::{HttpClient, NetworkHttpClient};
use crate::{ClientError, ClientResult};

/// `/api/auth` endpoints; keeps the [`AuthStore`] in sync with the server
#[derive(Debug, Clone)]
pub struct AuthApi<C = NetworkHttpClient> {
    http: C,
    auth: AuthStore,
}

impl<C: HttpClient> AuthApi<C> {
    pub fn new(http: C, auth: AuthStore) -> Self {
        Self { http, auth }
    }

    /// Log in and persist the returned tokens
    pub async fn login(&self, req: &LoginRequest) -> ClientResult<AuthUser> {
        let resp: LoginResponse = self
            .http
            .post("/api/auth/login", req)
            .await
            .inspect_err(|e| tracing::warn!(username = %req.username, error = %e, "Login failed"))?;
        let stored = StoredAuth::from(resp);
        let user = stored.user.clone();
        self.auth.set(stored)?;
        Ok(user)
    }

    /// Explicitly refresh the access token; returns the new token
    pub async fn refresh(&self) -> ClientResult<String> {
        let refresh_token = self.auth.refresh_token().ok_or(ClientError::Unauthorized)?;
        let resp: RefreshResponse = self
            .http
            .post("/api/auth/refresh", &RefreshRequest { refresh_token })
            .await?;
        self.auth.update_access_token(resp.access_token.clone())?;
        Ok(resp.access_token)
    }

    /// Revoke the refresh token server-side and forget the local auth.
    ///
    /// The local auth is cleared even when the server call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Some(refresh_token) = self.auth.refresh_token() {
            let result = self
                .http
                .post::<Value, _>("/api/auth/logout", &RefreshRequest { refresh_token })
                .await;
            if let Err(e) = result {
                tracing::warn!(error = %e, "Server-side logout failed");
            }
        }
        self.auth.clear()?;
        Ok(())
    }

    pub fn store(&self) -> &AuthStore {
        &self.auth
    }
}
