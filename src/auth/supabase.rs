use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::json;

use super::{AuthError, AuthProvider};
use crate::models::{AuthUser, Session};

/// REST client for the hosted auth service (`/auth/v1`).
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuth {
    pub fn new(http: Client, project_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: format!("{}/auth/v1", project_url.trim_end_matches('/')),
            api_key,
        }
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/token?grant_type={}", self.base_url, grant_type);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let session: Session = check_status(resp).await?.json().await?;
        Ok(session)
    }
}

/// 400/401/403/404 from the auth endpoints mean bad credentials or a dead token.
async fn check_status(resp: Response) -> Result<Response, AuthError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::UNAUTHORIZED
        | StatusCode::FORBIDDEN
        | StatusCode::NOT_FOUND => Err(AuthError::InvalidCredentials),
        _ => {
            let body = resp.text().await.unwrap_or_default();
            Err(AuthError::Provider(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuth {
    async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/user", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: AuthUser = check_status(resp).await?.json().await?;
        Ok(user)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/logout", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(resp).await?;
        Ok(())
    }
}
