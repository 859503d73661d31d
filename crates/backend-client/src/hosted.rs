//! REST client for the hosted auth + storage service.
//!
//! The service speaks two dialects under one base URL: token-based
//! auth at `/auth/v1` and table access at `/rest/v1` (PostgREST
//! conventions: `?column=eq.value` filters, `Prefer:
//! return=representation` on writes, `/rpc/<fn>` for stored
//! procedures). The signed-in session is persisted to disk so a later
//! run can restore it.

use std::path::PathBuf;

use async_trait::async_trait;
use picapica_booth_model::{
    AuthSession, AuthUser, GeneratedImageRecord, NewGeneratedImage, NewSession, ProfileFields,
    SessionRecord, UserProfile,
};
use picapica_common::config::BackendConfig;
use picapica_common::{BoothError, BoothResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::backend::BoothBackend;

pub struct HostedBackend {
    http: Client,
    base_url: String,
    api_key: String,
    session_file: PathBuf,
}

impl HostedBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            session_file: default_session_file(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> BoothResult<Self> {
        if !config.is_configured() {
            return Err(BoothError::config(
                "backend.base_url and backend.api_key must be set",
            ));
        }
        Ok(Self::new(config.base_url.clone(), config.api_key.clone()))
    }

    /// Override where the signed-in session is persisted.
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = path;
        self
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{endpoint}", self.base_url)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Bearer for table access: the user's token when signed in, the
    /// public key otherwise.
    fn bearer(&self) -> String {
        self.load_session()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.api_key.clone())
    }

    fn load_session(&self) -> Option<AuthSession> {
        let content = std::fs::read_to_string(&self.session_file).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn store_session(&self, session: &AuthSession) -> BoothResult<()> {
        if let Some(parent) = self.session_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.session_file, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    fn clear_session(&self) {
        if self.session_file.exists() {
            if let Err(e) = std::fs::remove_file(&self.session_file) {
                tracing::warn!(error = %e, "failed to remove persisted session");
            }
        }
    }

    async fn token_request(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        payload: serde_json::Value,
    ) -> BoothResult<AuthSession> {
        let res = self
            .http
            .post(self.auth_url(endpoint))
            .header("apikey", &self.api_key)
            .query(query)
            .json(&payload)
            .send()
            .await
            .map_err(http_err)?;
        let token: TokenResponse = expect_success(res).await?.json().await.map_err(http_err)?;

        let session = AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: AuthUser {
                id: token.user.id,
                email: token.user.email,
            },
        };
        self.store_session(&session)?;
        Ok(session)
    }

    async fn rest_list<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> BoothResult<Vec<T>> {
        let res = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer())
            .query(query)
            .send()
            .await
            .map_err(http_err)?;
        expect_success(res).await?.json().await.map_err(http_err)
    }

    async fn rest_insert<T: DeserializeOwned>(
        &self,
        table: &str,
        payload: &impl serde::Serialize,
    ) -> BoothResult<T> {
        let res = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer())
            .json(payload)
            .send()
            .await
            .map_err(http_err)?;
        let mut rows: Vec<T> = expect_success(res).await?.json().await.map_err(http_err)?;
        rows.pop()
            .ok_or_else(|| BoothError::backend(format!("insert into {table} returned no row")))
    }
}

#[async_trait]
impl BoothBackend for HostedBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: ProfileFields,
    ) -> BoothResult<AuthSession> {
        self.token_request(
            "signup",
            &[],
            serde_json::json!({
                "email": email,
                "password": password,
                "data": profile,
            }),
        )
        .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> BoothResult<AuthSession> {
        self.token_request(
            "token",
            &[("grant_type", "password")],
            serde_json::json!({
                "email": email,
                "password": password,
            }),
        )
        .await
    }

    async fn sign_out(&self) -> BoothResult<()> {
        if let Some(session) = self.load_session() {
            let res = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", &self.api_key)
                .bearer_auth(&session.access_token)
                .send()
                .await
                .map_err(http_err)?;
            expect_success(res).await?;
        }
        self.clear_session();
        Ok(())
    }

    async fn get_session(&self) -> BoothResult<Option<AuthSession>> {
        Ok(self.load_session())
    }

    async fn get_profile(&self, user_id: &str) -> BoothResult<UserProfile> {
        let filter = format!("eq.{user_id}");
        let rows: Vec<UserProfile> = self
            .rest_list("user_profiles", &[("id", filter.as_str()), ("select", "*")])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BoothError::backend(format!("no profile for user {user_id}")))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> BoothResult<UserProfile> {
        let filter = format!("eq.{user_id}");
        let res = self
            .http
            .patch(self.rest_url("user_profiles"))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer())
            .query(&[("id", filter.as_str())])
            .json(&fields)
            .send()
            .await
            .map_err(http_err)?;
        let mut rows: Vec<UserProfile> =
            expect_success(res).await?.json().await.map_err(http_err)?;
        rows.pop()
            .ok_or_else(|| BoothError::backend(format!("no profile for user {user_id}")))
    }

    async fn create_session(&self, new: NewSession) -> BoothResult<SessionRecord> {
        self.rest_insert("sessions", &new).await
    }

    async fn save_generated_image(
        &self,
        new: NewGeneratedImage,
    ) -> BoothResult<GeneratedImageRecord> {
        self.rest_insert("generated_images", &new).await
    }

    async fn update_image_download_count(&self, image_id: &str) -> BoothResult<()> {
        let res = self
            .http
            .post(self.rest_url("rpc/increment_download_count"))
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer())
            .json(&serde_json::json!({ "image_id": image_id }))
            .send()
            .await
            .map_err(http_err)?;
        expect_success(res).await?;
        Ok(())
    }

    async fn get_user_images(&self, user_id: &str) -> BoothResult<Vec<GeneratedImageRecord>> {
        let filter = format!("eq.{user_id}");
        self.rest_list(
            "generated_images",
            &[
                ("user_id", filter.as_str()),
                ("select", "*"),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    async fn get_user_sessions(&self, user_id: &str) -> BoothResult<Vec<SessionRecord>> {
        let filter = format!("eq.{user_id}");
        self.rest_list(
            "sessions",
            &[
                ("user_id", filter.as_str()),
                ("select", "*"),
                ("order", "created_at.desc"),
            ],
        )
        .await
    }

    async fn get_all_users(&self) -> BoothResult<Vec<UserProfile>> {
        self.rest_list(
            "user_profiles",
            &[("select", "*"), ("order", "created_at.desc")],
        )
        .await
    }

    async fn get_all_images(&self) -> BoothResult<Vec<GeneratedImageRecord>> {
        self.rest_list(
            "generated_images",
            &[("select", "*"), ("order", "created_at.desc")],
        )
        .await
    }

    async fn get_all_sessions(&self) -> BoothResult<Vec<SessionRecord>> {
        self.rest_list(
            "sessions",
            &[("select", "*"), ("order", "created_at.desc")],
        )
        .await
    }
}

fn http_err(e: reqwest::Error) -> BoothError {
    BoothError::backend(format!("http request failed: {e}"))
}

async fn expect_success(res: reqwest::Response) -> BoothResult<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        Ok(res)
    } else {
        let body = res.text().await.unwrap_or_default();
        Err(BoothError::backend(format!(
            "unexpected status {status}: {body}"
        )))
    }
}

/// Persisted session location (XDG state dir).
fn default_session_file() -> PathBuf {
    let base = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("state")
        });
    base.join("picapica").join("session.json")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_endpoint() {
        let config = BackendConfig::default();
        assert!(HostedBackend::from_config(&config).is_err());

        let config = BackendConfig {
            base_url: "https://booth.example.com".into(),
            api_key: "public-key".into(),
        };
        let backend = HostedBackend::from_config(&config).unwrap();
        assert_eq!(
            backend.auth_url("token"),
            "https://booth.example.com/auth/v1/token"
        );
        assert_eq!(
            backend.rest_url("sessions"),
            "https://booth.example.com/rest/v1/sessions"
        );
    }

    #[test]
    fn token_response_parses_minimal_payload() {
        let json = r#"{
            "access_token": "jwt",
            "user": { "id": "u1", "email": "ada@example.com" }
        }"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "jwt");
        assert_eq!(token.refresh_token, "");
        assert_eq!(token.user.id, "u1");
    }
}
