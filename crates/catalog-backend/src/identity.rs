use async_trait::async_trait;
use catalog_models::AuthUser;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::BackendError;
use crate::traits::{AuthProvider, Session};

const API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

/// REST client for the identity provider's accounts API.
pub struct IdentityClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    local_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: String,
    email: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
}

impl IdentityClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: API_BASE.to_string(),
        }
    }

    async fn post<T>(&self, operation: &str, body: &serde_json::Value) -> Result<T, BackendError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!(
            "{}/accounts:{}?key={}",
            self.base_url, operation, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(text);
            return Err(BackendError::Status { status, message });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn session_from(token: TokenResponse, is_anonymous: bool) -> Result<Session, BackendError> {
        let expires_in: i64 = token
            .expires_in
            .parse()
            .map_err(|_| BackendError::Decode(format!("bad expiresIn: {}", token.expires_in)))?;

        Ok(Session {
            user: AuthUser {
                uid: token.local_id,
                email: token.email,
                display_name: token.display_name,
                avatar_url: None,
                is_anonymous,
            },
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let token: TokenResponse = self
            .post(
                "signInWithPassword",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true
                }),
            )
            .await?;

        let session = Self::session_from(token, false)?;
        info!("signed in as {}", session.user.uid);
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session, BackendError> {
        let token: TokenResponse = self
            .post(
                "signUp",
                &json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true
                }),
            )
            .await?;
        let mut session = Self::session_from(token, false)?;

        // The account exists without a name yet; attach it in a second call.
        let _: serde_json::Value = self
            .post(
                "update",
                &json!({
                    "idToken": session.id_token,
                    "displayName": display_name,
                    "returnSecureToken": false
                }),
            )
            .await?;
        session.user.display_name = Some(display_name.to_string());

        info!("created account {}", session.user.uid);
        Ok(session)
    }

    async fn sign_in_anonymously(&self) -> Result<Session, BackendError> {
        let token: TokenResponse = self
            .post("signUp", &json!({ "returnSecureToken": true }))
            .await?;
        let session = Self::session_from(token, true)?;
        info!("signed in anonymously as {}", session.user.uid);
        Ok(session)
    }

    async fn sign_out(&self, _id_token: &str) -> Result<(), BackendError> {
        // Token-based sessions have no server-side state to tear down; the
        // caller discards the stored session.
        debug!("sign-out: discarding session client-side");
        Ok(())
    }

    async fn current_user(&self, id_token: &str) -> Result<AuthUser, BackendError> {
        let lookup: LookupResponse = self.post("lookup", &json!({ "idToken": id_token })).await?;

        let user = lookup
            .users
            .into_iter()
            .next()
            .ok_or(BackendError::NotAuthenticated)?;

        Ok(AuthUser {
            uid: user.local_id,
            is_anonymous: user.email.is_none(),
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.photo_url,
        })
    }
}
