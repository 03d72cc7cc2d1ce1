//! Identity Toolkit REST adapter (e-mail/password accounts).
//!
//! Uses `accounts:signInWithPassword` and `accounts:signUp`. Sign-out is
//! local: the ID token is dropped and observers see `None`.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::provider::IdentityProvider;
use super::{AuthFault, Credentials, Session};
use crate::config::IdentityConfig;

/// [`IdentityProvider`] over the Identity Toolkit REST API.
pub struct IdentityToolkitProvider {
    client: Client,
    base_url: String,
    api_key: String,
    /// ID token of the signed-in account. Never logged.
    id_token: Mutex<Option<String>>,
    session_tx: watch::Sender<Option<Session>>,
}

impl std::fmt::Debug for IdentityToolkitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitProvider")
            .field("base_url", &self.base_url)
            .field("session", &*self.session_tx.borrow())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityToolkitProvider {
    /// Build from config. Returns `None` when no identity API key is set.
    pub fn from_config(config: &IdentityConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self::new(&config.base_url, api_key))
    }

    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        let (session_tx, _rx) = watch::channel(None);
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            id_token: Mutex::new(None),
            session_tx,
        }
    }

    /// ID token for calling other authenticated APIs, while signed in.
    pub fn id_token(&self) -> Option<String> {
        self.id_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn password_call(
        &self,
        endpoint: &str,
        credentials: &Credentials,
    ) -> Result<Session, AuthFault> {
        let url = format!("{}/accounts:{endpoint}", self.base_url);
        let body = PasswordRequest {
            email: credentials.email.trim(),
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint, error = %e, "identity request failed");
                AuthFault::Unknown
            })?;

        let status = response.status();
        if !status.is_success() {
            let fault = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => AuthFault::from_code(&envelope.error.message),
                Err(_) => AuthFault::Unknown,
            };
            warn!(endpoint, status = status.as_u16(), fault = ?fault, "authentication rejected");
            return Err(fault);
        }

        let account: AccountResponse = response.json().await.map_err(|e| {
            warn!(endpoint, error = %e, "unreadable identity response");
            AuthFault::Unknown
        })?;

        let session = Session {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|n| !n.is_empty()),
        };
        *self.id_token.lock().unwrap_or_else(PoisonError::into_inner) = Some(account.id_token);
        self.session_tx.send_replace(Some(session.clone()));
        debug!(endpoint, uid = %session.uid, "authenticated");
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthFault> {
        self.password_call("signInWithPassword", credentials).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Session, AuthFault> {
        self.password_call("signUp", credentials).await
    }

    async fn sign_out(&self) -> Result<(), AuthFault> {
        self.id_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.session_tx.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session_tx.subscribe()
    }
}
