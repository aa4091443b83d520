//! Session holder: owns the authenticated identity and its bearer tokens.
//!
//! The holder is an explicit object shared by handle (`Arc`) with every
//! component that needs a token. Token changes (sign-in, refresh,
//! sign-out) are published on a [`watch`] channel; call
//! [`SessionHolder::subscribe`] to follow them.
//!
//! Session state survives restarts through a [`SessionStore`]. On
//! [`SessionHolder::restore`] an expired token is refreshed immediately;
//! if that fails the stored state is discarded.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use vidgen_core::auth::{validate_login, validate_registration, Registration};
use vidgen_core::types::Timestamp;

use crate::api::{AuthResponse, RegisterPayload, TokenResponse, UserProfile};
use crate::backend::AuthBackend;
use crate::error::ClientError;
use crate::store::{SessionStore, StoreError, TOKENS_KEY, USER_KEY};

/// Current bearer token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Absolute expiry of the access token.
    pub expires_at: Timestamp,
}

impl SessionCredential {
    /// Build a credential from a token response received at `now`.
    pub fn from_tokens(tokens: &TokenResponse, now: Timestamp) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_type: tokens.token_type.clone(),
            expires_at: now + chrono::Duration::seconds(tokens.expires_in.max(0)),
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

// Tokens never appear in logs.
impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Authenticated user plus credential.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserProfile,
    pub credential: SessionCredential,
}

pub struct SessionHolder {
    auth: Arc<dyn AuthBackend>,
    store: Arc<dyn SessionStore>,
    state: RwLock<Option<Session>>,
    token_tx: watch::Sender<Option<String>>,
}

impl SessionHolder {
    /// Create an unauthenticated holder without reading the store.
    pub fn new(auth: Arc<dyn AuthBackend>, store: Arc<dyn SessionStore>) -> Self {
        let (token_tx, _) = watch::channel(None);
        Self {
            auth,
            store,
            state: RwLock::new(None),
            token_tx,
        }
    }

    /// Create a holder and restore any persisted session.
    ///
    /// Missing entries leave the holder unauthenticated. Unreadable
    /// entries, or an expired token that cannot be refreshed, are
    /// discarded from the store.
    pub async fn restore(auth: Arc<dyn AuthBackend>, store: Arc<dyn SessionStore>) -> Self {
        let holder = Self::new(auth, store);
        holder.load_persisted().await;
        holder
    }

    /// Follow token changes. The current value is the latest token, or
    /// `None` while signed out.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token_tx.subscribe()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.state.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        validate_login(email, password)?;

        let response = self
            .auth
            .login(email.trim(), password)
            .await
            .map_err(|e| ClientError::from_api(e, ClientError::Auth, "Login failed"))?;

        self.establish(response).await
    }

    /// Create an account and sign in.
    ///
    /// Password length, confirmation and names are checked locally first;
    /// a failing form never reaches the backend.
    pub async fn register(&self, form: &Registration) -> Result<Session, ClientError> {
        validate_registration(form)?;

        let form = form.normalized();
        let payload = RegisterPayload {
            email: form.email,
            password: form.password,
            first_name: form.first_name,
            last_name: form.last_name,
        };

        let response = self
            .auth
            .register(&payload)
            .await
            .map_err(|e| ClientError::from_api(e, ClientError::Auth, "Registration failed"))?;

        self.establish(response).await
    }

    /// Forget the session and both persisted entries. Never fails.
    pub async fn logout(&self) {
        *self.state.write().await = None;
        self.clear_persisted().await;
        self.token_tx.send_replace(None);
        tracing::info!("Signed out");
    }

    /// Access token for the next request.
    ///
    /// An expired token triggers one refresh attempt; if it fails the
    /// holder signs out and returns `None`.
    pub async fn current_token(&self) -> Option<String> {
        {
            let state = self.state.read().await;
            match state.as_ref() {
                None => return None,
                Some(session) if !session.credential.is_expired(Utc::now()) => {
                    return Some(session.credential.access_token.clone());
                }
                Some(_) => {}
            }
        }

        if self.refresh_locked(false).await {
            self.state
                .read()
                .await
                .as_ref()
                .map(|s| s.credential.access_token.clone())
        } else {
            None
        }
    }

    /// Exchange the refresh token for a new token set.
    ///
    /// Returns `false` (and signs out) if the exchange fails, or if there
    /// is no session.
    pub async fn refresh(&self) -> bool {
        self.refresh_locked(true).await
    }

    // ---- private helpers ----

    /// Refresh under the write lock. Unless `force` is set, a token that
    /// another caller already refreshed is kept as is.
    async fn refresh_locked(&self, force: bool) -> bool {
        let mut state = self.state.write().await;
        let refresh_token = match state.as_ref() {
            None => return false,
            Some(session) if !force && !session.credential.is_expired(Utc::now()) => return true,
            Some(session) => session.credential.refresh_token.clone(),
        };

        match self.exchange_refresh(&refresh_token).await {
            Ok(credential) => {
                if let Err(e) = self.persist_credential(&credential).await {
                    tracing::warn!(error = %e, "Failed to persist refreshed tokens");
                }
                let token = credential.access_token.clone();
                if let Some(session) = state.as_mut() {
                    session.credential = credential;
                }
                self.token_tx.send_replace(Some(token));
                tracing::debug!("Access token refreshed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, signing out");
                *state = None;
                drop(state);
                self.clear_persisted().await;
                self.token_tx.send_replace(None);
                false
            }
        }
    }

    async fn exchange_refresh(&self, refresh_token: &str) -> Result<SessionCredential, ClientError> {
        let tokens = self
            .auth
            .refresh(refresh_token)
            .await
            .map_err(|e| ClientError::from_api(e, ClientError::Auth, "Token refresh failed"))?;
        Ok(SessionCredential::from_tokens(&tokens, Utc::now()))
    }

    async fn establish(&self, response: AuthResponse) -> Result<Session, ClientError> {
        let session = Session {
            credential: SessionCredential::from_tokens(&response.tokens, Utc::now()),
            user: response.user,
        };

        // Both entries or neither.
        if let Err(e) = self.persist_session(&session).await {
            self.clear_persisted().await;
            return Err(e.into());
        }

        *self.state.write().await = Some(session.clone());
        self.token_tx
            .send_replace(Some(session.credential.access_token.clone()));

        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn persist_session(&self, session: &Session) -> Result<(), StoreError> {
        self.persist_credential(&session.credential).await?;
        let user_json = serde_json::to_string(&session.user)?;
        self.store.save(USER_KEY, &user_json).await
    }

    async fn persist_credential(&self, credential: &SessionCredential) -> Result<(), StoreError> {
        let json = serde_json::to_string(credential)?;
        self.store.save(TOKENS_KEY, &json).await
    }

    async fn clear_persisted(&self) {
        for key in [TOKENS_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!(key, error = %e, "Failed to remove persisted session entry");
            }
        }
    }

    async fn load_persisted(&self) {
        let tokens = self.store.load(TOKENS_KEY).await;
        let user = self.store.load(USER_KEY).await;

        let (tokens, user) = match (tokens, user) {
            (Ok(Some(tokens)), Ok(Some(user))) => (tokens, user),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Failed to read persisted session");
                return;
            }
            _ => return,
        };

        let parsed = serde_json::from_str::<SessionCredential>(&tokens).and_then(|credential| {
            serde_json::from_str::<UserProfile>(&user).map(|user| (credential, user))
        });
        let (credential, user) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted session");
                self.clear_persisted().await;
                return;
            }
        };

        if !credential.is_expired(Utc::now()) {
            let token = credential.access_token.clone();
            *self.state.write().await = Some(Session { user, credential });
            self.token_tx.send_replace(Some(token));
            tracing::info!("Restored persisted session");
            return;
        }

        match self.exchange_refresh(&credential.refresh_token).await {
            Ok(credential) => {
                if let Err(e) = self.persist_credential(&credential).await {
                    tracing::warn!(error = %e, "Failed to persist refreshed tokens");
                }
                let token = credential.access_token.clone();
                *self.state.write().await = Some(Session { user, credential });
                self.token_tx.send_replace(Some(token));
                tracing::info!("Restored persisted session after token refresh");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session expired and could not be refreshed");
                self.clear_persisted().await;
            }
        }
    }
}
