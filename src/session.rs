// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated-session lifecycle.
//!
//! [`SessionManager`] owns the in-memory view of who is signed in. It:
//! - derives the session from the persisted token at boot
//!   (local expiry check, then a profile fetch)
//! - drives login, logout and profile updates
//! - hands the current token to every authorized request at call time
//! - announces sign-in/sign-out as [`SessionEvent`]s so the view layer can
//!   navigate without the session knowing about views
//!
//! Concurrent operations are not serialized: whichever response resolves
//! last determines the state.

use crate::config::Config;
use crate::error::{ApiError, Result, SessionError};
use crate::http::{ApiClient, ApiRequest, ClientConfig};
use crate::models::auth::{MessageResponse, PasswordChangeBody, ResetPasswordRequest};
use crate::models::{Envelope, LoginRequest, LoginResponse, PasswordChange, ProfileUpdate, UserProfile};
use crate::store::{CredentialStore, FileCredentialStore};
use crate::time_utils::{Clock, SystemClock};
use crate::token;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 32;

/// Snapshot of the session as the rest of the app sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub is_loading: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_admin: false,
            is_loading: false,
        }
    }
}

/// Where the session lifecycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Validating the persisted token at startup.
    Booting,
    Anonymous,
    /// At least one login request is in flight.
    Authenticating,
    Authenticated,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    UserRequested,
    /// The persisted token was past its expiry (or unreadable) at boot.
    Expired,
    /// The backend answered 401 to an authorized request.
    Unauthorized,
    /// The boot-time profile fetch failed.
    ValidationFailed,
}

/// Notifications for the view layer. `SignedOut` means "show the login view".
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn { user: UserProfile },
    SignedOut { reason: SignOutReason },
    ProfileUpdated { user: UserProfile },
}

#[derive(Debug)]
struct State {
    booting: bool,
    logins_in_flight: usize,
    /// Bumped by every login, logout and invalidation. Boot applies its
    /// outcome only if nothing else changed the session meanwhile.
    generation: u64,
    token: Option<String>,
    user: Option<UserProfile>,
}

impl State {
    fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    fn sign_out(&mut self) {
        self.token = None;
        self.user = None;
        self.generation += 1;
    }
}

struct Inner {
    api: ApiClient,
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    state: RwLock<State>,
    events: broadcast::Sender<SessionEvent>,
}

/// Owner of the authentication state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    /// Create a manager in the `Booting` phase. Call [`SessionManager::boot`] next.
    ///
    /// `store` must be the same store the `api` client was built with.
    pub fn new(api: ApiClient, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_clock(api, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        api: ApiClient,
        store: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                clock,
                state: RwLock::new(State {
                    booting: true,
                    logins_in_flight: 0,
                    generation: 0,
                    token: None,
                    user: None,
                }),
                events,
            }),
        }
    }

    /// Wire up the file-backed store and HTTP client described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn CredentialStore> =
            Arc::new(FileCredentialStore::new(config.token_file.clone()));
        let api = ApiClient::new(ClientConfig::from(config), store.clone())?;
        Ok(Self::new(api, store))
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> Session {
        let state = self.read();
        let is_authenticated = state.is_authenticated();
        let user = if is_authenticated {
            state.user.clone()
        } else {
            None
        };
        Session {
            is_admin: user.as_ref().is_some_and(UserProfile::is_admin),
            user,
            is_authenticated,
            is_loading: state.booting || state.logins_in_flight > 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        let state = self.read();
        if state.booting {
            SessionPhase::Booting
        } else if state.logins_in_flight > 0 {
            SessionPhase::Authenticating
        } else if state.is_authenticated() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.snapshot().user
    }

    /// Expiry of the current session's token, when it carries one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let token = self.authenticated_token()?;
        token::decode_claims(&token).ok()?.expires_at()
    }

    fn current_token(&self) -> Option<String> {
        self.read().token.clone()
    }

    // ─── Boot ────────────────────────────────────────────────────────────────

    /// Derive the session from the persisted token.
    ///
    /// Never fails: any problem with the stored token or the profile fetch
    /// resolves to an anonymous session and clears the stored token.
    pub async fn boot(&self) -> Session {
        let Some(token) = self.inner.store.load() else {
            tracing::debug!("No stored credential");
            self.write().booting = false;
            return self.snapshot();
        };

        let generation = self.read().generation;

        if token::is_expired(&token, self.inner.clock.now()) {
            tracing::info!("Stored credential expired");
            self.inner.store.clear_if_current(&token);
            if self.finish_boot_anonymous(generation) {
                self.emit(SessionEvent::SignedOut {
                    reason: SignOutReason::Expired,
                });
            }
            return self.snapshot();
        }

        match self.fetch_profile(&token).await {
            Ok(user) => {
                let applied = {
                    let mut state = self.write();
                    state.booting = false;
                    // A login or logout that resolved while we were fetching wins.
                    if state.generation == generation {
                        state.token = Some(token);
                        state.user = Some(user.clone());
                        true
                    } else {
                        false
                    }
                };
                if applied {
                    tracing::info!(user_id = %user.id, role = ?user.role, "Session restored");
                } else {
                    tracing::debug!("Session changed during boot, discarding restored profile");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored credential rejected, signing out");
                self.inner.store.clear_if_current(&token);
                if self.finish_boot_anonymous(generation) {
                    let reason = if e.is_unauthorized() {
                        SignOutReason::Unauthorized
                    } else {
                        SignOutReason::ValidationFailed
                    };
                    self.emit(SessionEvent::SignedOut { reason });
                }
            }
        }

        self.snapshot()
    }

    /// End boot without a session. Returns false when a login or logout
    /// already settled the session, in which case it is left alone.
    fn finish_boot_anonymous(&self, generation: u64) -> bool {
        let mut state = self.write();
        state.booting = false;
        state.generation == generation
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
        let envelope: Envelope<UserProfile> = self
            .inner
            .api
            .get("/users/profile")
            .bearer(Some(token))
            .send()
            .await?;

        let message = envelope.message.clone();
        envelope.into_data().ok_or_else(|| {
            ApiError::Validation(
                message.unwrap_or_else(|| "profile response missing data".to_string()),
            )
        })
    }

    // ─── Login / Logout ──────────────────────────────────────────────────────

    /// Sign in with email and password.
    ///
    /// On failure the stored credential and the current session are left as
    /// they were.
    pub async fn login(&self, email: &str, password: &str) -> std::result::Result<UserProfile, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::InvalidInput(
                "Email and password are required".to_string(),
            ));
        }

        tracing::info!(email = %email, "Attempting login");
        let _in_flight = LoginInFlight::start(self);

        let response = self
            .inner
            .api
            .post("/auth/login")
            .json(&LoginRequest { email, password })
            .send::<LoginResponse>()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "Login failed");
                return Err(SessionError::rejected(e, "Invalid credentials"));
            }
        };

        let (token, user) = match response {
            LoginResponse {
                token: Some(token),
                user: Some(user),
                ..
            } if !token.trim().is_empty() => (token, user),
            LoginResponse { message, .. } => {
                tracing::warn!(email = %email, "Login response without token");
                return Err(SessionError::Rejected {
                    message: message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Login failed".to_string()),
                    source: ApiError::Validation(
                        "login response missing token or user".to_string(),
                    ),
                });
            }
        };

        self.inner.store.save(&token)?;
        {
            let mut state = self.write();
            state.token = Some(token);
            state.user = Some(user.clone());
            state.generation += 1;
        }

        tracing::info!(user_id = %user.id, role = ?user.role, "Login successful");
        self.emit(SessionEvent::SignedIn { user: user.clone() });
        Ok(user)
    }

    /// Sign out. Always succeeds; calling it again is harmless.
    pub fn logout(&self) {
        self.inner.store.clear();
        self.write().sign_out();
        tracing::info!("Logged out");
        self.emit(SessionEvent::SignedOut {
            reason: SignOutReason::UserRequested,
        });
    }

    /// Tear down the session after the backend rejected `token`, unless a
    /// newer login already replaced it.
    fn invalidate(&self, token: &str) {
        let dropped = {
            let mut state = self.write();
            if state.token.as_deref() == Some(token) {
                state.sign_out();
                true
            } else {
                false
            }
        };
        if dropped {
            tracing::warn!("Session invalidated by backend");
            self.emit(SessionEvent::SignedOut {
                reason: SignOutReason::Unauthorized,
            });
        }
    }

    // ─── Account operations ──────────────────────────────────────────────────

    /// Ask the backend to send password-reset instructions. Does not touch
    /// the session.
    pub async fn reset_password(&self, email: &str) -> std::result::Result<String, SessionError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SessionError::InvalidInput("Email is required".to_string()));
        }

        let response: MessageResponse = self
            .inner
            .api
            .post("/auth/reset-password")
            .json(&ResetPasswordRequest { email })
            .send()
            .await
            .map_err(|e| SessionError::rejected(e, "Failed to reset password"))?;

        Ok(response
            .message
            .unwrap_or_else(|| "Password reset instructions sent".to_string()))
    }

    /// Update the signed-in user's profile and adopt the server's copy.
    pub async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> std::result::Result<UserProfile, SessionError> {
        if update.is_empty() {
            return Err(SessionError::InvalidInput("Nothing to update".to_string()));
        }
        let token = self
            .authenticated_token()
            .ok_or(SessionError::NotAuthenticated)?;

        let envelope: Envelope<UserProfile> = self
            .client()
            .put("/users/profile")
            .json(update)
            .send()
            .await
            .map_err(|e| SessionError::rejected(e, "Failed to update profile"))?;

        let message = envelope.message.clone();
        let Some(user) = envelope.into_data() else {
            return Err(SessionError::Rejected {
                message: message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Failed to update profile".to_string()),
                source: ApiError::Validation("profile update unsuccessful".to_string()),
            });
        };

        let applied = {
            let mut state = self.write();
            if state.token.as_deref() == Some(token.as_str()) {
                state.user = Some(user.clone());
                true
            } else {
                false
            }
        };
        if applied {
            tracing::info!(user_id = %user.id, "Profile updated");
            self.emit(SessionEvent::ProfileUpdated { user: user.clone() });
        }
        Ok(user)
    }

    /// Change the signed-in user's password.
    pub async fn change_password(
        &self,
        change: &PasswordChange,
    ) -> std::result::Result<String, SessionError> {
        change
            .validate()
            .map_err(|msg| SessionError::InvalidInput(msg.to_string()))?;
        self.authenticated_token()
            .ok_or(SessionError::NotAuthenticated)?;

        let response: MessageResponse = self
            .client()
            .put("/users/change-password")
            .json(&PasswordChangeBody {
                current_password: &change.current_password,
                new_password: &change.new_password,
            })
            .send()
            .await
            .map_err(|e| SessionError::rejected(e, "Failed to update password"))?;

        tracing::info!("Password changed");
        Ok(response
            .message
            .unwrap_or_else(|| "Password updated successfully".to_string()))
    }

    fn authenticated_token(&self) -> Option<String> {
        let state = self.read();
        if state.is_authenticated() {
            state.token.clone()
        } else {
            None
        }
    }

    // ─── Authorized requests ─────────────────────────────────────────────────

    /// Request surface that injects the current token into each call.
    pub fn client(&self) -> SessionClient<'_> {
        SessionClient { session: self }
    }
}

/// Keeps `logins_in_flight` accurate even if the login future is dropped.
struct LoginInFlight<'a> {
    session: &'a SessionManager,
}

impl<'a> LoginInFlight<'a> {
    fn start(session: &'a SessionManager) -> Self {
        session.write().logins_in_flight += 1;
        Self { session }
    }
}

impl Drop for LoginInFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.session.write();
        state.logins_in_flight = state.logins_in_flight.saturating_sub(1);
    }
}

/// Authorized request builder bound to a session.
#[derive(Clone, Copy)]
pub struct SessionClient<'a> {
    session: &'a SessionManager,
}

impl<'a> SessionClient<'a> {
    pub fn get(self, path: &str) -> AuthorizedRequest<'a> {
        self.request(Method::GET, path)
    }

    pub fn post(self, path: &str) -> AuthorizedRequest<'a> {
        self.request(Method::POST, path)
    }

    pub fn put(self, path: &str) -> AuthorizedRequest<'a> {
        self.request(Method::PUT, path)
    }

    pub fn patch(self, path: &str) -> AuthorizedRequest<'a> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(self, path: &str) -> AuthorizedRequest<'a> {
        self.request(Method::DELETE, path)
    }

    pub fn request(self, method: Method, path: &str) -> AuthorizedRequest<'a> {
        AuthorizedRequest {
            session: self.session,
            inner: self.session.inner.api.request(method, path),
        }
    }
}

/// A request that picks up the session's token when sent.
#[must_use = "requests do nothing until sent"]
pub struct AuthorizedRequest<'a> {
    session: &'a SessionManager,
    inner: ApiRequest<'a>,
}

impl AuthorizedRequest<'_> {
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.inner = self.inner.json(body);
        self
    }

    pub fn query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner = self.inner.query(params);
        self
    }

    /// Send with the token current at this moment. A 401 ends the session
    /// before the error is returned.
    pub async fn send<T: DeserializeOwned>(self) -> Result<T> {
        let token = self.session.current_token();
        let result = self.inner.bearer(token.as_deref()).send().await;

        if let (Err(ApiError::Unauthorized), Some(token)) = (&result, token.as_deref()) {
            self.session.invalidate(token);
        }
        result
    }
}
