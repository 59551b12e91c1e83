// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process stand-in for the laundry backend.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use laundry_admin::http::{ApiClient, ClientConfig};
use laundry_admin::store::{CredentialStore, MemoryCredentialStore};
use laundry_admin::time_utils::Clock;
use laundry_admin::SessionManager;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as seen by the stub.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub auth: Option<String>,
}

#[derive(Clone)]
struct Account {
    password: String,
    token: Option<String>,
    user: Value,
    message: Option<String>,
}

#[derive(Default)]
pub struct StubState {
    accounts: Mutex<HashMap<String, Account>>,
    sessions: Mutex<HashMap<String, Value>>,
    profile_override: Mutex<Option<(StatusCode, Value)>>,
    login_delay: Mutex<Duration>,
    profile_delay: Mutex<Duration>,
    seen: Mutex<Vec<Seen>>,
    bodies: Mutex<Vec<Value>>,
}

pub struct StubBackend {
    pub base_url: String,
    pub state: Arc<StubState>,
}

#[allow(dead_code)]
impl StubBackend {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Register credentials that log in with `token` as `user`.
    pub fn add_account(&self, email: &str, password: &str, token: &str, user: Value) {
        self.state.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                token: Some(token.to_string()),
                user,
                message: None,
            },
        );
    }

    /// Credentials whose login answers 200 without a token.
    pub fn add_tokenless_account(&self, email: &str, password: &str, message: &str) {
        self.state.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                token: None,
                user: Value::Null,
                message: Some(message.to_string()),
            },
        );
    }

    /// Make `token` valid for the profile and resource endpoints.
    pub fn add_session(&self, token: &str, user: Value) {
        self.state
            .sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
    }

    pub fn revoke(&self, token: &str) {
        self.state.sessions.lock().unwrap().remove(token);
    }

    pub fn override_profile(&self, status: StatusCode, body: Value) {
        *self.state.profile_override.lock().unwrap() = Some((status, body));
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.state.login_delay.lock().unwrap() = delay;
    }

    pub fn set_profile_delay(&self, delay: Duration) {
        *self.state.profile_delay.lock().unwrap() = delay;
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.state.seen.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Seen> {
        self.requests()
            .into_iter()
            .filter(|s| s.path == path)
            .collect()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.bodies.lock().unwrap().last().cloned()
    }

    pub fn client(&self, store: Arc<dyn CredentialStore>) -> ApiClient {
        client_for(&self.base_url, store, Duration::from_secs(5))
    }

    /// Session manager backed by an in-memory store.
    pub fn session(&self, store: Arc<MemoryCredentialStore>) -> SessionManager {
        let store: Arc<dyn CredentialStore> = store;
        SessionManager::new(self.client(store.clone()), store)
    }

    pub fn session_with_clock(
        &self,
        store: Arc<MemoryCredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> SessionManager {
        let store: Arc<dyn CredentialStore> = store;
        SessionManager::with_clock(self.client(store.clone()), store, clock)
    }
}

#[allow(dead_code)]
pub fn client_for(base_url: &str, store: Arc<dyn CredentialStore>, timeout: Duration) -> ApiClient {
    ApiClient::new(
        ClientConfig {
            base_url: base_url.to_string(),
            timeout,
        },
        store,
    )
    .expect("valid client config")
}

/// A base URL where nothing is listening.
#[allow(dead_code)]
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

#[allow(dead_code)]
pub fn admin_user() -> Value {
    json!({"id": "1", "fullName": "A", "email": "admin@x.com", "role": "admin"})
}

#[allow(dead_code)]
pub fn customer_user() -> Value {
    json!({
        "_id": "2",
        "fullName": "Bikash Customer",
        "email": "bikash@example.com",
        "role": "user",
        "createdAt": "2025-03-01T10:00:00.000Z"
    })
}

/// Mint a backend-style JWT expiring at `exp` (Unix seconds).
#[allow(dead_code)]
pub fn mint_token(sub: &str, exp: i64) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        id: &'a str,
        exp: i64,
        iat: i64,
    }

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            id: sub,
            exp,
            iat: exp - 86400,
        },
        &EncodingKey::from_secret(b"stub_backend_signing_key_32_bytes"),
    )
    .expect("Failed to create JWT")
}

// ─── Stub routes ─────────────────────────────────────────────────────────────

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/users/profile", get(get_profile).put(put_profile))
        .route("/api/users/change-password", put(change_password))
        .route("/api/users/getalluser", get(list_users))
        .route("/api/orders/admin", get(list_orders))
        .route("/api/orders/dashboard-stats", get(dashboard_stats))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route("/api/services", get(list_services).post(create_service))
        .route("/api/payments/verify", post(verify_payment))
        .route("/api/payments/stats", get(payment_stats))
        .route("/api/slow", get(slow))
        .route("/api/boom", get(boom))
        .route("/api/malformed", get(malformed))
        .route("/api/forbidden", get(forbidden))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<StubState>>, request: Request, next: Next) -> Response {
    let auth = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push(Seen {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        auth,
    });
    next.run(request).await
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Token is not valid"})),
    )
        .into_response()
}

fn authorize(state: &StubState, headers: &HeaderMap) -> Result<(String, Value), Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or_else(unauthorized)?;
    let user = state
        .sessions
        .lock()
        .unwrap()
        .get(&token)
        .cloned()
        .ok_or_else(unauthorized)?;
    Ok((token, user))
}

async fn login(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    let delay = *state.login_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let account = state.accounts.lock().unwrap().get(email).cloned();

    match account {
        Some(account) if account.password == password => match account.token {
            Some(token) => {
                state
                    .sessions
                    .lock()
                    .unwrap()
                    .insert(token.clone(), account.user.clone());
                Json(json!({"token": token, "user": account.user})).into_response()
            }
            None => Json(json!({"message": account.message})).into_response(),
        },
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
            .into_response(),
    }
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if email.contains('@') {
        Json(json!({"message": format!("Reset link sent to {}", email)})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Please provide a valid email"})),
        )
            .into_response()
    }
}

async fn get_profile(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    let delay = *state.profile_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let profile_override = state.profile_override.lock().unwrap().clone();
    if let Some((status, body)) = profile_override {
        return (status, Json(body)).into_response();
    }
    match authorize(&state, &headers) {
        Ok((_, user)) => Json(json!({"success": true, "data": user})).into_response(),
        Err(resp) => resp,
    }
}

async fn put_profile(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let (token, mut user) = match authorize(&state, &headers) {
        Ok(found) => found,
        Err(resp) => return resp,
    };
    state.bodies.lock().unwrap().push(body.clone());

    if body.get("email").and_then(Value::as_str) == Some("taken@example.com") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Email already in use"})),
        )
            .into_response();
    }

    if let (Some(target), Some(changes)) = (user.as_object_mut(), body.as_object()) {
        for (k, v) in changes {
            target.insert(k.clone(), v.clone());
        }
    }
    state
        .sessions
        .lock()
        .unwrap()
        .insert(token, user.clone());
    Json(json!({"success": true, "data": user})).into_response()
}

async fn change_password(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.bodies.lock().unwrap().push(body.clone());
    if body["currentPassword"] == "wrong" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Current password is incorrect"})),
        )
            .into_response();
    }
    Json(json!({"message": "Password updated"})).into_response()
}

async fn list_users(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({"users": [customer_user()], "totalPages": 1})).into_response()
}

async fn list_orders(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({
        "orders": [{"_id": "o1", "status": "pending", "totalAmount": 450}],
        "totalPages": 3,
        "currentPage": 1
    }))
    .into_response()
}

async fn dashboard_stats(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({"success": true, "data": {"totalOrders": 12, "pendingOrders": 3}})).into_response()
}

async fn get_order(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order not found"})),
        )
            .into_response();
    }
    Json(json!({"success": true, "data": {"_id": id, "status": "washing"}})).into_response()
}

async fn update_order_status(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.bodies.lock().unwrap().push(body.clone());
    Json(json!({"success": true, "data": {"_id": id, "status": body["status"]}})).into_response()
}

async fn list_services(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({"success": true, "data": [{"_id": "s1", "name": "Wash & Fold", "price": 120}]}))
        .into_response()
}

async fn create_service(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.bodies.lock().unwrap().push(body.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "data": body})),
    )
        .into_response()
}

async fn verify_payment(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    state.bodies.lock().unwrap().push(body.clone());
    Json(json!({"success": true, "status": "Completed"})).into_response()
}

async fn payment_stats(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"message": "Payment gateway unavailable"})),
    )
        .into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"ok": true})).into_response()
}

async fn boom() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "Something went wrong"})),
    )
        .into_response()
}

async fn malformed() -> Response {
    (StatusCode::OK, "definitely not json").into_response()
}

async fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"error": "Admins only"})),
    )
        .into_response()
}
