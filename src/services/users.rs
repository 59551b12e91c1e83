// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer account endpoints (admin only).

use super::segment;
use crate::error::Result;
use crate::models::PageRequest;
use crate::session::SessionManager;
use serde_json::Value;

#[derive(Clone)]
pub struct UserService {
    session: SessionManager,
}

impl UserService {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// `GET /users/getalluser` with an optional name/email search.
    pub async fn list(&self, page: PageRequest, search: &str) -> Result<Value> {
        self.session
            .client()
            .get("/users/getalluser")
            .query(page.to_query())
            .query([("search", search.to_string())])
            .send()
            .await
    }

    pub async fn get(&self, user_id: &str) -> Result<Value> {
        self.session
            .client()
            .get(&format!("/users/{}", segment(user_id)))
            .send()
            .await
    }

    /// `PUT /users/admin/{id}`
    pub async fn update(&self, user_id: &str, data: &Value) -> Result<Value> {
        self.session
            .client()
            .put(&format!("/users/admin/{}", segment(user_id)))
            .json(data)
            .send()
            .await
    }

    /// `DELETE /users/admin/{id}`
    pub async fn delete(&self, user_id: &str) -> Result<Value> {
        tracing::info!(user_id = %user_id, "Deleting user");
        self.session
            .client()
            .delete(&format!("/users/admin/{}", segment(user_id)))
            .send()
            .await
    }
}
