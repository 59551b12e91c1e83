// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Laundry service catalog (wash & fold, dry cleaning, ...).

use super::segment;
use crate::error::Result;
use crate::session::SessionManager;
use serde_json::Value;

#[derive(Clone)]
pub struct CatalogService {
    session: SessionManager,
}

impl CatalogService {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub async fn list(&self) -> Result<Value> {
        self.session.client().get("/services").send().await
    }

    pub async fn get(&self, service_id: &str) -> Result<Value> {
        self.session
            .client()
            .get(&format!("/services/{}", segment(service_id)))
            .send()
            .await
    }

    pub async fn create(&self, data: &Value) -> Result<Value> {
        self.session.client().post("/services").json(data).send().await
    }

    pub async fn update(&self, service_id: &str, data: &Value) -> Result<Value> {
        self.session
            .client()
            .put(&format!("/services/{}", segment(service_id)))
            .json(data)
            .send()
            .await
    }

    pub async fn delete(&self, service_id: &str) -> Result<Value> {
        self.session
            .client()
            .delete(&format!("/services/{}", segment(service_id)))
            .send()
            .await
    }
}
