// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order endpoints.

use super::segment;
use crate::error::Result;
use crate::models::{OrderFilters, OrderStatus, PageRequest, StatusUpdate};
use crate::session::SessionManager;
use serde_json::Value;

#[derive(Clone)]
pub struct OrderService {
    session: SessionManager,
}

impl OrderService {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// `GET /orders/admin` - paginated list of all orders.
    pub async fn list_admin(&self, page: PageRequest, filters: &OrderFilters) -> Result<Value> {
        self.session
            .client()
            .get("/orders/admin")
            .query(page.to_query())
            .query(filters.to_query())
            .send()
            .await
    }

    /// `GET /orders/{id}`
    pub async fn get(&self, order_id: &str) -> Result<Value> {
        self.session
            .client()
            .get(&format!("/orders/{}", segment(order_id)))
            .send()
            .await
    }

    /// `PUT /orders/{id}/status` with an optional note.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        note: &str,
    ) -> Result<Value> {
        tracing::info!(order_id = %order_id, status = %status, "Updating order status");
        self.session
            .client()
            .put(&format!("/orders/{}/status", segment(order_id)))
            .json(&StatusUpdate { status, note })
            .send()
            .await
    }

    /// `GET /orders/dashboard-stats`
    pub async fn dashboard_stats(&self) -> Result<Value> {
        self.session
            .client()
            .get("/orders/dashboard-stats")
            .send()
            .await
    }

    /// `GET /orders/history` for one customer.
    pub async fn user_history(&self, user_id: &str, page: PageRequest) -> Result<Value> {
        self.session
            .client()
            .get("/orders/history")
            .query([("userId", user_id.to_string())])
            .query(page.to_query())
            .send()
            .await
    }
}
