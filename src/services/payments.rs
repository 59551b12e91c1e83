// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payment history and Khalti verification.

use super::segment;
use crate::error::Result;
use crate::models::PageRequest;
use crate::session::SessionManager;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    pidx: &'a str,
    order_id: &'a str,
}

#[derive(Clone)]
pub struct PaymentService {
    session: SessionManager,
}

impl PaymentService {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// `GET /payments/history` - extra filters are passed through verbatim.
    pub async fn list(&self, page: PageRequest, filters: &[(&str, &str)]) -> Result<Value> {
        self.session
            .client()
            .get("/payments/history")
            .query(page.to_query())
            .query(filters.iter().map(|(k, v)| (k.to_string(), v.to_string())))
            .send()
            .await
    }

    pub async fn get(&self, payment_id: &str) -> Result<Value> {
        self.session
            .client()
            .get(&format!("/payments/{}", segment(payment_id)))
            .send()
            .await
    }

    /// Confirm a Khalti payment by its `pidx`.
    pub async fn verify_khalti(&self, pidx: &str, order_id: &str) -> Result<Value> {
        self.session
            .client()
            .post("/payments/verify")
            .json(&VerifyRequest { pidx, order_id })
            .send()
            .await
    }

    pub async fn stats(&self) -> Result<Value> {
        self.session.client().get("/payments/stats").send().await
    }
}
