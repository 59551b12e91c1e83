// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Laundry Admin: client core for the laundry back-office dashboard
//!
//! This crate owns the authenticated session against the laundry REST
//! backend, the single outgoing request pipeline, the admin route guard,
//! and typed services for orders, users, the service catalog and payments.

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod time_utils;
pub mod token;

pub use error::{ApiError, SessionError};
pub use guard::{GuardDecision, Route};
pub use session::{Session, SessionEvent, SessionManager, SessionPhase, SignOutReason};
