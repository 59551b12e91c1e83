// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models exchanged with the laundry backend.

pub mod auth;
pub mod order;
pub mod page;
pub mod user;

pub use auth::{Envelope, LoginRequest, LoginResponse, PasswordChange};
pub use order::{OrderFilters, OrderStatus, StatusUpdate};
pub use page::PageRequest;
pub use user::{ProfileUpdate, Role, UserProfile};
