// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource services - typed request builders for the admin endpoints.
//!
//! Services never handle errors themselves; failures are forwarded to the
//! caller unchanged. Records are passed through as opaque JSON.

pub mod catalog;
pub mod orders;
pub mod payments;
pub mod users;

pub use catalog::CatalogService;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use users::UserService;

/// Percent-encode a record id for use as a path segment.
pub(crate) fn segment(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}
