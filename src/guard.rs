// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard for the admin dashboard.

use crate::session::Session;

/// What the view layer should do for a navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not resolved yet; show a spinner.
    Loading,
    RedirectToLogin,
    AccessDenied,
    Render,
}

/// Decide whether an admin-only target may render.
///
/// Loading is checked first so an unresolved session never yields a
/// premature redirect or denial.
pub fn decide(session: &Session) -> GuardDecision {
    if session.is_loading {
        GuardDecision::Loading
    } else if !session.is_authenticated {
        GuardDecision::RedirectToLogin
    } else if !session.is_admin {
        GuardDecision::AccessDenied
    } else {
        GuardDecision::Render
    }
}

/// Navigation targets of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    ForgotPassword,
    Dashboard,
    Orders,
    OrderDetails(String),
    Services,
    Users,
    UserDetails(String),
    Payments,
    PaymentDetails(String),
    Profile,
    NotFound,
}

impl Route {
    /// Map a URL path to a route. Unknown paths map to `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Dashboard,
            ["login"] => Route::Login,
            ["forgot-password"] => Route::ForgotPassword,
            ["orders"] => Route::Orders,
            ["orders", id] => Route::OrderDetails(decode_segment(id)),
            ["services"] => Route::Services,
            ["users"] => Route::Users,
            ["users", id] => Route::UserDetails(decode_segment(id)),
            ["payments"] => Route::Payments,
            ["payments", id] => Route::PaymentDetails(decode_segment(id)),
            ["profile"] => Route::Profile,
            _ => Route::NotFound,
        }
    }

    /// Canonical URL path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Orders => "/orders".to_string(),
            Route::OrderDetails(id) => format!("/orders/{}", urlencoding::encode(id)),
            Route::Services => "/services".to_string(),
            Route::Users => "/users".to_string(),
            Route::UserDetails(id) => format!("/users/{}", urlencoding::encode(id)),
            Route::Payments => "/payments".to_string(),
            Route::PaymentDetails(id) => format!("/payments/{}", urlencoding::encode(id)),
            Route::Profile => "/profile".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Whether the route sits behind the admin guard.
    pub fn is_protected(&self) -> bool {
        !matches!(
            self,
            Route::Login | Route::ForgotPassword | Route::NotFound
        )
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Guard decision for navigating to `route`. Public routes always render.
pub fn admit(route: &Route, session: &Session) -> GuardDecision {
    if route.is_protected() {
        decide(session)
    } else {
        GuardDecision::Render
    }
}
