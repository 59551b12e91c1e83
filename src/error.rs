// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error taxonomy for calls against the laundry backend.

use reqwest::StatusCode;

/// Failure surfaced by the HTTP client facade.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401 from the backend. The credential store has already been cleared.
    #[error("Authentication required")]
    Unauthorized,

    #[error("Request rejected ({status}): {message}")]
    Client { status: StatusCode, message: String },

    #[error("Backend error ({status}): {message}")]
    Server { status: StatusCode, message: String },

    /// No response reached us.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// A 2xx response that is missing or mangling expected fields.
    #[error("Malformed response: {0}")]
    Validation(String),

    #[error("Client misconfigured: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status carried by the failure, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message provided by the backend, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Client { message, .. } | ApiError::Server { message, .. } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Build the error for a non-2xx status.
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized
        } else if status.is_server_error() {
            ApiError::Server { status, message }
        } else {
            ApiError::Client { status, message }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Validation(err.to_string())
        } else if err.is_builder() {
            ApiError::Config(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Credential store failures. Only `save` can report one.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write credential file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure returned by session operations, carrying a user-displayable message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Could not save session: {0}")]
    Storage(#[from] StoreError),
}

impl SessionError {
    /// Wrap an API failure, preferring the backend's own message over `fallback`.
    pub(crate) fn rejected(source: ApiError, fallback: &str) -> Self {
        let message = source
            .server_message()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string();
        SessionError::Rejected { message, source }
    }

    /// Message suitable for showing to the operator.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Underlying API failure, if the backend was reached.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SessionError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for facade calls.
pub type Result<T> = std::result::Result<T, ApiError>;
