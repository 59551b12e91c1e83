// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted credential store for the single bearer token.
//!
//! Purely mechanical storage: no network access, no validation.

use crate::error::StoreError;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Durable storage for one bearer token.
pub trait CredentialStore: Send + Sync {
    /// Persist `token`, replacing any prior value.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// The persisted token exactly as saved, or `None` when absent or
    /// blank. Never fails.
    fn load(&self) -> Option<String>;

    /// Remove the persisted token. Idempotent, never fails.
    fn clear(&self);

    /// Remove the persisted token only if it is still `token`.
    ///
    /// A late 401 for a superseded token must not wipe a newer login.
    fn clear_if_current(&self, token: &str) {
        if self.load().as_deref() == Some(token) {
            self.clear();
        }
    }
}

/// Token kept in a single file, surviving process restarts.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            file.write_all(token.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        self.write_atomic(token).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => (!contents.trim().is_empty()).then_some(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read credential file");
                None
            }
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Credential cleared"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove credential file");
            }
        }
    }
}

/// In-process store, for tests and embedders that handle persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
