// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User profile model as served by `/users/profile`.

use serde::{Deserialize, Serialize};

/// Role carried by a user record. Only admins may use the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// Signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawUserProfile")]
pub struct UserProfile {
    /// Backend user ID
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// When the account was created (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Wire shape of a profile. Mongo-backed responses carry `_id`, often
/// alongside a virtual `id`; `_id` wins when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserProfile {
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    full_name: String,
    email: String,
    role: Role,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawUserProfile> for UserProfile {
    type Error = &'static str;

    fn try_from(raw: RawUserProfile) -> Result<Self, Self::Error> {
        let id = raw.mongo_id.or(raw.id).ok_or("user record has no id")?;
        Ok(UserProfile {
            id,
            full_name: raw.full_name,
            email: raw.email,
            role: raw.role,
            phone_number: raw.phone_number,
            location: raw.location,
            created_at: raw.created_at,
        })
    }
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Partial profile update; absent fields are left unchanged by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
