//! Record shapes exchanged with the hosted backend.
//!
//! These mirror the service's tables; the backend client crate does
//! the transport, this module only defines the payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Access role carried on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// A registered user's profile row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Insert payload for a booth session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub user_id: Option<String>,
    pub layout: Layout,
    pub filter_applied: String,
}

/// A stored booth session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub layout: Layout,
    pub filter_applied: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a generated strip image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGeneratedImage {
    pub user_id: Option<String>,
    pub session_id: String,
    /// Base64-encoded PNG bytes of the composed strip.
    pub image_data: String,
    pub layout: Layout,
    pub background_color: String,
    pub sticker_applied: Option<String>,
    pub file_size: u64,
}

/// A stored generated strip image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImageRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub session_id: String,
    pub image_data: String,
    pub layout: Layout,
    pub background_color: String,
    pub sticker_applied: Option<String>,
    pub file_size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
}

/// The authenticated principal inside an auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

/// Token-bearing auth session issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Extra profile fields collected at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub full_name: Option<String>,
}
