use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted personal access token. Only the SHA-256 digest of the secret
/// is kept; the plaintext leaves the process exactly once, at login.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub id: u64,
    pub user_id: String,
    pub name: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// A freshly issued token: the stored record plus the plaintext handed to
/// the client, formatted as `<id>|<secret>`.
#[derive(Debug, Clone)]
pub struct NewAccessToken {
    pub token: AccessToken,
    pub plain_text: String,
}

/// Identity resolved from a bearer token by the request gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub token_id: u64,
}
