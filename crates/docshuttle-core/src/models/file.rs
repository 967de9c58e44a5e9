use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::retention;

/// Metadata record for one converted file.
///
/// A record exists in the metadata store iff its blob exists in storage; the
/// expiry sweeper repairs violations of that invariant. `expires_at` is always
/// exactly `created_at + 24h`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FileRecord {
    pub id: Uuid,
    /// Opaque per-client identifier, issued as a cookie token. Treated as a
    /// storage namespace key; never validated.
    pub user_id: String,
    pub original_name: String,
    /// Key under which the converted blob lives in the client's namespace.
    /// Time-seeded to avoid collisions.
    pub stored_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FileRecord {
    /// Build a new record with a fresh id and the fixed retention applied.
    pub fn new(user_id: String, original_name: String, stored_name: String) -> Self {
        let created_at = Utc::now();
        FileRecord {
            id: Uuid::new_v4(),
            user_id,
            original_name,
            stored_name,
            created_at,
            expires_at: created_at + retention(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
