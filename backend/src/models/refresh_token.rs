use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for refresh tokens
///
/// One row per issued refresh token. Rows are never deleted; logout and
/// rotation only flip `is_revoked`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RefreshTokenRow {
    pub id: String,
    pub user_id: String,
    pub jti: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRow {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn row(expires_at: DateTime<Utc>, is_revoked: bool) -> RefreshTokenRow {
        RefreshTokenRow {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            jti: Uuid::new_v4().to_string(),
            token_hash: "abc123hash".to_string(),
            expires_at,
            is_revoked,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_refresh_token_row_activity() {
        let now = Utc::now();

        assert!(row(now + Duration::hours(1), false).is_active(now));
        assert!(!row(now + Duration::hours(1), true).is_active(now));
        assert!(!row(now, false).is_active(now));
        assert!(row(now - Duration::seconds(1), false).is_expired(now));
    }
}
