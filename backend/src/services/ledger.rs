use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::RefreshTokenRow;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Unknown, revoked and expired jtis all land here on purpose.
    #[error("Refresh token not found")]
    NotFound,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Hex SHA-256 of a refresh token; the raw token is never stored.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Server-side record of issued refresh tokens, keyed by jti.
#[derive(Clone)]
pub struct RefreshTokenLedger {
    pool: SqlitePool,
}

impl RefreshTokenLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(
        &self,
        user_id: &Uuid,
        jti: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshTokenRow, LedgerError> {
        let row = RefreshTokenRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            jti: jti.to_string(),
            token_hash: hash_token(token),
            expires_at,
            is_revoked: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, jti, token_hash, expires_at, is_revoked, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.jti)
        .bind(&row.token_hash)
        .bind(row.expires_at)
        .bind(row.is_revoked)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(row)
    }

    /// The non-revoked, unexpired row for `jti`, or `NotFound`.
    pub async fn find_active_by_jti(
        &self,
        jti: &str,
        now: DateTime<Utc>,
    ) -> Result<RefreshTokenRow, LedgerError> {
        let row: RefreshTokenRow =
            sqlx::query_as("SELECT * FROM refresh_tokens WHERE jti = ? AND is_revoked = ?")
                .bind(jti)
                .bind(false)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(LedgerError::NotFound)?;

        if !row.is_active(now) {
            return Err(LedgerError::NotFound);
        }

        Ok(row)
    }

    /// Conditional revoke; the affected-row count doubles as the rotation
    /// race guard, so exactly one concurrent caller sees `1`.
    pub async fn revoke_by_jti(&self, jti: &str) -> Result<u64, LedgerError> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET is_revoked = ? WHERE jti = ? AND is_revoked = ?")
                .bind(true)
                .bind(jti)
                .bind(false)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    #[allow(dead_code)]
    pub async fn revoke_all_for_user(&self, user_id: &Uuid) -> Result<u64, LedgerError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_revoked = ? WHERE user_id = ? AND is_revoked = ?",
        )
        .bind(true)
        .bind(user_id.to_string())
        .bind(false)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
