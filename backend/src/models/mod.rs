use sqlx::SqlitePool;
use uuid::Uuid;

use crate::services::auth::SessionAuthority;

pub mod category;
pub mod expense;
pub mod refresh_token;
pub mod user;

pub use category::*;
pub use expense::*;
pub use refresh_token::*;
pub use user::*;

/// Application state shared across all handlers
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionAuthority,
}

/// Ids are stored as hyphenated TEXT; a malformed one is a decode failure.
pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(value).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
