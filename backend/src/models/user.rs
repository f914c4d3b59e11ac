use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::parse_uuid;

/// Database model for users
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn to_shared(&self) -> Result<shared::User, sqlx::Error> {
        Ok(shared::User {
            id: parse_uuid(&self.id)?,
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_user_row_to_shared() {
        let now = Utc::now();
        let id = Uuid::new_v4();

        let row = UserRow {
            id: id.to_string(),
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "hashed".to_string(),
            created_at: now,
            updated_at: now,
        };

        let shared = row.to_shared().unwrap();

        assert_eq!(shared.id, id);
        assert_eq!(shared.email, "a@x.com");
        assert_eq!(shared.name, "Alice");
    }

    #[test]
    fn test_user_row_never_serializes_hash() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4().to_string(),
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "hashed".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_user_row_with_corrupt_id() {
        let now = Utc::now();
        let row = UserRow {
            id: "not-a-uuid".to_string(),
            email: "a@x.com".to_string(),
            name: "Alice".to_string(),
            password_hash: "hashed".to_string(),
            created_at: now,
            updated_at: now,
        };

        assert!(row.to_shared().is_err());
    }
}
