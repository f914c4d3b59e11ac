use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::CategoryType;
use sqlx::FromRow;
use uuid::Uuid;

use super::parse_uuid;

/// Database model for categories
///
/// `user_id` is `None` for the seeded system defaults.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    #[sqlx(rename = "type")]
    pub category_type: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn parse_category_type(value: &str) -> Result<CategoryType, sqlx::Error> {
    value
        .parse()
        .map_err(|_| sqlx::Error::Decode(format!("unknown category type {:?}", value).into()))
}

impl CategoryRow {
    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        self.user_id.as_deref() == Some(user_id.to_string().as_str())
    }

    /// Defaults are visible to everyone; anything else only to its owner.
    pub fn is_visible_to(&self, user_id: &Uuid) -> bool {
        self.is_default || self.is_owned_by(user_id)
    }

    pub fn to_shared(&self) -> Result<shared::Category, sqlx::Error> {
        Ok(shared::Category {
            id: parse_uuid(&self.id)?,
            name: self.name.clone(),
            category_type: parse_category_type(&self.category_type)?,
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: Option<Uuid>, is_default: bool) -> CategoryRow {
        let now = Utc::now();
        CategoryRow {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(|id| id.to_string()),
            name: "Groceries".to_string(),
            category_type: "expense".to_string(),
            is_default,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_category_row_to_shared() {
        let category = row(None, true).to_shared().unwrap();

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.category_type, CategoryType::Expense);
        assert!(category.is_default);
    }

    #[test]
    fn test_category_ownership() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let own = row(Some(owner), false);
        assert!(own.is_owned_by(&owner));
        assert!(!own.is_visible_to(&stranger));

        let default = row(None, true);
        assert!(!default.is_owned_by(&owner));
        assert!(default.is_visible_to(&stranger));
    }

    #[test]
    fn test_category_row_with_unknown_type() {
        let mut bad = row(None, true);
        bad.category_type = "savings".to_string();
        assert!(bad.to_shared().is_err());
    }
}
