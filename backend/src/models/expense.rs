use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::category::parse_category_type;
use super::parse_uuid;

/// Expense joined with its category, one row per expense.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub name: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: String,
    pub category_type: String,
    pub category_is_default: bool,
    pub category_created_at: DateTime<Utc>,
    pub category_updated_at: DateTime<Utc>,
}

impl ExpenseRow {
    pub fn to_shared(&self) -> Result<shared::Expense, sqlx::Error> {
        Ok(shared::Expense {
            id: parse_uuid(&self.id)?,
            name: self.name.clone(),
            amount: self.amount,
            category: shared::Category {
                id: parse_uuid(&self.category_id)?,
                name: self.category_name.clone(),
                category_type: parse_category_type(&self.category_type)?,
                is_default: self.category_is_default,
                created_at: self.category_created_at,
                updated_at: self.category_updated_at,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
