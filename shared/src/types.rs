use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// User Types
// ============================================================================

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Access/refresh pair returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub revoked_sessions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

// ============================================================================
// Category Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Expense,
    Income,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Expense => "expense",
            CategoryType::Income => "income",
        }
    }
}

impl FromStr for CategoryType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" => Ok(CategoryType::Expense),
            "income" => Ok(CategoryType::Income),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
}

// ============================================================================
// Expense Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub name: String,
    pub amount: f64,
    pub category_id: Uuid,
}

// ============================================================================
// Pagination
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

// ============================================================================
// API Response Types
// ============================================================================

/// Error envelope shared by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub message: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: error.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_type_from_str() {
        assert_eq!("expense".parse(), Ok(CategoryType::Expense));
        assert_eq!("INCOME".parse(), Ok(CategoryType::Income));
        assert!("savings".parse::<CategoryType>().is_err());
    }

    #[test]
    fn test_category_serializes_type_field() {
        let category = Category {
            id: Uuid::new_v4(),
            name: "Food".to_string(),
            category_type: CategoryType::Expense,
            is_default: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["is_default"], true);
    }

    #[test]
    fn test_paginated_total_pages() {
        let page: Paginated<i32> = Paginated::new(vec![1, 2], 21, 1, 10);
        assert_eq!(page.total_pages, 3);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, 1, 10);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_api_error_envelope() {
        let error = ApiError::new("unauthorized", "Invalid or missing token");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "unauthorized");
        assert_eq!(json["message"], "Invalid or missing token");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_api_error_with_validation_errors() {
        let error = ApiError::new("validation_error", "Validation Error")
            .with_errors(vec!["name is required".to_string()]);
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["errors"][0], "name is required");
    }

    #[test]
    fn test_api_success() {
        let success = ApiSuccess::new("ok", "test data");
        assert!(success.success);
        assert_eq!(success.data, "test data");
    }
}
