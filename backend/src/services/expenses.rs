use chrono::Utc;
use shared::{Expense, ExpenseRequest, Paginated};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::ListQuery;
use crate::models::ExpenseRow;
use crate::services::categories as category_service;

#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Expense not found")]
    NotFound,
    #[error("Invalid category ID")]
    InvalidCategory,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<category_service::CategoryError> for ExpenseError {
    fn from(e: category_service::CategoryError) -> Self {
        match e {
            category_service::CategoryError::DatabaseError(e) => ExpenseError::DatabaseError(e),
            _ => ExpenseError::InvalidCategory,
        }
    }
}

const SELECT_EXPENSE: &str = r#"
    SELECT e.id, e.user_id, e.category_id, e.name, e.amount, e.created_at, e.updated_at,
           c.name AS category_name, c.type AS category_type, c.is_default AS category_is_default,
           c.created_at AS category_created_at, c.updated_at AS category_updated_at
    FROM expenses e
    JOIN categories c ON c.id = e.category_id
"#;

const SORT_COLUMNS: [(&str, &str); 4] = [
    ("id", "e.id"),
    ("name", "e.name"),
    ("amount", "e.amount"),
    ("created_at", "e.created_at"),
];

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    if let Some(name) = query.filter("name") {
        builder.push(" AND e.name LIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(category_name) = query.filter("category_name") {
        builder
            .push(" AND c.name LIKE ")
            .push_bind(format!("%{}%", category_name));
    }
    if let Some(category_type) = query.filter("category_type") {
        builder
            .push(" AND c.type = ")
            .push_bind(category_type.to_lowercase());
    }
}

pub async fn list_expenses(
    pool: &SqlitePool,
    user_id: &Uuid,
    query: &ListQuery,
) -> Result<Paginated<Expense>, ExpenseError> {
    let mut count = QueryBuilder::<Sqlite>::new(
        "SELECT COUNT(*) FROM expenses e JOIN categories c ON c.id = e.category_id WHERE e.user_id = ",
    );
    count.push_bind(user_id.to_string());
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let column = query.sort_column(&SORT_COLUMNS, "e.created_at");
    let order = query.order.as_sql();

    let mut select = QueryBuilder::<Sqlite>::new(SELECT_EXPENSE);
    select.push(" WHERE e.user_id = ").push_bind(user_id.to_string());
    push_filters(&mut select, query);
    select.push(format!(" ORDER BY {} {}, e.id {}", column, order, order));
    select.push(" LIMIT ").push_bind(query.limit);
    select.push(" OFFSET ").push_bind(query.offset());

    let rows: Vec<ExpenseRow> = select.build_query_as().fetch_all(pool).await?;
    let expenses = rows
        .iter()
        .map(|row| row.to_shared().map_err(ExpenseError::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Paginated::new(expenses, total, query.page, query.limit))
}

/// Someone else's expense is reported as NotFound.
pub async fn get_expense(
    pool: &SqlitePool,
    user_id: &Uuid,
    expense_id: &Uuid,
) -> Result<Expense, ExpenseError> {
    let row: ExpenseRow = sqlx::query_as(&format!("{} WHERE e.id = ? AND e.user_id = ?", SELECT_EXPENSE))
        .bind(expense_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(pool)
        .await?
        .ok_or(ExpenseError::NotFound)?;

    Ok(row.to_shared()?)
}

async fn ensure_category_usable(
    pool: &SqlitePool,
    user_id: &Uuid,
    category_id: &Uuid,
) -> Result<(), ExpenseError> {
    category_service::get_category(pool, user_id, category_id).await?;
    Ok(())
}

pub async fn create_expense(
    pool: &SqlitePool,
    user_id: &Uuid,
    request: &ExpenseRequest,
) -> Result<Expense, ExpenseError> {
    ensure_category_usable(pool, user_id, &request.category_id).await?;

    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO expenses (id, user_id, category_id, name, amount, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .bind(request.category_id.to_string())
    .bind(request.name.trim())
    .bind(request.amount)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_expense(pool, user_id, &id).await
}

pub async fn update_expense(
    pool: &SqlitePool,
    user_id: &Uuid,
    expense_id: &Uuid,
    request: &ExpenseRequest,
) -> Result<Expense, ExpenseError> {
    // Ownership first, so a stranger learns nothing about the category.
    get_expense(pool, user_id, expense_id).await?;
    ensure_category_usable(pool, user_id, &request.category_id).await?;

    sqlx::query(
        "UPDATE expenses SET name = ?, amount = ?, category_id = ?, updated_at = ? WHERE id = ? AND user_id = ?",
    )
    .bind(request.name.trim())
    .bind(request.amount)
    .bind(request.category_id.to_string())
    .bind(Utc::now())
    .bind(expense_id.to_string())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    get_expense(pool, user_id, expense_id).await
}

/// Returns the deleted expense.
pub async fn delete_expense(
    pool: &SqlitePool,
    user_id: &Uuid,
    expense_id: &Uuid,
) -> Result<Expense, ExpenseError> {
    let expense = get_expense(pool, user_id, expense_id).await?;

    let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
        .bind(expense_id.to_string())
        .bind(user_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ExpenseError::NotFound);
    }

    Ok(expense)
}
