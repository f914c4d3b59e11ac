use chrono::Utc;
use shared::{Category, CategoryRequest, Paginated};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::ListQuery;
use crate::models::CategoryRow;

#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("Category not found")]
    NotFound,
    #[error("You do not have permission to modify this category")]
    Forbidden,
    #[error("Category is used by existing expenses")]
    InUse,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

const SORT_COLUMNS: [(&str, &str); 4] = [
    ("id", "id"),
    ("name", "name"),
    ("type", "type"),
    ("created_at", "created_at"),
];

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery) {
    if let Some(name) = query.filter("name") {
        builder.push(" AND name LIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(category_type) = query.filter("type") {
        builder
            .push(" AND type = ")
            .push_bind(category_type.to_lowercase());
    }
}

fn to_shared_all(rows: Vec<CategoryRow>) -> Result<Vec<Category>, CategoryError> {
    rows.iter()
        .map(|row| row.to_shared().map_err(CategoryError::from))
        .collect()
}

/// Categories the user created themselves (defaults are listed separately).
pub async fn list_categories(
    pool: &SqlitePool,
    user_id: &Uuid,
    query: &ListQuery,
) -> Result<Paginated<Category>, CategoryError> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM categories WHERE user_id = ");
    count.push_bind(user_id.to_string());
    push_filters(&mut count, query);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let column = query.sort_column(&SORT_COLUMNS, "created_at");
    let order = query.order.as_sql();

    let mut select = QueryBuilder::<Sqlite>::new("SELECT * FROM categories WHERE user_id = ");
    select.push_bind(user_id.to_string());
    push_filters(&mut select, query);
    select.push(format!(" ORDER BY {} {}, id {}", column, order, order));
    select.push(" LIMIT ").push_bind(query.limit);
    select.push(" OFFSET ").push_bind(query.offset());

    let rows: Vec<CategoryRow> = select.build_query_as().fetch_all(pool).await?;

    Ok(Paginated::new(
        to_shared_all(rows)?,
        total,
        query.page,
        query.limit,
    ))
}

pub async fn list_default_categories(pool: &SqlitePool) -> Result<Vec<Category>, CategoryError> {
    let rows: Vec<CategoryRow> = sqlx::query_as(
        "SELECT * FROM categories WHERE is_default = ? AND user_id IS NULL ORDER BY name ASC",
    )
    .bind(true)
    .fetch_all(pool)
    .await?;

    to_shared_all(rows)
}

pub async fn find_category(
    pool: &SqlitePool,
    category_id: &Uuid,
) -> Result<Option<CategoryRow>, CategoryError> {
    let category = sqlx::query_as("SELECT * FROM categories WHERE id = ?")
        .bind(category_id.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

/// A default category, or one owned by `user_id`; anything else is NotFound.
pub async fn get_category(
    pool: &SqlitePool,
    user_id: &Uuid,
    category_id: &Uuid,
) -> Result<Category, CategoryError> {
    match find_category(pool, category_id).await? {
        Some(row) if row.is_visible_to(user_id) => Ok(row.to_shared()?),
        _ => Err(CategoryError::NotFound),
    }
}

async fn find_owned(
    pool: &SqlitePool,
    user_id: &Uuid,
    category_id: &Uuid,
) -> Result<CategoryRow, CategoryError> {
    let row = find_category(pool, category_id)
        .await?
        .ok_or(CategoryError::NotFound)?;

    if !row.is_owned_by(user_id) {
        return Err(CategoryError::Forbidden);
    }

    Ok(row)
}

fn new_row(user_id: &Uuid, request: &CategoryRequest) -> CategoryRow {
    let now = Utc::now();
    CategoryRow {
        id: Uuid::new_v4().to_string(),
        user_id: Some(user_id.to_string()),
        name: request.name.trim().to_string(),
        category_type: request.category_type.to_lowercase(),
        is_default: false,
        created_at: now,
        updated_at: now,
    }
}

const INSERT_CATEGORY: &str = r#"
    INSERT INTO categories (id, user_id, name, type, is_default, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

pub async fn create_category(
    pool: &SqlitePool,
    user_id: &Uuid,
    request: &CategoryRequest,
) -> Result<Category, CategoryError> {
    let row = new_row(user_id, request);

    sqlx::query(INSERT_CATEGORY)
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.name)
        .bind(&row.category_type)
        .bind(row.is_default)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(pool)
        .await?;

    Ok(row.to_shared()?)
}

/// All-or-nothing bulk create.
pub async fn create_categories(
    pool: &SqlitePool,
    user_id: &Uuid,
    requests: &[CategoryRequest],
) -> Result<Vec<Category>, CategoryError> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(requests.len());

    for request in requests {
        let row = new_row(user_id, request);
        sqlx::query(INSERT_CATEGORY)
            .bind(&row.id)
            .bind(&row.user_id)
            .bind(&row.name)
            .bind(&row.category_type)
            .bind(row.is_default)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&mut *tx)
            .await?;
        created.push(row.to_shared()?);
    }

    tx.commit().await?;
    Ok(created)
}

pub async fn update_category(
    pool: &SqlitePool,
    user_id: &Uuid,
    category_id: &Uuid,
    request: &CategoryRequest,
) -> Result<Category, CategoryError> {
    let mut category = find_owned(pool, user_id, category_id).await?;

    category.name = request.name.trim().to_string();
    category.category_type = request.category_type.to_lowercase();
    category.updated_at = Utc::now();

    sqlx::query("UPDATE categories SET name = ?, type = ?, updated_at = ? WHERE id = ?")
        .bind(&category.name)
        .bind(&category.category_type)
        .bind(category.updated_at)
        .bind(&category.id)
        .execute(pool)
        .await?;

    Ok(category.to_shared()?)
}

/// Returns the deleted category.
pub async fn delete_category(
    pool: &SqlitePool,
    user_id: &Uuid,
    category_id: &Uuid,
) -> Result<Category, CategoryError> {
    let category = find_owned(pool, user_id, category_id).await?;

    let mut tx = pool.begin().await?;

    let in_use: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM expenses WHERE category_id = ?)")
            .bind(&category.id)
            .fetch_one(&mut *tx)
            .await?;
    if in_use {
        return Err(CategoryError::InUse);
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(&category.id)
        .execute(&mut *tx)
        .await;

    match result {
        Ok(_) => {
            tx.commit().await?;
            Ok(category.to_shared()?)
        }
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(CategoryError::InUse),
        Err(e) => Err(CategoryError::DatabaseError(e)),
    }
}
