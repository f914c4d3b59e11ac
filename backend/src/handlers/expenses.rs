use actix_web::{web, HttpResponse};
use shared::{ApiSuccess, ExpenseRequest};

use crate::error::AppError;
use crate::handlers::parse_id;
use crate::middleware::{AuthUser, ListQuery};
use crate::models::AppState;
use crate::services::expenses as expense_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/expenses")
            .route("", web::get().to(list_expenses))
            .route("", web::post().to(create_expense))
            .route("/{expense_id}", web::get().to(get_expense))
            .route("/{expense_id}", web::put().to(update_expense))
            .route("/{expense_id}", web::delete().to(delete_expense)),
    );
}

fn validate(request: &ExpenseRequest) -> Result<(), AppError> {
    let errors = shared::validate_expense(request);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(())
}

async fn list_expenses(
    state: web::Data<AppState>,
    user: AuthUser,
    query: ListQuery,
) -> Result<HttpResponse, AppError> {
    let page = expense_service::list_expenses(&state.db, &user.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Expenses retrieved successfully", page)))
}

async fn get_expense(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let expense_id = parse_id(&path, "expense")?;
    let expense = expense_service::get_expense(&state.db, &user.user_id, &expense_id).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Expense retrieved successfully", expense)))
}

async fn create_expense(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<ExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    validate(&body)?;

    let expense = expense_service::create_expense(&state.db, &user.user_id, &body).await?;

    Ok(HttpResponse::Created().json(ApiSuccess::new("Expense created successfully", expense)))
}

async fn update_expense(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<ExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    let expense_id = parse_id(&path, "expense")?;
    validate(&body)?;

    let expense =
        expense_service::update_expense(&state.db, &user.user_id, &expense_id, &body).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Expense updated successfully", expense)))
}

async fn delete_expense(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let expense_id = parse_id(&path, "expense")?;
    let expense = expense_service::delete_expense(&state.db, &user.user_id, &expense_id).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Expense deleted successfully", expense)))
}
