use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ApiError;
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::services::categories::CategoryError;
use crate::services::expenses::ExpenseError;
use crate::services::users::UserError;

/// Failure taxonomy surfaced at the HTTP boundary.
///
/// Every handler returns `Result<_, AppError>`; the `ResponseError` impl turns
/// each variant into the uniform `{success:false, message, error}` envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation Error")]
    Validation(Vec<String>),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Conflict(_) => "conflict",
            AppError::Authentication(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Persistence(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(errors) => AppError::Validation(errors),
            AuthError::UserAlreadyExists => AppError::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::InvalidRefreshToken => {
                AppError::Authentication(e.to_string())
            }
            AuthError::DatabaseError(e) => AppError::Persistence(e),
            AuthError::HashingError => AppError::Internal(e.to_string()),
            AuthError::TokenGeneration(ref source) => {
                AppError::Internal(format!("{}: {}", e, source))
            }
        }
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::EmailTaken => AppError::Conflict(e.to_string()),
            UserError::DatabaseError(e) => AppError::Persistence(e),
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(e: CategoryError) -> Self {
        match e {
            CategoryError::NotFound => AppError::NotFound(e.to_string()),
            CategoryError::Forbidden => AppError::Forbidden(e.to_string()),
            CategoryError::InUse => AppError::Conflict(e.to_string()),
            CategoryError::DatabaseError(e) => AppError::Persistence(e),
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(e: ExpenseError) -> Self {
        match e {
            ExpenseError::NotFound => AppError::NotFound(e.to_string()),
            ExpenseError::InvalidCategory => AppError::validation(e.to_string()),
            ExpenseError::DatabaseError(e) => AppError::Persistence(e),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => {
                ApiError::new(self.code(), self.to_string()).with_errors(errors.clone())
            }
            AppError::Persistence(e) => {
                log::error!("Database error: {:?}", e);
                ApiError::new(self.code(), "Internal server error")
            }
            AppError::Internal(message) => {
                log::error!("Internal error: {}", message);
                ApiError::new(self.code(), "Internal server error")
            }
            _ => ApiError::new(self.code(), self.to_string()),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_validation_error_lists_violations() {
        let (status, body) = render(AppError::Validation(vec![
            "name is required".to_string(),
            "email is required".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_persistence_error_hides_details() {
        let (status, body) = render(AppError::Persistence(sqlx::Error::RowNotFound)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_auth_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(AuthError::UserAlreadyExists),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidRefreshToken),
            AppError::Authentication(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::HashingError),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(ExpenseError::InvalidCategory),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(CategoryError::Forbidden),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Authentication("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
