use actix_web::{web, HttpResponse};
use shared::{ApiSuccess, ProfileResponse};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/user").route("/profile", web::get().to(get_profile)));
}

async fn get_profile(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, AppError> {
    let user = state
        .sessions
        .users()
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
        .to_shared()?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new(
        "Profile retrieved successfully",
        ProfileResponse { user },
    )))
}
