use actix_web::{web, HttpResponse};
use shared::{
    ApiSuccess, LoginRequest, LogoutResponse, RefreshTokenRequest, RegisterRequest,
    RegisterResponse,
};

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::models::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh-token", web::post().to(refresh_token))
            .route("/logout", web::post().to(logout)),
    );
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let (user, session) = state.sessions.register(&body).await?;

    Ok(HttpResponse::Created().json(ApiSuccess::new(
        "User registered successfully",
        RegisterResponse {
            user,
            token: session.tokens.token,
            refresh_token: session.tokens.refresh_token,
        },
    )))
}

async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = state.sessions.login(&body).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Login successful", session.tokens)))
}

async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    if body.refresh_token.trim().is_empty() {
        return Err(AppError::validation("refresh_token is required"));
    }

    let session = state.sessions.refresh(&body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Token refreshed successfully", session.tokens)))
}

/// Revokes the session the presenting access token belongs to.
async fn logout(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse, AppError> {
    let revoked_sessions = state.sessions.logout(&user.jti).await?;

    let message = if revoked_sessions == 0 {
        "Already logged out"
    } else {
        "Logout successful"
    };

    Ok(HttpResponse::Ok().json(ApiSuccess::new(message, LogoutResponse { revoked_sessions })))
}
