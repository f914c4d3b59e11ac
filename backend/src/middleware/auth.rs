use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::tokens::TokenIssuer;

/// Identity proven by a valid access token.
///
/// Protected handlers take this as an argument; extraction fails with 401
/// before the handler body runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub jti: String,
}

#[derive(Debug, PartialEq)]
pub enum AuthMiddlewareError {
    MissingToken,
    MalformedHeader,
    InvalidToken,
}

impl std::fmt::Display for AuthMiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMiddlewareError::MissingToken => write!(f, "Authorization header required"),
            AuthMiddlewareError::MalformedHeader => write!(f, "Invalid authorization header format"),
            AuthMiddlewareError::InvalidToken => write!(f, "Invalid or expired token"),
        }
    }
}

impl std::error::Error for AuthMiddlewareError {}

/// Exactly `Bearer <token>`: one space, case-sensitive scheme.
pub fn parse_bearer(value: &str) -> Result<&str, AuthMiddlewareError> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthMiddlewareError::MalformedHeader),
    }
}

/// Extract and validate the access token from the Authorization header
pub fn authenticate(req: &HttpRequest, tokens: &TokenIssuer) -> Result<AuthUser, AuthMiddlewareError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthMiddlewareError::MissingToken)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthMiddlewareError::MalformedHeader)?;

    if auth_str.is_empty() {
        return Err(AuthMiddlewareError::MissingToken);
    }

    let token = parse_bearer(auth_str)?;

    let claims = tokens
        .validate_access(token)
        .map_err(|_| AuthMiddlewareError::InvalidToken)?;

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.email,
        jti: claims.jti,
    })
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<TokenIssuer>>() {
            Some(tokens) => authenticate(req, tokens).map_err(|e| {
                log::debug!("Rejected request to {}: {}", req.path(), e);
                AppError::Authentication(e.to_string())
            }),
            None => Err(AppError::Internal(
                "token issuer is not registered as app data".to_string(),
            )),
        };

        ready(result)
    }
}
