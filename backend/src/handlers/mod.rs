use actix_web::web;
use uuid::Uuid;

use crate::error::AppError;

pub mod auth;
pub mod categories;
pub mod expenses;
pub mod health;
pub mod users;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(users::configure)
            .configure(categories::configure)
            .configure(expenses::configure),
    );
}

/// Everything an `App` needs besides its state: body limits and error
/// rendering for malformed JSON, the health probe and the API routes.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid request body: {}", err)).into()
    }))
    .configure(health::configure)
    .configure(configure_routes);
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation(format!("Invalid {} ID format", what)))
}
