use actix_web::{web, HttpResponse};
use shared::{ApiSuccess, CategoryRequest};

use crate::error::AppError;
use crate::handlers::parse_id;
use crate::middleware::{AuthUser, ListQuery};
use crate::models::AppState;
use crate::services::categories as category_service;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/categories")
            // Fixed segments before /{category_id} so "default" is not taken for an id
            .route("", web::get().to(list_categories))
            .route("", web::post().to(create_category))
            .route("/default", web::get().to(list_default_categories))
            .route("/multiple", web::post().to(create_categories))
            .route("/{category_id}", web::get().to(get_category))
            .route("/{category_id}", web::put().to(update_category))
            .route("/{category_id}", web::delete().to(delete_category)),
    );
}

fn validate(request: &CategoryRequest) -> Result<(), AppError> {
    let errors = shared::validate_category(request);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(())
}

async fn list_categories(
    state: web::Data<AppState>,
    user: AuthUser,
    query: ListQuery,
) -> Result<HttpResponse, AppError> {
    let page = category_service::list_categories(&state.db, &user.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Categories retrieved successfully", page)))
}

async fn list_default_categories(
    state: web::Data<AppState>,
    _user: AuthUser,
) -> Result<HttpResponse, AppError> {
    let categories = category_service::list_default_categories(&state.db).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new(
        "Default categories retrieved successfully",
        categories,
    )))
}

async fn get_category(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let category_id = parse_id(&path, "category")?;
    let category = category_service::get_category(&state.db, &user.user_id, &category_id).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Category retrieved successfully", category)))
}

async fn create_category(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    validate(&body)?;

    let category = category_service::create_category(&state.db, &user.user_id, &body).await?;
    log::info!("User {} created category {}", user.user_id, category.id);

    Ok(HttpResponse::Created().json(ApiSuccess::new("Category created successfully", category)))
}

async fn create_categories(
    state: web::Data<AppState>,
    user: AuthUser,
    body: web::Json<Vec<CategoryRequest>>,
) -> Result<HttpResponse, AppError> {
    if body.is_empty() {
        return Err(AppError::validation("at least one category is required"));
    }

    let errors: Vec<String> = body
        .iter()
        .enumerate()
        .flat_map(|(index, request)| {
            shared::validate_category(request)
                .into_iter()
                .map(move |e| format!("categories[{}]: {}", index, e))
        })
        .collect();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let categories = category_service::create_categories(&state.db, &user.user_id, &body).await?;

    Ok(HttpResponse::Created().json(ApiSuccess::new(
        "Categories created successfully",
        categories,
    )))
}

async fn update_category(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let category_id = parse_id(&path, "category")?;
    validate(&body)?;

    let category =
        category_service::update_category(&state.db, &user.user_id, &category_id, &body).await?;

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Category updated successfully", category)))
}

async fn delete_category(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let category_id = parse_id(&path, "category")?;
    let category = category_service::delete_category(&state.db, &user.user_id, &category_id).await?;
    log::info!("User {} deleted category {}", user.user_id, category.id);

    Ok(HttpResponse::Ok().json(ApiSuccess::new("Category deleted successfully", category)))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    use crate::handlers::configure_app;
    use crate::handlers::test_support::{app_data, bearer, body, register_body};

    #[actix_web::test]
    async fn test_category_routes() {
        let (state, tokens) = app_data().await;
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(tokens)
                .configure(configure_app),
        )
        .await;

        let mut tokens = Vec::new();
        for email in ["a@x.com", "b@x.com"] {
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(register_body(email))
                .to_request();
            let registered = body(test::call_service(&app, req).await).await;
            tokens.push(registered["data"]["token"].as_str().unwrap().to_string());
        }
        let (alice, bob) = (&tokens[0], &tokens[1]);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/default")
            .insert_header(bearer(alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let defaults = body(resp).await;
        assert_eq!(defaults["data"].as_array().unwrap().len(), 6);
        let default_id = defaults["data"][0]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/categories/multiple")
            .insert_header(bearer(alice))
            .set_json(json!([
                { "name": "Hobby", "type": "expense" },
                { "name": "Freelance", "type": "income" }
            ]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = body(resp).await;
        let hobby_id = created["data"][0]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri("/api/v1/categories?type=income&limit=5")
            .insert_header(bearer(alice))
            .to_request();
        let page = body(test::call_service(&app, req).await).await;
        assert_eq!(page["data"]["total"], 1);
        assert_eq!(page["data"]["limit"], 5);
        assert_eq!(page["data"]["data"][0]["name"], "Freelance");

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/categories/{}", hobby_id))
            .insert_header(bearer(bob))
            .set_json(json!({ "name": "Stolen", "type": "expense" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/categories/{}", default_id))
            .insert_header(bearer(alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/categories/{}", hobby_id))
            .insert_header(bearer(bob))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/v1/categories/not-a-uuid")
            .insert_header(bearer(alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(alice))
            .set_json(json!({ "name": "X", "type": "savings" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(resp).await["errors"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::post()
            .uri("/api/v1/expenses")
            .insert_header(bearer(alice))
            .set_json(json!({ "name": "Paint", "amount": 8.0, "category_id": hobby_id }))
            .to_request();
        let paint = body(test::call_service(&app, req).await).await;
        let paint_uri = format!("/api/v1/expenses/{}", paint["data"]["id"].as_str().unwrap());

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/categories/{}", hobby_id))
            .insert_header(bearer(alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(body(resp).await["error"], "conflict");

        let req = test::TestRequest::delete()
            .uri(&paint_uri)
            .insert_header(bearer(alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/v1/categories/{}", hobby_id))
            .insert_header(bearer(alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}
