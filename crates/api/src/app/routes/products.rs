use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::dto::ProductDto;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn bad_body(rejection: JsonRejection) -> axum::response::Response {
    errors::json_error(StatusCode::BAD_REQUEST, "invalid_request_body", rejection.body_text())
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.products.get_all() {
        Ok(products) => Json(products.iter().map(ProductDto::from).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match services.products.create(draft) {
        Ok(product) => (StatusCode::CREATED, Json(ProductDto::from(&product))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.products.get_by_id(&id) {
        Ok(Some(product)) => Json(ProductDto::from(&product)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("product {id} does not exist"),
        ),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// The path id is used when the body carries none.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(mut body) = match body {
        Ok(b) => b,
        Err(rejection) => return bad_body(rejection),
    };
    if body.id.as_deref().is_none_or(|s| s.trim().is_empty()) {
        body.id = Some(id);
    }
    let draft = match body.into_draft() {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match services.products.update(draft) {
        Ok(product) => Json(ProductDto::from(&product)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.products.delete_by_id(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
