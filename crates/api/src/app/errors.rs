use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::{DomainError, ValidationError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(ValidationError::UnknownInventoryStatus(_)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_inventory_status", message)
        }
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::MalformedId(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_uuid_format", message)
        }
        DomainError::DuplicateCode(_) => {
            json_error(StatusCode::CONFLICT, "duplicate_product_code", message)
        }
        DomainError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Storage(_) => {
            tracing::error!(error = %message, "product store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
