use axum::http::StatusCode;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, Entity};
use catalog_products::{InventoryStatus, Product, ProductDraft, ProductFields};

use crate::app::errors;

// -------------------------
// Product payload
// -------------------------

/// JSON shape of a product on the wire.
///
/// Used for both requests and responses. Missing request fields take their
/// zero value and are then rejected by validation where that matters. `image`
/// travels as standard base64.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub category: String,
    pub price: f64,
    pub quantity: i32,
    pub internal_reference: String,
    pub shell_id: i32,
    pub inventory_status: String,
    pub rating: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProductDto {
    pub fn into_draft(self) -> Result<ProductDraft, axum::response::Response> {
        let image = match self.image.as_deref().map(|s| STANDARD.decode(s)).transpose() {
            Ok(image) => image,
            Err(e) => {
                return Err(errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_image",
                    format!("image must be base64 encoded: {e}"),
                ));
            }
        };

        let inventory_status = self
            .inventory_status
            .parse::<InventoryStatus>()
            .map_err(|e| errors::domain_error_to_response(DomainError::Validation(e)))?;

        let draft = ProductDraft::new(ProductFields {
            code: self.code,
            name: self.name,
            description: self.description,
            image,
            category: self.category,
            price: self.price,
            quantity: self.quantity,
            internal_reference: self.internal_reference,
            shell_id: self.shell_id,
            inventory_status,
            rating: self.rating,
            created_at: self.created_at,
            updated_at: self.updated_at,
        });

        Ok(match self.id {
            Some(id) => draft.with_id(id),
            None => draft,
        })
    }
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        Self {
            id: Some(p.id().to_string()),
            code: p.code().to_string(),
            name: p.name().to_string(),
            description: p.description().map(str::to_string),
            image: p.image().map(|bytes| STANDARD.encode(bytes)),
            category: p.category().to_string(),
            price: p.price(),
            quantity: p.quantity(),
            internal_reference: p.internal_reference().to_string(),
            shell_id: p.shell_id(),
            inventory_status: p.inventory_status().as_str().to_string(),
            rating: p.rating(),
            created_at: p.created_at(),
            updated_at: p.updated_at(),
        }
    }
}
