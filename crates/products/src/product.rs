use core::str::FromStr;

use catalog_core::{Entity, ProductId, ValidationError};

/// Stock-level classification of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InventoryStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl InventoryStatus {
    pub const ALL: [InventoryStatus; 3] = [
        InventoryStatus::InStock,
        InventoryStatus::LowStock,
        InventoryStatus::OutOfStock,
    ];

    /// Canonical token, as stored and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::InStock => "INSTOCK",
            InventoryStatus::LowStock => "LOWSTOCK",
            InventoryStatus::OutOfStock => "OUTOFSTOCK",
        }
    }
}

impl core::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the canonical tokens and the underscored spellings (`IN_STOCK`),
/// case-insensitively.
impl FromStr for InventoryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "").as_str() {
            "INSTOCK" => Ok(InventoryStatus::InStock),
            "LOWSTOCK" => Ok(InventoryStatus::LowStock),
            "OUTOFSTOCK" => Ok(InventoryStatus::OutOfStock),
            _ => Err(ValidationError::UnknownInventoryStatus(s.to_string())),
        }
    }
}

/// Every product attribute except identity.
///
/// Timestamps are epoch milliseconds; `0` means "not set yet".
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<Vec<u8>>,
    pub category: String,
    pub price: f64,
    pub quantity: i32,
    pub internal_reference: String,
    pub shell_id: i32,
    pub inventory_status: InventoryStatus,
    pub rating: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProductFields {
    /// Check every entity invariant, reporting the first one broken.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quantity < 0 {
            return Err(ValidationError::NegativeQuantity(self.quantity));
        }
        // NaN fails `>=` as well.
        if !(self.price >= 0.0) {
            return Err(ValidationError::NegativePrice(self.price));
        }
        if is_blank(&self.code) {
            return Err(ValidationError::EmptyCode);
        }
        if is_blank(&self.name) {
            return Err(ValidationError::EmptyName);
        }
        if is_blank(&self.category) {
            return Err(ValidationError::EmptyCategory);
        }
        if is_blank(&self.internal_reference) {
            return Err(ValidationError::EmptyInternalReference);
        }
        if !(0..=5).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Product aggregate.
///
/// [`Product::new`] is the only path that establishes the invariants. The
/// `set_*` mutators exist for the owning service (timestamps, identity) and do
/// not re-validate; call [`Product::validate`] after mutating if in doubt.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    fields: ProductFields,
}

impl Product {
    pub fn new(id: ProductId, fields: ProductFields) -> Result<Self, ValidationError> {
        fields.validate()?;
        Ok(Self { id, fields })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.fields.validate()
    }

    pub fn into_fields(self) -> ProductFields {
        self.fields
    }

    pub fn fields(&self) -> &ProductFields {
        &self.fields
    }

    pub fn code(&self) -> &str {
        &self.fields.code
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn description(&self) -> Option<&str> {
        self.fields.description.as_deref()
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.fields.image.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.fields.category
    }

    pub fn price(&self) -> f64 {
        self.fields.price
    }

    pub fn quantity(&self) -> i32 {
        self.fields.quantity
    }

    pub fn internal_reference(&self) -> &str {
        &self.fields.internal_reference
    }

    pub fn shell_id(&self) -> i32 {
        self.fields.shell_id
    }

    pub fn inventory_status(&self) -> InventoryStatus {
        self.fields.inventory_status
    }

    pub fn rating(&self) -> i32 {
        self.fields.rating
    }

    pub fn created_at(&self) -> i64 {
        self.fields.created_at
    }

    pub fn updated_at(&self) -> i64 {
        self.fields.updated_at
    }

    pub fn set_id(&mut self, id: ProductId) {
        self.id = id;
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.fields.code = code.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.fields.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.fields.description = description;
    }

    pub fn set_image(&mut self, image: Option<Vec<u8>>) {
        self.fields.image = image;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.fields.category = category.into();
    }

    pub fn set_price(&mut self, price: f64) {
        self.fields.price = price;
    }

    pub fn set_quantity(&mut self, quantity: i32) {
        self.fields.quantity = quantity;
    }

    pub fn set_internal_reference(&mut self, internal_reference: impl Into<String>) {
        self.fields.internal_reference = internal_reference.into();
    }

    pub fn set_shell_id(&mut self, shell_id: i32) {
        self.fields.shell_id = shell_id;
    }

    pub fn set_inventory_status(&mut self, inventory_status: InventoryStatus) {
        self.fields.inventory_status = inventory_status;
    }

    pub fn set_rating(&mut self, rating: i32) {
        self.fields.rating = rating;
    }

    pub fn set_created_at(&mut self, created_at: i64) {
        self.fields.created_at = created_at;
    }

    pub fn set_updated_at(&mut self, updated_at: i64) {
        self.fields.updated_at = updated_at;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
