use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::Amount,
    models::{CartLine, Product},
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Percentage in `0..=100`.
    #[serde(default)]
    pub discount: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Amount,
}

/// Outcome of a stock movement: the affected line and the product's new stock.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartMovement {
    pub line: CartLine,
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartCleared {
    pub restored_lines: usize,
}
