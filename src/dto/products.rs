use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::Amount, models::Product};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub purchase_price: Amount,
    pub selling_price: Amount,
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub purchase_price: Option<Amount>,
    pub selling_price: Option<Amount>,
    pub stock: Option<i32>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
