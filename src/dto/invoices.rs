use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{Amount, OrderStatus},
    routes::params::SortOrder,
};

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceSort {
    Date,
    Total,
    InvoiceNumber,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PrintFilter {
    Printed,
    Unprinted,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InvoiceQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<InvoiceSort>,
    pub direction: Option<SortOrder>,
    pub filter: Option<PrintFilter>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateInvoiceRequest {
    pub status: Option<OrderStatus>,
    pub printed: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct InvoiceSummary {
    pub total_amount: Amount,
    pub total_printed: Amount,
    pub printed_count: i64,
    pub unprinted_count: i64,
}
