use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{Amount, Period, VoucherStatus, VoucherTotals, VoucherType},
    models::Voucher,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateVoucherRequest {
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub amount: Amount,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateVoucherRequest {
    pub status: Option<VoucherStatus>,
    pub printed: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VoucherLookupQuery {
    pub voucher_number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VoucherListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(rename = "type")]
    pub voucher_type: Option<VoucherType>,
    pub status: Option<VoucherStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherList {
    pub items: Vec<Voucher>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoucherSummary {
    pub period: Period,
    pub date: NaiveDate,
    pub processed: VoucherTotals,
    pub processed_amount: Amount,
    pub processed_count: i64,
    pub pending_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VoucherDetail {
    pub id: Uuid,
    pub voucher_number: String,
    #[serde(rename = "type")]
    pub voucher_type: VoucherType,
    pub amount: Amount,
    pub description: String,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyVoucherDetails {
    pub date: NaiveDate,
    pub cash_in: Amount,
    pub cash_out: Amount,
    pub voucher_details: Vec<VoucherDetail>,
}
