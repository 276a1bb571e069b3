use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Amount, VoucherTotals};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BilanLine {
    pub reference: String,
    pub amount: Amount,
}

/// Daily reconciliation of payments and processed vouchers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BilanReport {
    pub date: NaiveDate,
    pub payments: Vec<BilanLine>,
    pub entry_vouchers: Vec<BilanLine>,
    pub output_vouchers: Vec<BilanLine>,
    pub expense_vouchers: Vec<BilanLine>,
    pub payments_total: Amount,
    pub entry_total: Amount,
    pub output_total: Amount,
    pub expense_total: Amount,
    pub cash_balance: Amount,
    pub previous_day_cash: Amount,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_sales: Amount,
    pub products_count: i64,
    pub orders_count: i64,
    pub vouchers_count: i64,
    pub daily_cash: Amount,
    pub last_reset_date: Option<NaiveDate>,
    pub vouchers_breakdown: VoucherTotals,
    pub net_cash_flow: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Order,
    Voucher,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentTransaction {
    pub id: Uuid,
    pub reference: String,
    pub date: DateTime<Utc>,
    pub amount: Amount,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CloseDayRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlySales {
    pub month: u32,
    pub label: String,
    pub sales: Amount,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct TopProduct {
    pub name: String,
    pub quantity: i64,
    pub revenue: Amount,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct RecentPayment {
    pub id: Uuid,
    pub invoice_number: String,
    pub amount: Amount,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct ProductProfit {
    pub product_id: Uuid,
    pub product_name: String,
    pub purchase_price: Amount,
    pub selling_price: Amount,
    pub quantity_sold: i64,
    pub total_revenue: Amount,
    pub total_profit: Amount,
}
