use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{Amount, Period},
    models::{Order, Payment},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvoiceLookupQuery {
    pub invoice_number: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordPaymentRequest {
    pub order_id: Uuid,
    pub amount: Amount,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub order: Order,
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CashDrawerQuery {
    pub period: Option<Period>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct DailyPayment {
    pub invoice_number: String,
    pub amount: Amount,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DailyPayments {
    pub date: NaiveDate,
    pub payments: Vec<DailyPayment>,
    pub total: Amount,
}
