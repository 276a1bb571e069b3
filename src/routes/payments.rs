use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    domain::CashSnapshot,
    dto::{
        orders::OrderWithItems,
        payments::{
            CashDrawerQuery, DailyPayments, DateQuery, InvoiceLookupQuery, PaymentReceipt,
            RecordPaymentRequest,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_payment))
        .route("/lookup", get(lookup_invoice))
        .route("/daily", get(daily_payments))
        .route("/cash-drawer", get(cash_drawer))
}

#[utoipa::path(
    get,
    path = "/api/payments/lookup",
    params(("invoice_number" = String, Query, description = "e.g. INV-20240514-001")),
    responses(
        (status = 200, description = "Pending invoice", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice already paid or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn lookup_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InvoiceLookupQuery>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = payment_service::lookup_invoice(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<PaymentReceipt>),
        (status = 400, description = "Amount differs from the invoice total"),
        (status = 409, description = "Invoice already paid or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentReceipt>>> {
    let resp = payment_service::record_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/daily",
    params(("date" = Option<String>, Query, description = "YYYY-MM-DD, default today")),
    responses(
        (status = 200, description = "Payments received on a day", body = ApiResponse<DailyPayments>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn daily_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<ApiResponse<DailyPayments>>> {
    let resp = payment_service::daily_payments(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/cash-drawer",
    params(
        ("period" = Option<String>, Query, description = "day | week | month | year, default day"),
        ("date" = Option<String>, Query, description = "YYYY-MM-DD, default today")
    ),
    responses(
        (status = 200, description = "Cash drawer balance", body = ApiResponse<CashSnapshot>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn cash_drawer(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CashDrawerQuery>,
) -> AppResult<Json<ApiResponse<CashSnapshot>>> {
    let resp = payment_service::cash_drawer(&state, &user, query).await?;
    Ok(Json(resp))
}
