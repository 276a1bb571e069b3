use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        invoices::{InvoiceQuery, InvoiceSummary, UpdateInvoiceRequest},
        orders::{OrderList, OrderWithItems},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/summary", get(invoice_summary))
        .route("/{id}", get(get_invoice).put(update_invoice))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("limit" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort" = Option<String>, Query, description = "date | total | invoice_number | status"),
        ("direction" = Option<String>, Query, description = "asc | desc"),
        ("filter" = Option<String>, Query, description = "printed | unprinted"),
        ("status" = Option<String>, Query, description = "pending | paid | cancelled")
    ),
    responses(
        (status = 200, description = "List invoices", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<InvoiceQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = invoice_service::list_invoices(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/summary",
    responses(
        (status = 200, description = "Printed and unprinted totals", body = ApiResponse<InvoiceSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn invoice_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InvoiceSummary>>> {
    let resp = invoice_service::invoice_summary(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice with its lines", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = invoice_service::get_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice already paid or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn update_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = invoice_service::update_invoice(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
