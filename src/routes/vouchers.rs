use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};

use crate::{
    dto::{
        payments::{CashDrawerQuery, DateQuery},
        vouchers::{
            CreateVoucherRequest, DailyVoucherDetails, UpdateVoucherRequest, VoucherList,
            VoucherListQuery, VoucherLookupQuery, VoucherSummary,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Voucher,
    response::ApiResponse,
    services::voucher_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vouchers).post(create_voucher))
        .route("/lookup", get(lookup_voucher))
        .route("/summary", get(voucher_summary))
        .route("/daily", get(daily_voucher_details))
        .route("/{voucher_number}", put(update_voucher))
}

#[utoipa::path(
    get,
    path = "/api/vouchers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("type" = Option<String>, Query, description = "expense | output | entry"),
        ("status" = Option<String>, Query, description = "pending | processed | rejected")
    ),
    responses(
        (status = 200, description = "List vouchers", body = ApiResponse<VoucherList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn list_vouchers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VoucherListQuery>,
) -> AppResult<Json<ApiResponse<VoucherList>>> {
    let resp = voucher_service::list_vouchers(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/vouchers",
    request_body = CreateVoucherRequest,
    responses(
        (status = 200, description = "Voucher created", body = ApiResponse<Voucher>),
        (status = 400, description = "Invalid amount or description")
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn create_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateVoucherRequest>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::create_voucher(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/lookup",
    params(("voucher_number" = String, Query, description = "e.g. DEP-20240514-001")),
    responses(
        (status = 200, description = "Voucher awaiting processing", body = ApiResponse<Voucher>),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Voucher already processed or rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn lookup_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<VoucherLookupQuery>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::lookup_voucher(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/vouchers/{voucher_number}",
    params(("voucher_number" = String, Path, description = "Voucher number")),
    request_body = UpdateVoucherRequest,
    responses(
        (status = 200, description = "Voucher updated", body = ApiResponse<Voucher>),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Voucher already processed or rejected")
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn update_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(voucher_number): Path<String>,
    Json(payload): Json<UpdateVoucherRequest>,
) -> AppResult<Json<ApiResponse<Voucher>>> {
    let resp = voucher_service::update_voucher(&state, &user, &voucher_number, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/summary",
    params(
        ("period" = Option<String>, Query, description = "day | week | month | year, default day"),
        ("date" = Option<String>, Query, description = "YYYY-MM-DD, default today")
    ),
    responses(
        (status = 200, description = "Processed totals per type", body = ApiResponse<VoucherSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn voucher_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CashDrawerQuery>,
) -> AppResult<Json<ApiResponse<VoucherSummary>>> {
    let resp = voucher_service::voucher_summary(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/vouchers/daily",
    params(("date" = Option<String>, Query, description = "YYYY-MM-DD, default today")),
    responses(
        (status = 200, description = "Processed vouchers of a day", body = ApiResponse<DailyVoucherDetails>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vouchers"
)]
pub async fn daily_voucher_details(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<ApiResponse<DailyVoucherDetails>>> {
    let resp = voucher_service::daily_voucher_details(&state, &user, query).await?;
    Ok(Json(resp))
}
