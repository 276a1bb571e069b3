use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::reports::{CloseDayRequest, DashboardStats, RecentTransaction},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CashClosing,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard_stats))
        .route("/transactions", get(recent_transactions))
        .route("/close-day", post(close_day))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Today's figures", body = ApiResponse<DashboardStats>)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let resp = report_service::dashboard_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/transactions",
    responses(
        (status = 200, description = "Today's invoices and vouchers", body = ApiResponse<Vec<RecentTransaction>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn recent_transactions(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<RecentTransaction>>>> {
    let resp = report_service::recent_transactions(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/dashboard/close-day",
    request_body = CloseDayRequest,
    responses(
        (status = 200, description = "Day closed", body = ApiResponse<CashClosing>),
        (status = 409, description = "Day already closed")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn close_day(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CloseDayRequest>,
) -> AppResult<Json<ApiResponse<CashClosing>>> {
    let resp = report_service::close_day(&state, &user, payload).await?;
    Ok(Json(resp))
}
