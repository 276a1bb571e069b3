use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{LimitQuery, MonthlySales, RecentPayment, TopProduct, YearQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/monthly-sales", get(monthly_sales))
        .route("/top-products", get(top_products))
        .route("/recent-payments", get(recent_payments))
}

#[utoipa::path(
    get,
    path = "/api/statistics/monthly-sales",
    params(("year" = Option<i32>, Query, description = "Default current year")),
    responses(
        (status = 200, description = "Paid sales per month", body = ApiResponse<Vec<MonthlySales>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn monthly_sales(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<ApiResponse<Vec<MonthlySales>>>> {
    let resp = report_service::monthly_sales(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/statistics/top-products",
    params(("limit" = Option<i64>, Query, description = "Default 5")),
    responses(
        (status = 200, description = "Best sellers by quantity", body = ApiResponse<Vec<TopProduct>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn top_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<Vec<TopProduct>>>> {
    let resp = report_service::top_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/statistics/recent-payments",
    params(("limit" = Option<i64>, Query, description = "Default 10")),
    responses(
        (status = 200, description = "Latest payments", body = ApiResponse<Vec<RecentPayment>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn recent_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<ApiResponse<Vec<RecentPayment>>>> {
    let resp = report_service::recent_payments(&state, &user, query).await?;
    Ok(Json(resp))
}
