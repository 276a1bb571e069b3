use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{payments::DateQuery, reports::BilanReport},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(daily_bilan))
}

#[utoipa::path(
    get,
    path = "/api/bilan",
    params(("date" = Option<String>, Query, description = "YYYY-MM-DD, default today")),
    responses(
        (status = 200, description = "Daily reconciliation", body = ApiResponse<BilanReport>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn daily_bilan(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<ApiResponse<BilanReport>>> {
    let resp = report_service::bilan(&state, &user, query).await?;
    Ok(Json(resp))
}
