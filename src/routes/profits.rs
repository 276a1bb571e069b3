use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reports::ProductProfit, error::AppResult, middleware::auth::AuthUser,
    response::ApiResponse, services::report_service, state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(product_profits))
}

#[utoipa::path(
    get,
    path = "/api/profits",
    responses(
        (status = 200, description = "Margin per product on paid invoices", body = ApiResponse<Vec<ProductProfit>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn product_profits(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<ProductProfit>>>> {
    let resp = report_service::product_profits(&state, &user).await?;
    Ok(Json(resp))
}
