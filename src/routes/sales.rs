use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::sales::{AddCartItemRequest, CartCleared, CartMovement, CartView},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/{id}", delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/sales/cart",
    responses(
        (status = 200, description = "Sale in progress for the current user", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = sale_service::get_cart(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sales/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Stock reserved and line added", body = ApiResponse<CartMovement>),
        (status = 400, description = "Invalid quantity, discount or insufficient stock"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartMovement>>> {
    let resp = sale_service::add_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sales/cart/items/{id}",
    params(("id" = Uuid, Path, description = "Cart line ID")),
    responses(
        (status = 200, description = "Line removed and stock restored", body = ApiResponse<CartMovement>),
        (status = 404, description = "Line not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartMovement>>> {
    let resp = sale_service::remove_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sales/cart",
    responses(
        (status = 200, description = "All lines removed and stock restored", body = ApiResponse<CartCleared>)
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartCleared>>> {
    let resp = sale_service::clear_cart(&state, &user).await?;
    Ok(Json(resp))
}
