use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bilan;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod invoices;
pub mod orders;
pub mod params;
pub mod payments;
pub mod products;
pub mod profits;
pub mod sales;
pub mod statistics;
pub mod users;
pub mod vouchers;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/sales", sales::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
        .nest("/payments", payments::router())
        .nest("/vouchers", vouchers::router())
        .nest("/bilan", bilan::router())
        .nest("/dashboard", dashboard::router())
        .nest("/statistics", statistics::router())
        .nest("/profits", profits::router())
}
