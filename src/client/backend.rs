use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    client::{ApiClient, ClientResult},
    domain::{CashSnapshot, Period},
    dto::{
        orders::{CreateOrderRequest, OrderWithItems},
        sales::{AddCartItemRequest, CartMovement},
    },
    models::Product,
};

/// Backend operations the sale session and cash aggregator depend on.
pub trait PosBackend: Send + Sync {
    fn list_products(&self) -> impl Future<Output = ClientResult<Vec<Product>>> + Send;

    fn add_cart_item(
        &self,
        request: AddCartItemRequest,
    ) -> impl Future<Output = ClientResult<CartMovement>> + Send;

    fn remove_cart_item(
        &self,
        line_id: Uuid,
    ) -> impl Future<Output = ClientResult<CartMovement>> + Send;

    fn submit_sale(
        &self,
        request: CreateOrderRequest,
    ) -> impl Future<Output = ClientResult<OrderWithItems>> + Send;

    fn cash_drawer(
        &self,
        period: Period,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = ClientResult<CashSnapshot>> + Send;
}

impl PosBackend for ApiClient {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.all_products().await
    }

    async fn add_cart_item(&self, request: AddCartItemRequest) -> ClientResult<CartMovement> {
        ApiClient::add_cart_item(self, &request).await
    }

    async fn remove_cart_item(&self, line_id: Uuid) -> ClientResult<CartMovement> {
        ApiClient::remove_cart_item(self, line_id).await
    }

    async fn submit_sale(&self, request: CreateOrderRequest) -> ClientResult<OrderWithItems> {
        self.create_order(&request).await
    }

    async fn cash_drawer(
        &self,
        period: Period,
        date: Option<NaiveDate>,
    ) -> ClientResult<CashSnapshot> {
        ApiClient::cash_drawer(self, period, date).await
    }
}
