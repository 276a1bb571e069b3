//! Thin typed wrapper over the REST API.
//!
//! Every call unwraps the `{message, data, meta}` envelope. There are no
//! retries: a failed call surfaces once, with the server's message.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    client::error::{ClientError, ClientResult},
    domain::{CashSnapshot, Period},
    dto::{
        auth::{LoginRequest, LoginResponse},
        orders::{CreateOrderRequest, OrderWithItems},
        payments::{PaymentReceipt, RecordPaymentRequest},
        products::ProductList,
        sales::{AddCartItemRequest, CartCleared, CartMovement, CartView},
        vouchers::{CreateVoucherRequest, UpdateVoucherRequest},
    },
    models::{Product, Voucher},
    response::ApiResponse,
};

const PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "api/auth/login")?.json(&payload);
        let resp: LoginResponse = self.send(request).await?;
        self.token = Some(resp.token.clone());
        debug!(user_id = %resp.user.id, "logged in");
        Ok(resp)
    }

    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> ClientResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.authed(Method::GET, path)?.query(query);
        self.send(request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.authed(Method::POST, path)?.json(body);
        self.send(request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.authed(Method::PUT, path)?.json(body);
        self.send(request).await
    }

    pub async fn delete<T>(&self, path: &str) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.authed(Method::DELETE, path)?;
        self.send(request).await
    }

    /// Walks every page of the catalogue.
    pub async fn all_products(&self) -> ClientResult<Vec<Product>> {
        let mut products = Vec::new();
        let mut page = 1;
        loop {
            let batch: ProductList = self
                .get(
                    "api/products",
                    &[("page", page), ("per_page", PAGE_SIZE)],
                )
                .await?;
            let len = batch.items.len() as i64;
            products.extend(batch.items);
            if len < PAGE_SIZE {
                return Ok(products);
            }
            page += 1;
        }
    }

    pub async fn cart(&self) -> ClientResult<CartView> {
        let request = self.authed(Method::GET, "api/sales/cart")?;
        self.send(request).await
    }

    pub async fn add_cart_item(&self, request: &AddCartItemRequest) -> ClientResult<CartMovement> {
        self.post("api/sales/cart/items", request).await
    }

    pub async fn remove_cart_item(&self, line_id: Uuid) -> ClientResult<CartMovement> {
        self.delete(&format!("api/sales/cart/items/{line_id}")).await
    }

    pub async fn clear_cart(&self) -> ClientResult<CartCleared> {
        self.delete("api/sales/cart").await
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<OrderWithItems> {
        self.post("api/orders", request).await
    }

    pub async fn lookup_invoice(&self, invoice_number: &str) -> ClientResult<OrderWithItems> {
        self.get(
            "api/payments/lookup",
            &[("invoice_number", invoice_number)],
        )
        .await
    }

    pub async fn record_payment(&self, request: &RecordPaymentRequest) -> ClientResult<PaymentReceipt> {
        self.post("api/payments", request).await
    }

    pub async fn create_voucher(&self, request: &CreateVoucherRequest) -> ClientResult<Voucher> {
        self.post("api/vouchers", request).await
    }

    pub async fn update_voucher(
        &self,
        voucher_number: &str,
        request: &UpdateVoucherRequest,
    ) -> ClientResult<Voucher> {
        self.put(&format!("api/vouchers/{voucher_number}"), request)
            .await
    }

    /// `date` defaults to the server's business day.
    pub async fn cash_drawer(
        &self,
        period: Period,
        date: Option<NaiveDate>,
    ) -> ClientResult<CashSnapshot> {
        let mut query = vec![("period", period.as_str().to_string())];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        let snapshot: CashSnapshot = self.get("api/payments/cash-drawer", &query).await?;
        Ok(snapshot.reconciled())
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.request(method, path)?.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = error_message(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Erreur inconnue")
                    .to_string()
            });
            debug!(status = status.as_u16(), %message, "request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> =
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("réponse sans données".into()))
    }
}

/// French message of an error envelope, `data.error` first.
fn error_message(body: &[u8]) -> Option<String> {
    let envelope: ApiResponse<serde_json::Value> = serde_json::from_slice(body).ok()?;
    envelope
        .data
        .as_ref()
        .and_then(|data| data.get("error"))
        .and_then(|error| error.as_str())
        .map(str::to_string)
        .or(Some(envelope.message))
        .filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_yields_server_message() {
        let body = r#"{"message":"Facture déjà payée","data":{"error":"Facture déjà payée"},"meta":{}}"#;
        assert_eq!(error_message(body.as_bytes()).as_deref(), Some("Facture déjà payée"));

        let fallback = r#"{"message":"Accès refusé","data":null,"meta":{}}"#;
        assert_eq!(error_message(fallback.as_bytes()).as_deref(), Some("Accès refusé"));
        assert_eq!(error_message(b"<html>bad gateway</html>"), None);
    }

    #[test]
    fn calls_without_session_are_refused_locally() {
        let client = ApiClient::new("http://localhost:3000", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.authed(Method::GET, "api/products"),
            Err(ClientError::NotAuthenticated)
        ));
        let url = client.request(Method::GET, "/api/products").unwrap().build().unwrap();
        assert_eq!(url.url().as_str(), "http://localhost:3000/api/products");
    }
}
