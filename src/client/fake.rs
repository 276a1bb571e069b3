use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    client::{ClientError, ClientResult, PosBackend},
    domain::{CashSnapshot, OrderStatus, Period, line_total, validation::insufficient_stock},
    dto::{
        orders::{CreateOrderRequest, OrderWithItems},
        sales::{AddCartItemRequest, CartMovement},
    },
    models::{CartLine, Order, Product},
};

/// In-memory backend mirroring the server's stock bookkeeping.
#[derive(Default)]
pub struct FakeBackend {
    products: Mutex<HashMap<Uuid, Product>>,
    lines: Mutex<Vec<CartLine>>,
    snapshots: Mutex<Vec<ClientResult<CashSnapshot>>>,
    pub calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl FakeBackend {
    pub fn with_product(name: &str, selling_price: i64, stock: i32) -> (Self, Uuid) {
        let backend = FakeBackend::default();
        let id = Uuid::new_v4();
        let now = Utc::now();
        backend.lock_products().insert(
            id,
            Product {
                id,
                name: name.to_string(),
                purchase_price: selling_price / 2,
                selling_price,
                stock,
                created_at: now,
                updated_at: now,
            },
        );
        (backend, id)
    }

    pub fn stock(&self, id: Uuid) -> Option<i32> {
        self.lock_products().get(&id).map(|p| p.stock)
    }

    pub fn set_stock(&self, id: Uuid, stock: i32) {
        if let Some(product) = self.lock_products().get_mut(&id) {
            product.stock = stock;
        }
    }

    /// Queues the answers of upcoming `cash_drawer` calls.
    pub fn push_snapshot(&self, result: ClientResult<CashSnapshot>) {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock_products(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Product>> {
        self.products.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn enter(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 503,
                message: "Service indisponible".into(),
            });
        }
        Ok(())
    }
}

impl PosBackend for FakeBackend {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.enter()?;
        Ok(self.lock_products().values().cloned().collect())
    }

    async fn add_cart_item(&self, request: AddCartItemRequest) -> ClientResult<CartMovement> {
        self.enter()?;
        let mut products = self.lock_products();
        let product = products.get_mut(&request.product_id).ok_or(ClientError::Api {
            status: 404,
            message: "Produit introuvable".into(),
        })?;
        if product.stock < request.quantity {
            return Err(ClientError::Api {
                status: 400,
                message: insufficient_stock(product.stock).to_string(),
            });
        }
        let total = line_total(product.selling_price, request.quantity, request.discount)?;
        product.stock -= request.quantity;
        let line = CartLine {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: request.quantity,
            unit_price: product.selling_price,
            discount: request.discount,
            total,
            created_at: Utc::now(),
        };
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.clone());
        Ok(CartMovement {
            line,
            product: product.clone(),
        })
    }

    async fn remove_cart_item(&self, line_id: Uuid) -> ClientResult<CartMovement> {
        self.enter()?;
        let line = {
            let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
            let index = lines
                .iter()
                .position(|l| l.id == line_id)
                .ok_or(ClientError::Api {
                    status: 404,
                    message: "Ligne introuvable".into(),
                })?;
            lines.remove(index)
        };
        let mut products = self.lock_products();
        let product = products.get_mut(&line.product_id).ok_or(ClientError::Api {
            status: 404,
            message: "Produit introuvable".into(),
        })?;
        product.stock += line.quantity;
        Ok(CartMovement {
            line,
            product: product.clone(),
        })
    }

    async fn submit_sale(&self, _request: CreateOrderRequest) -> ClientResult<OrderWithItems> {
        self.enter()?;
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        let total = lines.iter().map(|l| l.total).sum();
        lines.clear();
        let now = Utc::now();
        Ok(OrderWithItems {
            order: Order {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                invoice_number: "INV-20240514-001".into(),
                total,
                status: OrderStatus::Pending,
                printed: false,
                paid_at: None,
                created_at: now,
                updated_at: now,
            },
            items: Vec::new(),
        })
    }

    async fn cash_drawer(
        &self,
        period: Period,
        date: Option<NaiveDate>,
    ) -> ClientResult<CashSnapshot> {
        self.enter()?;
        let mut queued = self.snapshots.lock().unwrap_or_else(|e| e.into_inner());
        if queued.is_empty() {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            return Ok(CashSnapshot::new(period, date, 0, Default::default(), 0));
        }
        queued.remove(0)
    }
}
