//! The sale form: a local mirror of the catalogue kept in step with the
//! server-side cart.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    client::{ClientError, ClientResult, PosBackend},
    domain::{Amount, money::order_total, validation::validate_sale_item},
    dto::{
        orders::{CreateOrderRequest, OrderWithItems},
        sales::{AddCartItemRequest, CartMovement},
    },
    models::{CartLine, Product},
    services::order_service::EMPTY_SALE,
};

pub struct SaleSession<B> {
    backend: B,
    products: Vec<Product>,
    stock_overrides: HashMap<Uuid, i32>,
    items: Vec<CartLine>,
}

impl<B: PosBackend> SaleSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            products: Vec::new(),
            stock_overrides: HashMap::new(),
            items: Vec::new(),
        }
    }

    /// Loads the catalogue and drops local stock patches.
    pub async fn reload(&mut self) -> ClientResult<()> {
        let products = self.backend.list_products().await?;
        self.products = products;
        self.stock_overrides.clear();
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    pub fn total(&self) -> Amount {
        order_total(self.items.iter().map(|line| line.total))
    }

    /// Stock shown for a product: the local patch if any, else the last fetched value.
    pub fn displayed_stock(&self, product_id: Uuid) -> Option<i32> {
        self.stock_overrides.get(&product_id).copied().or_else(|| {
            self.products
                .iter()
                .find(|p| p.id == product_id)
                .map(|p| p.stock)
        })
    }

    pub async fn add_item(
        &mut self,
        product_id: Uuid,
        quantity: i32,
        discount: i32,
    ) -> ClientResult<&CartLine> {
        let available = self
            .displayed_stock(product_id)
            .ok_or_else(|| ClientError::Validation("Produit introuvable".into()))?;
        validate_sale_item(quantity, discount, available)?;

        let movement = self
            .backend
            .add_cart_item(AddCartItemRequest {
                product_id,
                quantity,
                discount,
            })
            .await
            .inspect_err(|err| warn!(%product_id, error = %err, "add to sale failed"))?;

        debug!(%product_id, quantity, stock = movement.product.stock, "item added");
        self.apply_stock(&movement);
        self.items.push(movement.line);
        Ok(&self.items[self.items.len() - 1])
    }

    pub async fn remove_item(&mut self, index: usize) -> ClientResult<CartLine> {
        let line_id = self
            .items
            .get(index)
            .map(|line| line.id)
            .ok_or_else(|| ClientError::Validation("Ligne introuvable".into()))?;

        let movement = self
            .backend
            .remove_cart_item(line_id)
            .await
            .inspect_err(|err| warn!(%line_id, error = %err, "remove from sale failed"))?;

        self.apply_stock(&movement);
        Ok(self.items.remove(index))
    }

    /// Turns the current items into a pending invoice.
    pub async fn submit(&mut self, save_as_draft: bool) -> ClientResult<OrderWithItems> {
        if self.items.is_empty() {
            return Err(ClientError::Validation(EMPTY_SALE.into()));
        }
        let order = self
            .backend
            .submit_sale(CreateOrderRequest { save_as_draft })
            .await?;
        self.items.clear();
        Ok(order)
    }

    fn apply_stock(&mut self, movement: &CartMovement) {
        let product = &movement.product;
        self.stock_overrides.insert(product.id, product.stock);
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product.clone(),
            None => self.products.push(product.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::client::fake::FakeBackend;

    async fn session_with(stock: i32) -> (SaleSession<FakeBackend>, Uuid) {
        let (backend, id) = FakeBackend::with_product("Riz parfumé 5 kg", 4_500_00, stock);
        let mut session = SaleSession::new(backend);
        session.reload().await.unwrap();
        (session, id)
    }

    #[tokio::test]
    async fn adding_then_removing_restores_stock() {
        let (mut session, id) = session_with(10).await;

        let line = session.add_item(id, 3, 0).await.unwrap();
        assert_eq!(line.total, 13_500_00);
        assert_eq!(session.displayed_stock(id), Some(7));
        assert_eq!(session.backend.stock(id), Some(7));

        let removed = session.remove_item(0).await.unwrap();
        assert_eq!(removed.quantity, 3);
        assert_eq!(session.displayed_stock(id), Some(10));
        assert_eq!(session.backend.stock(id), Some(10));
        assert!(session.items().is_empty());
    }

    #[tokio::test]
    async fn quantity_above_displayed_stock_never_reaches_backend() {
        let (mut session, id) = session_with(2).await;
        let calls = session.backend.call_count();

        let err = session.add_item(id, 3, 0).await.unwrap_err();

        assert_eq!(err.to_string(), "Seulement 2 unités disponibles");
        assert_eq!(session.backend.call_count(), calls);
        assert!(matches!(
            session.add_item(id, 0, 0).await,
            Err(ClientError::Validation(_))
        ));
        assert!(matches!(
            session.add_item(id, 1, 120).await,
            Err(ClientError::Validation(_))
        ));
        assert_eq!(session.backend.call_count(), calls);
    }

    #[tokio::test]
    async fn backend_failure_leaves_session_untouched() {
        let (mut session, id) = session_with(10).await;
        session.add_item(id, 2, 10).await.unwrap();
        let products = session.products().to_vec();
        let items = session.items().to_vec();

        session.backend.failing.store(true, Ordering::SeqCst);
        let err = session.add_item(id, 1, 0).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(session.remove_item(0).await.is_err());

        assert_eq!(session.products(), products.as_slice());
        assert_eq!(session.items(), items.as_slice());
        assert_eq!(session.displayed_stock(id), Some(8));
    }

    #[tokio::test]
    async fn server_rejection_of_stale_stock_is_reported() {
        let (mut session, id) = session_with(5).await;
        // Another till sold most of the stock since the last reload.
        session.backend.set_stock(id, 1);

        let err = session.add_item(id, 4, 0).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(session.displayed_stock(id), Some(5));

        session.reload().await.unwrap();
        assert_eq!(session.displayed_stock(id), Some(1));
    }

    #[tokio::test]
    async fn submit_requires_items_and_empties_the_sale() {
        let (mut session, id) = session_with(10).await;
        assert!(matches!(
            session.submit(false).await,
            Err(ClientError::Validation(msg)) if msg == EMPTY_SALE
        ));

        session.add_item(id, 2, 0).await.unwrap();
        session.add_item(id, 1, 50).await.unwrap();
        assert_eq!(session.total(), 9_000_00 + 2_250_00);

        let invoice = session.submit(false).await.unwrap();
        assert_eq!(invoice.order.total, 11_250_00);
        assert!(session.items().is_empty());
        assert_eq!(session.displayed_stock(id), Some(7));
    }
}
