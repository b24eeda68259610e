//! Order composition and decomposition.
//!
//! Creating an order is the one multi-document operation in the system: the
//! line items must be persisted first (the order references their ids), each
//! item's product price resolved, and the total snapshotted into the order
//! record. Deletion reverses this: remove the order, then each of its line
//! items, sequentially and awaited so the outcome is deterministic.
//!
//! The persistence collaborator is abstracted behind [`OrderStore`] - the
//! sqlx repository implements it in production, and the tests run against an
//! in-memory store. No transactions are assumed: multi-step operations are
//! best-effort sequential, and a failure mid-compose leaves the already
//! created line items orphaned (reported, not rolled back).

use rust_decimal::Decimal;
use thiserror::Error;

use cartwheel_core::{LineItemId, OrderId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::Order;

/// The persistence contract the composer/decomposer consumes.
///
/// Implementations must make `delete_line_item` idempotent: removing an item
/// that no longer exists is a success, not an error.
// Call sites always use concrete stores, so the futures need no Send bound.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Persist one line item and return its id.
    async fn create_line_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<LineItemId, RepositoryError>;

    /// Resolve a product's *current* unit price, `None` if it does not exist.
    async fn product_price(&self, id: ProductId) -> Result<Option<Decimal>, RepositoryError>;

    /// Persist the order record referencing already-created line items.
    async fn create_order(&self, new_order: NewOrder) -> Result<Order, RepositoryError>;

    /// Fetch an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Remove an order record. Returns `false` if it did not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError>;

    /// Remove a line item. Succeeds even if the item is already gone.
    async fn delete_line_item(&self, id: LineItemId) -> Result<(), RepositoryError>;
}

impl<S: OrderStore + Sync> OrderStore for &S {
    async fn create_line_item(
        &self,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<LineItemId, RepositoryError> {
        (**self).create_line_item(product_id, quantity).await
    }

    async fn product_price(&self, id: ProductId) -> Result<Option<Decimal>, RepositoryError> {
        (**self).product_price(id).await
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        (**self).create_order(new_order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        (**self).get_order(id).await
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError> {
        (**self).delete_order(id).await
    }

    async fn delete_line_item(&self, id: LineItemId) -> Result<(), RepositoryError> {
        (**self).delete_line_item(id).await
    }
}

/// One requested product-and-quantity pair.
#[derive(Debug, Clone, Copy)]
pub struct LineItemDraft {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A requested order: line items plus shipping metadata.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Requested items; submission order becomes the order's item sequence.
    pub items: Vec<LineItemDraft>,
    pub shipping_address1: String,
    pub shipping_address2: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub status: String,
    pub user_id: UserId,
}

/// The fully resolved order record handed to the store.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Line-item ids in submission order.
    pub order_item_ids: Vec<LineItemId>,
    pub shipping_address1: String,
    pub shipping_address2: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub status: String,
    /// Snapshot of `Σ price(product) × quantity` at composition time.
    pub total_price: Decimal,
    pub user_id: UserId,
}

/// Composition/decomposition failures, one kind per step so callers can
/// tell a bad request from a storage outage.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted item list was empty; the total would be undefined.
    #[error("order must contain at least one line item")]
    EmptyOrder,

    /// A requested quantity was not a positive integer.
    #[error("invalid quantity for product {product_id}")]
    InvalidQuantity {
        /// The product whose quantity was rejected.
        product_id: ProductId,
    },

    /// A referenced product does not exist. Line items created before this
    /// failure remain persisted and unreferenced.
    #[error("product {product_id} not found")]
    ProductNotFound {
        /// The offending product reference, for operator reconciliation.
        product_id: ProductId,
    },

    /// The order does not exist (decomposition only).
    #[error("order not found")]
    NotFound,

    /// The persistence collaborator failed; the caller may retry.
    #[error("storage error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Orchestrates order composition and decomposition over an [`OrderStore`].
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Create a new order service over a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Compose an order: persist line items, snapshot the total, persist the
    /// order referencing them.
    ///
    /// Step ordering is load-bearing: the order record depends on item ids
    /// and prices that do not exist until the items do.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyOrder`] for a zero-item request (checked before
    ///   anything is persisted)
    /// - [`OrderError::InvalidQuantity`] for a zero quantity (also pre-checked)
    /// - [`OrderError::ProductNotFound`] when a referenced product is absent;
    ///   items created earlier in the batch stay persisted, unreferenced
    /// - [`OrderError::Repository`] when the store fails
    pub async fn compose(&self, draft: OrderDraft) -> Result<Order, OrderError> {
        if draft.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        for item in &draft.items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id,
                });
            }
        }

        // Create line items in submission order; their ids define the
        // order's item sequence.
        let mut created: Vec<(LineItemId, LineItemDraft)> = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| OrderError::InvalidQuantity {
                    product_id: item.product_id,
                })?;
            let id = self.store.create_line_item(item.product_id, quantity).await?;
            created.push((id, *item));
        }

        // Resolve current prices and snapshot the total.
        let mut total_price = Decimal::ZERO;
        for (_, item) in &created {
            let price = self
                .store
                .product_price(item.product_id)
                .await?
                .ok_or_else(|| {
                    let orphaned: Vec<LineItemId> = created.iter().map(|(id, _)| *id).collect();
                    tracing::warn!(
                        product_id = %item.product_id,
                        orphaned_line_items = ?orphaned,
                        "order composition failed: product not found"
                    );
                    OrderError::ProductNotFound {
                        product_id: item.product_id,
                    }
                })?;
            total_price += price * Decimal::from(item.quantity);
        }

        let order = self
            .store
            .create_order(NewOrder {
                order_item_ids: created.iter().map(|(id, _)| *id).collect(),
                shipping_address1: draft.shipping_address1,
                shipping_address2: draft.shipping_address2,
                city: draft.city,
                zip: draft.zip,
                country: draft.country,
                phone: draft.phone,
                status: draft.status,
                total_price,
                user_id: draft.user_id,
            })
            .await?;

        tracing::info!(
            order_id = %order.id,
            items = order.order_item_ids.len(),
            total = %order.total_price,
            "order composed"
        );

        Ok(order)
    }

    /// Decompose an order: remove the order record, then each of its line
    /// items, sequentially and awaited.
    ///
    /// Line-item removal is idempotent, so a retried cleanup that finds an
    /// item already gone still succeeds. Only the initial order lookup is
    /// reported as `NotFound`.
    ///
    /// # Errors
    ///
    /// - [`OrderError::NotFound`] when no such order exists
    /// - [`OrderError::Repository`] when the store fails mid-cleanup (items
    ///   removed so far stay removed)
    pub async fn decompose(&self, id: OrderId) -> Result<(), OrderError> {
        let order = self.store.get_order(id).await?.ok_or(OrderError::NotFound)?;

        if !self.store.delete_order(id).await? {
            // Lost a race with a concurrent delete; same outcome for the caller.
            return Err(OrderError::NotFound);
        }

        for item_id in &order.order_item_ids {
            self.store.delete_line_item(*item_id).await?;
        }

        tracing::info!(
            order_id = %id,
            items = order.order_item_ids.len(),
            "order decomposed"
        );

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// In-memory stand-in for the persistence collaborator.
    #[derive(Default)]
    struct MemoryStore {
        inner: Mutex<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        next_id: i32,
        products: HashMap<ProductId, Decimal>,
        line_items: HashMap<LineItemId, (ProductId, i32)>,
        orders: HashMap<OrderId, Order>,
    }

    impl MemoryStore {
        fn with_products(products: &[(i32, &str)]) -> Self {
            let store = Self::default();
            {
                let mut inner = store.inner.lock().unwrap();
                for (id, price) in products {
                    inner
                        .products
                        .insert(ProductId::new(*id), price.parse().unwrap());
                }
            }
            store
        }

        fn set_price(&self, product_id: ProductId, price: &str) {
            self.inner
                .lock()
                .unwrap()
                .products
                .insert(product_id, price.parse().unwrap());
        }

        fn line_item_count(&self) -> usize {
            self.inner.lock().unwrap().line_items.len()
        }

        fn has_line_item(&self, id: LineItemId) -> bool {
            self.inner.lock().unwrap().line_items.contains_key(&id)
        }
    }

    impl OrderStore for MemoryStore {
        async fn create_line_item(
            &self,
            product_id: ProductId,
            quantity: i32,
        ) -> Result<LineItemId, RepositoryError> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = LineItemId::new(inner.next_id);
            inner.line_items.insert(id, (product_id, quantity));
            Ok(id)
        }

        async fn product_price(
            &self,
            id: ProductId,
        ) -> Result<Option<Decimal>, RepositoryError> {
            Ok(self.inner.lock().unwrap().products.get(&id).copied())
        }

        async fn create_order(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let order = Order {
                id: OrderId::new(inner.next_id),
                order_item_ids: new_order.order_item_ids,
                shipping_address1: new_order.shipping_address1,
                shipping_address2: new_order.shipping_address2,
                city: new_order.city,
                zip: new_order.zip,
                country: new_order.country,
                phone: new_order.phone,
                status: new_order.status,
                total_price: new_order.total_price,
                user_id: new_order.user_id,
                date_created: Utc::now(),
            };
            inner.orders.insert(order.id, order.clone());
            Ok(order)
        }

        async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
            Ok(self.inner.lock().unwrap().orders.get(&id).cloned())
        }

        async fn delete_order(&self, id: OrderId) -> Result<bool, RepositoryError> {
            Ok(self.inner.lock().unwrap().orders.remove(&id).is_some())
        }

        async fn delete_line_item(&self, id: LineItemId) -> Result<(), RepositoryError> {
            // Idempotent: removing a missing item is fine.
            self.inner.lock().unwrap().line_items.remove(&id);
            Ok(())
        }
    }

    fn draft(items: Vec<LineItemDraft>) -> OrderDraft {
        OrderDraft {
            items,
            shipping_address1: "1 Main St".to_string(),
            shipping_address2: String::new(),
            city: "Springfield".to_string(),
            zip: "12345".to_string(),
            country: "US".to_string(),
            phone: "555-0100".to_string(),
            status: "Pending".to_string(),
            user_id: UserId::new(1),
        }
    }

    fn item(product: i32, quantity: u32) -> LineItemDraft {
        LineItemDraft {
            product_id: ProductId::new(product),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_compose_snapshots_total_price() {
        let store = MemoryStore::with_products(&[(1, "10.00"), (2, "5.00")]);
        let service = OrderService::new(&store);

        let order = service
            .compose(draft(vec![item(1, 2), item(2, 1)]))
            .await
            .unwrap();

        assert_eq!(order.total_price, "25.00".parse().unwrap());
        assert_eq!(order.order_item_ids.len(), 2);

        // Repricing the product afterwards must not alter the stored total.
        store.set_price(ProductId::new(1), "99.99");
        let stored = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(stored.total_price, "25.00".parse().unwrap());
    }

    #[tokio::test]
    async fn test_compose_preserves_submission_order() {
        let store = MemoryStore::with_products(&[(1, "1.00"), (2, "2.00"), (3, "3.00")]);
        let service = OrderService::new(&store);

        let order = service
            .compose(draft(vec![item(3, 1), item(1, 1), item(2, 1)]))
            .await
            .unwrap();

        let inner = store.inner.lock().unwrap();
        let products: Vec<ProductId> = order
            .order_item_ids
            .iter()
            .map(|id| inner.line_items.get(id).unwrap().0)
            .collect();
        assert_eq!(
            products,
            vec![ProductId::new(3), ProductId::new(1), ProductId::new(2)]
        );
    }

    #[tokio::test]
    async fn test_compose_empty_order_rejected() {
        let store = MemoryStore::with_products(&[(1, "10.00")]);
        let service = OrderService::new(&store);

        let err = service.compose(draft(vec![])).await.unwrap_err();
        assert!(matches!(err, OrderError::EmptyOrder));
        // Nothing was persisted.
        assert_eq!(store.line_item_count(), 0);
    }

    #[tokio::test]
    async fn test_compose_zero_quantity_rejected_before_persisting() {
        let store = MemoryStore::with_products(&[(1, "10.00"), (2, "5.00")]);
        let service = OrderService::new(&store);

        let err = service
            .compose(draft(vec![item(1, 1), item(2, 0)]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidQuantity { product_id } if product_id == ProductId::new(2)
        ));
        assert_eq!(store.line_item_count(), 0);
    }

    #[tokio::test]
    async fn test_compose_unknown_product_orphans_earlier_items() {
        let store = MemoryStore::with_products(&[(1, "10.00")]);
        let service = OrderService::new(&store);

        let err = service
            .compose(draft(vec![item(1, 2), item(999, 1)]))
            .await
            .unwrap_err();

        // The error names the offending product...
        assert!(matches!(
            err,
            OrderError::ProductNotFound { product_id } if product_id == ProductId::new(999)
        ));
        // ...and the items created before the failure remain persisted.
        assert_eq!(store.line_item_count(), 2);
        assert!(store.inner.lock().unwrap().orders.is_empty());
    }

    #[tokio::test]
    async fn test_compose_passes_zero_price_through() {
        // Zero and negative resolved prices are arithmetic pass-through;
        // the product collaborator owns that data-integrity concern.
        let store = MemoryStore::with_products(&[(1, "0.00"), (2, "-2.50")]);
        let service = OrderService::new(&store);

        let order = service
            .compose(draft(vec![item(1, 3), item(2, 2)]))
            .await
            .unwrap();
        assert_eq!(order.total_price, "-5.00".parse().unwrap());
    }

    #[tokio::test]
    async fn test_decompose_removes_order_and_items() {
        let store = MemoryStore::with_products(&[(1, "10.00"), (2, "5.00")]);
        let service = OrderService::new(&store);

        let order = service
            .compose(draft(vec![item(1, 1), item(2, 1)]))
            .await
            .unwrap();
        let item_ids = order.order_item_ids.clone();

        service.decompose(order.id).await.unwrap();

        assert!(store.get_order(order.id).await.unwrap().is_none());
        for id in item_ids {
            assert!(!store.has_line_item(id));
        }
    }

    #[tokio::test]
    async fn test_decompose_missing_order_touches_nothing() {
        let store = MemoryStore::with_products(&[(1, "10.00")]);
        let service = OrderService::new(&store);

        let order = service.compose(draft(vec![item(1, 1)])).await.unwrap();

        let err = service.decompose(OrderId::new(9999)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound));

        // The existing order and its items are untouched.
        assert!(store.get_order(order.id).await.unwrap().is_some());
        assert_eq!(store.line_item_count(), 1);
    }

    #[tokio::test]
    async fn test_line_item_cleanup_is_idempotent() {
        let store = MemoryStore::with_products(&[(1, "10.00")]);
        let service = OrderService::new(&store);

        let order = service.compose(draft(vec![item(1, 1)])).await.unwrap();
        let item_id = *order.order_item_ids.first().unwrap();

        // Simulate a retried cleanup: the item is already gone.
        store.delete_line_item(item_id).await.unwrap();
        assert!(store.delete_line_item(item_id).await.is_ok());

        // Decompose still succeeds even though its items vanished early.
        service.decompose(order.id).await.unwrap();
    }
}
