//! # Dependency Seams
//!
//! The orchestrator reaches its collaborators only through these traits. The actor
//! clients implement them; tests substitute stubs that inject failures.

use crate::model::{
    NewOrderItem, Order, OrderCreate, OrderId, OrderItem, OrderItemId, OrderStatus, Product,
    ProductId, User, UserId,
};
use crate::order_actor::StoreError;
use actor_framework::{FrameworkError, Listing, Page};
use async_trait::async_trait;
use resilience::{RemoteError, StatusCode};

/// The user service, as seen from across the network boundary.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `StatusCode::NotFound` when the user does not exist.
    async fn get_user(&self, id: UserId) -> Result<User, RemoteError>;
}

/// The product service, as seen from across the network boundary.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// `StatusCode::NotFound` when the product does not exist.
    async fn get_product(&self, id: ProductId) -> Result<Product, RemoteError>;
}

/// Persistence for orders and their items.
///
/// `create_order_with_items` is all-or-nothing. The other writes are independent of
/// each other; `remove_item`, `update_status` and `update_total` fail with a not-found
/// error when nothing matched.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order_with_items(&self, order: OrderCreate) -> Result<Order, StoreError>;

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Newest first, with the unpaged number of matching orders.
    async fn list_orders(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Listing<Order>, StoreError>;

    async fn add_item(&self, order_id: OrderId, item: NewOrderItem)
        -> Result<OrderItem, StoreError>;

    async fn remove_item(&self, order_id: OrderId, item_id: OrderItemId) -> Result<(), StoreError>;

    async fn update_status(&self, order_id: OrderId, status: OrderStatus)
        -> Result<(), StoreError>;

    async fn update_total(&self, order_id: OrderId, total: f64) -> Result<(), StoreError>;
}

/// How an in-process actor failure looks to a remote caller.
pub(crate) fn remote_error(e: FrameworkError) -> RemoteError {
    if e.is_disconnected() {
        RemoteError::unavailable(e.to_string())
    } else {
        RemoteError::status(StatusCode::Internal, e.to_string())
    }
}
