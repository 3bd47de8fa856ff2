//! # Order Orchestrator
//!
//! Validates the user and the products of an order against their services, prices the
//! items, computes the total and stores the order. Nothing is written until every
//! validation has succeeded.
//!
//! ## Item mutations
//!
//! Adding or removing an item is followed by a reload of the order and a separate
//! write of the total recomputed from the reloaded items. If that second write fails
//! the item change stays in place and the error is returned; the stored total is
//! stale until the next successful mutation.
//!
//! ## Deadline
//!
//! The request deadline bounds the remote validation calls only. Once validation has
//! passed, the store writes run to completion, so a `DeadlineExceeded` error always
//! means nothing was written.
//!
//! ## Failure mapping
//!
//! A failed remote call is judged by the classifier of the guard that made it. An
//! error the classifier charges to the dependency becomes `DependencyUnavailable`;
//! any other error is a verdict on the request and becomes `ValidationFailure`.

mod error;
mod request;

pub use error::OrderError;
pub use request::*;

use crate::clients::OrderStore;
use crate::model::{
    order_total, NewOrderItem, Order, OrderCreate, OrderId, OrderItemId, ProductId, UserId,
};
use crate::validators::{ProductValidator, UserValidator};
use actor_framework::Listing;
use futures::future::try_join_all;
use resilience::{CallOutcome, GuardedCaller};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// How the products of a new order are validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemValidation {
    /// One at a time, in request order.
    #[default]
    Sequential,
    /// All at once. The first failure cancels the lookups still in flight.
    Concurrent,
}

impl FromStr for ItemValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(ItemValidation::Sequential),
            "concurrent" => Ok(ItemValidation::Concurrent),
            other => Err(format!("unknown item validation mode {other:?}")),
        }
    }
}

/// Maps a finished validator call to the orchestrator's error taxonomy.
fn check<T>(guard: &GuardedCaller, subject: String, outcome: CallOutcome<T>) -> Result<T, OrderError> {
    let dependency = guard.breaker().name();
    match outcome {
        CallOutcome::Success(value) => Ok(value),
        CallOutcome::RemoteFailure(e) if !guard.counts_as_failure(&e) => {
            Err(OrderError::ValidationFailure(format!("{subject}: {e}")))
        }
        CallOutcome::RemoteFailure(source) => {
            warn!(dependency, %source, "Dependency call failed");
            Err(OrderError::DependencyUnavailable {
                dependency: dependency.to_string(),
                source,
            })
        }
        CallOutcome::BreakerRejected(rejection) => {
            warn!(dependency, %rejection, "Dependency call rejected");
            Err(OrderError::BreakerOpen {
                dependency: dependency.to_string(),
                rejection,
            })
        }
    }
}

/// Creates, reads and mutates orders.
#[derive(Clone)]
pub struct OrderOrchestrator {
    users: UserValidator,
    products: ProductValidator,
    store: Arc<dyn OrderStore>,
    item_validation: ItemValidation,
    request_timeout: Option<Duration>,
}

impl OrderOrchestrator {
    pub fn new(users: UserValidator, products: ProductValidator, store: Arc<dyn OrderStore>) -> Self {
        Self {
            users,
            products,
            store,
            item_validation: ItemValidation::default(),
            request_timeout: None,
        }
    }

    pub fn with_item_validation(mut self, mode: ItemValidation) -> Self {
        self.item_validation = mode;
        self
    }

    /// Deadline for the remote validation phase of `create_order` and `add_order_item`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    async fn within_deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, OrderError>>,
    ) -> Result<T, OrderError> {
        match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, operation)
                .await
                .unwrap_or(Err(OrderError::DeadlineExceeded(limit))),
            None => operation.await,
        }
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), OrderError> {
        let outcome = self.users.validate_user_exists(user_id).await;
        check(self.users.guard(), format!("user {user_id}"), outcome)
    }

    async fn price_item(&self, product_id: ProductId, quantity: u32) -> Result<NewOrderItem, OrderError> {
        let outcome = self.products.validate_product_exists(product_id).await;
        let unit_price = check(self.products.guard(), format!("product {product_id}"), outcome)?;
        Ok(NewOrderItem {
            product_id,
            quantity,
            unit_price,
        })
    }

    async fn price_items(&self, items: &[ItemRequest]) -> Result<Vec<NewOrderItem>, OrderError> {
        match self.item_validation {
            ItemValidation::Sequential => {
                let mut priced = Vec::with_capacity(items.len());
                for item in items {
                    priced.push(self.price_item(item.product_id, item.quantity).await?);
                }
                Ok(priced)
            }
            ItemValidation::Concurrent => {
                try_join_all(
                    items
                        .iter()
                        .map(|item| self.price_item(item.product_id, item.quantity)),
                )
                .await
            }
        }
    }

    /// Reloads the order, recomputes its total from the stored items and writes it.
    async fn recompute_total(&self, order_id: OrderId) -> Result<Order, OrderError> {
        let mut order = self.store.get_order(order_id).await?;
        let total = order.recomputed_total();
        self.store.update_total(order_id, total).await?;
        order.total = total;
        Ok(order)
    }

    /// Validates the user and every product, then stores the order with status
    /// `pending`.
    #[instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<Order, OrderError> {
        request.validate()?;
        let items = self
            .within_deadline(async {
                self.ensure_user(request.user_id).await?;
                self.price_items(&request.items).await
            })
            .await?;

        let items_total: f64 = items.iter().map(NewOrderItem::total_price).sum();
        let shipping_cost = request.shipping_cost.max(0.0);
        let discount = request.discount.max(0.0);
        let total = order_total(items_total, shipping_cost, discount);

        let order = self
            .store
            .create_order_with_items(OrderCreate {
                user_id: request.user_id,
                shipping_cost,
                shipping_duration_days: request.shipping_duration_days,
                discount,
                total,
                items,
            })
            .await?;
        info!(order_id = %order.id, total = order.total, "Order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order_by_id(&self, id: OrderId) -> Result<Order, OrderError> {
        Ok(self.store.get_order(id).await?)
    }

    /// One page of orders, newest first, and the number of orders matching the filter.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, request: ListOrdersRequest) -> Result<Listing<Order>, OrderError> {
        Ok(self.store.list_orders(request.user_id, request.page()).await?)
    }

    /// Prices the product, appends the item and rewrites the order total.
    #[instrument(skip(self))]
    pub async fn add_order_item(
        &self,
        order_id: OrderId,
        request: AddOrderItemRequest,
    ) -> Result<Order, OrderError> {
        request.validate()?;
        let item = self
            .within_deadline(self.price_item(request.product_id, request.quantity))
            .await?;
        let stored = self.store.add_item(order_id, item).await?;
        info!(%order_id, item_id = %stored.id, "Item added");
        self.recompute_total(order_id).await
    }

    /// Removes the item and rewrites the order total. Fails with `NotFound` when the
    /// item does not belong to the order.
    #[instrument(skip(self))]
    pub async fn remove_order_item(
        &self,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<Order, OrderError> {
        self.store.remove_item(order_id, item_id).await?;
        info!(%order_id, %item_id, "Item removed");
        self.recompute_total(order_id).await
    }

    /// Overwrites the status. Any status may follow any other.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: OrderId, status: &str) -> Result<Order, OrderError> {
        let status = parse_status(status)?;
        self.store.update_status(order_id, status).await?;
        info!(%order_id, %status, "Status updated");
        Ok(self.store.get_order(order_id).await?)
    }
}
