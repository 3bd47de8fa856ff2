//! Error types for the Order actor.

use crate::model::{OrderId, OrderItemId};
use thiserror::Error;

/// Errors reported by the order store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No item with this id belongs to the order.
    #[error("Order item {item_id} not found on {order_id}")]
    ItemNotFound {
        order_id: OrderId,
        item_id: OrderItemId,
    },

    /// The order data provided is invalid.
    #[error("Order validation error: {0}")]
    ValidationError(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::OrderNotFound(_) | StoreError::ItemNotFound { .. }
        )
    }
}
