use crate::model::{NewOrderItem, OrderItem, OrderItemId, OrderStatus};

/// Mutations applied to a stored order.
#[derive(Debug, Clone)]
pub enum OrderAction {
    AddItem(NewOrderItem),
    /// Fails with [`StoreError::ItemNotFound`](super::StoreError::ItemNotFound) when the
    /// item does not belong to the order.
    RemoveItem(OrderItemId),
    SetStatus(OrderStatus),
    SetTotal(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    ItemAdded(OrderItem),
    ItemRemoved(OrderItem),
    Updated,
}
