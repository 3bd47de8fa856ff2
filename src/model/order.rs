//! Orders, their line items, and the total formula.
//!
//! [`Order`] implements the [`ActorEntity`](actor_framework::ActorEntity) trait and is
//! stored by a [`ResourceActor`](actor_framework::ResourceActor); see
//! [`order_actor`](crate::order_actor) for the creation hook and the item actions.

use crate::model::{ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Identifier of a line item, unique across all orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderItemId(pub u32);

impl From<u32> for OrderItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Canceled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Canceled => "canceled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "canceled" => Ok(OrderStatus::Canceled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A persisted line item. `unit_price` is the catalog price captured when the item
/// was validated and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

impl OrderItem {
    /// Stored `total_price` when positive, `unit_price * quantity` otherwise.
    pub fn effective_total(&self) -> f64 {
        if self.total_price > 0.0 {
            self.total_price
        } else {
            self.unit_price * f64::from(self.quantity)
        }
    }
}

/// A priced line item that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: f64,
}

impl NewOrderItem {
    pub fn total_price(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub shipping_cost: f64,
    pub shipping_duration_days: u32,
    pub discount: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total derived from the items currently on the order.
    pub fn recomputed_total(&self) -> f64 {
        let items_total = self.items.iter().map(OrderItem::effective_total).sum();
        order_total(items_total, self.shipping_cost, self.discount)
    }
}

/// Payload for creating an order together with all of its items.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub shipping_cost: f64,
    pub shipping_duration_days: u32,
    pub discount: f64,
    pub total: f64,
    pub items: Vec<NewOrderItem>,
}

/// `max(0, items_total + max(0, shipping_cost) - max(0, discount))`
pub fn order_total(items_total: f64, shipping_cost: f64, discount: f64) -> f64 {
    (items_total + shipping_cost.max(0.0) - discount.max(0.0)).max(0.0)
}
