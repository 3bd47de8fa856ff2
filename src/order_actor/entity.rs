//! [`ActorEntity`] implementation for [`Order`].
//!
//! Every successful hook refreshes `updated_at`. A failing hook leaves the stored
//! order untouched because the actor only keeps the working copy on success.

use super::{OrderAction, OrderActionResult, StoreError};
use crate::model::{
    NewOrderItem, Order, OrderCreate, OrderId, OrderItem, OrderItemId, OrderStatus, UserId,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Allocates item ids for every order in one store.
#[derive(Debug, Default)]
pub struct ItemSequence(AtomicU32);

impl ItemSequence {
    pub fn allocate(&self) -> OrderItemId {
        OrderItemId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn check_item(item: &NewOrderItem) -> Result<(), StoreError> {
    if item.quantity == 0 {
        return Err(StoreError::ValidationError(format!(
            "quantity for {} must be positive",
            item.product_id
        )));
    }
    if !item.unit_price.is_finite() || item.unit_price < 0.0 {
        return Err(StoreError::ValidationError(format!(
            "unit price for {} must not be negative",
            item.product_id
        )));
    }
    Ok(())
}

fn stored_item(order_id: OrderId, id: OrderItemId, item: NewOrderItem) -> OrderItem {
    OrderItem {
        id,
        order_id,
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price: item.unit_price,
        total_price: item.total_price(),
    }
}

impl Order {
    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Context = ItemSequence;
    type Filter = Option<UserId>;
    type Error = StoreError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        params.items.iter().try_for_each(check_item)?;
        let now = Utc::now();
        // ids are assigned in on_create, where the sequence is available
        let items = params
            .items
            .into_iter()
            .map(|item| stored_item(id, OrderItemId(0), item))
            .collect();
        Ok(Self {
            id,
            user_id: params.user_id,
            shipping_cost: params.shipping_cost,
            shipping_duration_days: params.shipping_duration_days,
            discount: params.discount,
            total: params.total,
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    async fn on_create(&mut self, items: &ItemSequence) -> Result<(), Self::Error> {
        for item in &mut self.items {
            item.id = items.allocate();
        }
        Ok(())
    }

    async fn on_update(&mut self, _update: (), _ctx: &ItemSequence) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        items: &ItemSequence,
    ) -> Result<OrderActionResult, Self::Error> {
        let result = match action {
            OrderAction::AddItem(new_item) => {
                check_item(&new_item)?;
                let item = stored_item(self.id, items.allocate(), new_item);
                self.items.push(item.clone());
                OrderActionResult::ItemAdded(item)
            }
            OrderAction::RemoveItem(item_id) => {
                let position = self
                    .items
                    .iter()
                    .position(|item| item.id == item_id)
                    .ok_or(StoreError::ItemNotFound {
                        order_id: self.id,
                        item_id,
                    })?;
                OrderActionResult::ItemRemoved(self.items.remove(position))
            }
            OrderAction::SetStatus(status) => {
                self.status = status;
                OrderActionResult::Updated
            }
            OrderAction::SetTotal(total) => {
                self.total = total;
                OrderActionResult::Updated
            }
        };
        self.touch();
        Ok(result)
    }

    fn matches(&self, user_id: &Option<UserId>) -> bool {
        user_id.map_or(true, |user_id| self.user_id == user_id)
    }
}
