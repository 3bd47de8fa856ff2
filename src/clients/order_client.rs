use crate::clients::OrderStore;
use crate::model::{
    NewOrderItem, Order, OrderCreate, OrderId, OrderItem, OrderItemId, OrderStatus, UserId,
};
use crate::order_actor::{OrderAction, OrderActionResult, StoreError};
use actor_framework::{ActorClient, FrameworkError, Listing, Page, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Client for interacting with the Order actor.
///
/// The actor applies each request atomically, so `create_order_with_items` either
/// stores the order with every item or stores nothing.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    async fn perform(
        &self,
        order_id: OrderId,
        action: OrderAction,
    ) -> Result<OrderActionResult, StoreError> {
        self.inner
            .perform_action(order_id, action)
            .await
            .map_err(|e| match e {
                FrameworkError::NotFound(_) => StoreError::OrderNotFound(order_id),
                other => Self::map_error(other),
            })
    }
}

fn unexpected(result: OrderActionResult) -> StoreError {
    StoreError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = StoreError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<StoreError>() {
            Some(inner) => inner.clone(),
            None => StoreError::ActorCommunicationError(e.to_string()),
        }
    }
}

#[async_trait]
impl OrderStore for OrderClient {
    #[instrument(skip(self, order))]
    async fn create_order_with_items(&self, order: OrderCreate) -> Result<Order, StoreError> {
        debug!(?order, "create_order_with_items called");
        let stored = self.inner.create(order).await.map_err(Self::map_error)?;
        info!(order_id = %stored.id, items = stored.items.len(), "Order stored");
        Ok(stored)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        ActorClient::get(self, id)
            .await?
            .ok_or(StoreError::OrderNotFound(id))
    }

    async fn list_orders(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Listing<Order>, StoreError> {
        ActorClient::list(self, user_id, page).await
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        order_id: OrderId,
        item: NewOrderItem,
    ) -> Result<OrderItem, StoreError> {
        match self.perform(order_id, OrderAction::AddItem(item)).await? {
            OrderActionResult::ItemAdded(item) => Ok(item),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, order_id: OrderId, item_id: OrderItemId) -> Result<(), StoreError> {
        match self.perform(order_id, OrderAction::RemoveItem(item_id)).await? {
            OrderActionResult::ItemRemoved(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        match self.perform(order_id, OrderAction::SetStatus(status)).await? {
            OrderActionResult::Updated => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    async fn update_total(&self, order_id: OrderId, total: f64) -> Result<(), StoreError> {
        match self.perform(order_id, OrderAction::SetTotal(total)).await? {
            OrderActionResult::Updated => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}
