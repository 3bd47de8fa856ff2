//! Orchestrator behavior against stub dependencies and a real order store.

use actor_framework::{Listing, Page};
use async_trait::async_trait;
use order_orchestrator::clients::{OrderClient, OrderStore, ProductCatalog, UserDirectory};
use order_orchestrator::model::{
    NewOrderItem, Order, OrderCreate, OrderId, OrderItem, OrderItemId, OrderStatus, Product,
    ProductId, User, UserId,
};
use order_orchestrator::order_actor::{self, ItemSequence, StoreError};
use order_orchestrator::orchestrator::{
    AddOrderItemRequest, CreateOrderRequest, ItemRequest, ItemValidation, ListOrdersRequest,
    OrderError, OrderOrchestrator,
};
use order_orchestrator::validators::{ProductValidator, UserValidator};
use resilience::{
    BreakerRegistry, BreakerSettings, GuardedCaller, Rejection, RemoteError, State, StatusCode,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// User service stub: knows a fixed set of users, optionally fails or stalls.
#[derive(Default)]
struct StubUsers {
    known: Vec<u32>,
    failure: Mutex<Option<RemoteError>>,
    delay: Option<Duration>,
    calls: AtomicU32,
}

impl StubUsers {
    fn knowing(ids: &[u32]) -> Self {
        Self {
            known: ids.to_vec(),
            ..Self::default()
        }
    }

    fn fail_with(&self, error: Option<RemoteError>) {
        *self.failure.lock().unwrap() = error;
    }
}

#[async_trait]
impl UserDirectory for StubUsers {
    async fn get_user(&self, id: UserId) -> Result<User, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        if self.known.contains(&id.0) {
            Ok(User {
                id,
                name: "Alice".into(),
                email: "alice@example.com".into(),
            })
        } else {
            Err(RemoteError::not_found(format!("{id} not found")))
        }
    }
}

/// Product service stub with a price list.
#[derive(Default)]
struct StubCatalog {
    prices: HashMap<u32, f64>,
    failure: Option<RemoteError>,
    calls: AtomicU32,
}

impl StubCatalog {
    fn with_prices(prices: &[(u32, f64)]) -> Self {
        Self {
            prices: prices.iter().copied().collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProductCatalog for StubCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        match self.prices.get(&id.0) {
            Some(price) => Ok(Product {
                id,
                name: format!("product {}", id.0),
                price: *price,
            }),
            None => Err(RemoteError::not_found(format!("{id} not found"))),
        }
    }
}

/// Order store whose total writes always fail.
struct BrokenTotals(OrderClient);

#[async_trait]
impl OrderStore for BrokenTotals {
    async fn create_order_with_items(&self, order: OrderCreate) -> Result<Order, StoreError> {
        self.0.create_order_with_items(order).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.0.get_order(id).await
    }

    async fn list_orders(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Listing<Order>, StoreError> {
        self.0.list_orders(user_id, page).await
    }

    async fn add_item(
        &self,
        order_id: OrderId,
        item: NewOrderItem,
    ) -> Result<OrderItem, StoreError> {
        self.0.add_item(order_id, item).await
    }

    async fn remove_item(&self, order_id: OrderId, item_id: OrderItemId) -> Result<(), StoreError> {
        self.0.remove_item(order_id, item_id).await
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.0.update_status(order_id, status).await
    }

    async fn update_total(&self, _order_id: OrderId, _total: f64) -> Result<(), StoreError> {
        Err(StoreError::ActorCommunicationError("disk full".into()))
    }
}

/// Order store that answers every write only after `delay`.
struct SlowStore {
    inner: OrderClient,
    delay: Duration,
}

impl SlowStore {
    async fn settle<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        tokio::time::sleep(self.delay).await;
        result
    }
}

#[async_trait]
impl OrderStore for SlowStore {
    async fn create_order_with_items(&self, order: OrderCreate) -> Result<Order, StoreError> {
        self.settle(self.inner.create_order_with_items(order).await).await
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, StoreError> {
        self.inner.get_order(id).await
    }

    async fn list_orders(
        &self,
        user_id: Option<UserId>,
        page: Page,
    ) -> Result<Listing<Order>, StoreError> {
        self.inner.list_orders(user_id, page).await
    }

    async fn add_item(
        &self,
        order_id: OrderId,
        item: NewOrderItem,
    ) -> Result<OrderItem, StoreError> {
        self.settle(self.inner.add_item(order_id, item).await).await
    }

    async fn remove_item(&self, order_id: OrderId, item_id: OrderItemId) -> Result<(), StoreError> {
        self.settle(self.inner.remove_item(order_id, item_id).await).await
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.settle(self.inner.update_status(order_id, status).await).await
    }

    async fn update_total(&self, order_id: OrderId, total: f64) -> Result<(), StoreError> {
        self.settle(self.inner.update_total(order_id, total).await).await
    }
}

fn start_store() -> OrderClient {
    let (actor, client) = order_actor::new();
    tokio::spawn(actor.run(ItemSequence::default()));
    client
}

struct Harness {
    orchestrator: OrderOrchestrator,
    users: Arc<StubUsers>,
    catalog: Arc<StubCatalog>,
    store: OrderClient,
    registry: BreakerRegistry,
}

fn harness_with(
    users: StubUsers,
    catalog: StubCatalog,
    settings: BreakerSettings,
    store: Option<Arc<dyn OrderStore>>,
) -> Harness {
    let users = Arc::new(users);
    let catalog = Arc::new(catalog);
    let client = start_store();
    let registry = BreakerRegistry::new(settings);
    let timeout = Duration::from_secs(3);

    let store: Arc<dyn OrderStore> = match store {
        Some(store) => store,
        None => Arc::new(client.clone()),
    };

    let orchestrator = OrderOrchestrator::new(
        UserValidator::new(
            users.clone(),
            GuardedCaller::new(registry.breaker("user-service"), timeout),
        ),
        ProductValidator::new(
            catalog.clone(),
            GuardedCaller::new(registry.breaker("product-service"), timeout),
        ),
        store,
    );

    Harness {
        orchestrator,
        users,
        catalog,
        store: client,
        registry,
    }
}

fn harness() -> Harness {
    harness_with(
        StubUsers::knowing(&[1, 2]),
        StubCatalog::with_prices(&[(7, 20.0), (8, 5.0), (9, 2.5)]),
        BreakerSettings::default(),
        None,
    )
}

fn request(user: u32, items: &[(u32, u32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: UserId(user),
        shipping_cost: 10.0,
        shipping_duration_days: 3,
        discount: 5.0,
        items: items
            .iter()
            .map(|&(product, quantity)| ItemRequest {
                product_id: ProductId(product),
                quantity,
            })
            .collect(),
    }
}

async fn stored_orders(store: &OrderClient) -> usize {
    store.list_orders(None, Page::new(1, 100)).await.unwrap().total
}

#[tokio::test]
async fn create_order_prices_items_and_computes_the_total() {
    let h = harness();

    let order = h.orchestrator.create_order(request(1, &[(7, 2)])).await.unwrap();

    assert_eq!(order.total, 45.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 20.0);
    assert_eq!(order.items[0].total_price, 40.0);
    assert_eq!(order.items[0].order_id, order.id);

    let stored = h.orchestrator.get_order_by_id(order.id).await.unwrap();
    assert_eq!(stored, order);
}

#[tokio::test]
async fn adding_an_item_recomputes_the_total() {
    let h = harness();
    let order = h.orchestrator.create_order(request(1, &[(7, 2)])).await.unwrap();

    let updated = h
        .orchestrator
        .add_order_item(
            order.id,
            AddOrderItemRequest {
                product_id: ProductId(8),
                quantity: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.total, 50.0);
    assert_eq!(updated.items.len(), 2);
    assert_eq!(h.store.get_order(order.id).await.unwrap().total, 50.0);
}

#[tokio::test]
async fn removing_an_item_recomputes_the_total() {
    let h = harness();
    let order = h
        .orchestrator
        .create_order(request(1, &[(7, 2), (8, 1)]))
        .await
        .unwrap();
    assert_eq!(order.total, 50.0);

    let updated = h
        .orchestrator
        .remove_order_item(order.id, order.items[1].id)
        .await
        .unwrap();

    assert_eq!(updated.total, 45.0);
    assert_eq!(updated.items.len(), 1);
}

#[tokio::test]
async fn removing_an_item_of_another_order_is_not_found() {
    let h = harness();
    let first = h.orchestrator.create_order(request(1, &[(7, 2)])).await.unwrap();
    let second = h.orchestrator.create_order(request(1, &[(8, 1)])).await.unwrap();

    let err = h
        .orchestrator
        .remove_order_item(first.id, second.items[0].id)
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::NotFound(_)));
    let unchanged = h.store.get_order(first.id).await.unwrap();
    assert_eq!(unchanged.total, 45.0);
    assert_eq!(unchanged.items.len(), 1);
}

#[tokio::test]
async fn unknown_user_is_a_validation_failure_and_writes_nothing() {
    let h = harness();

    let err = h.orchestrator.create_order(request(42, &[(7, 1)])).await.unwrap_err();

    assert!(matches!(err, OrderError::ValidationFailure(_)));
    assert!(!err.is_retryable());
    assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
    assert_eq!(stored_orders(&h.store).await, 0);
}

#[tokio::test]
async fn one_unknown_product_rejects_the_whole_order() {
    let h = harness();

    let err = h
        .orchestrator
        .create_order(request(1, &[(7, 1), (404, 1), (8, 1)]))
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::ValidationFailure(_)));
    // sequential validation stops at the first failure
    assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 2);
    assert_eq!(stored_orders(&h.store).await, 0);
}

#[tokio::test]
async fn concurrent_validation_gives_the_same_results() {
    let h = harness();
    let orchestrator = h
        .orchestrator
        .clone()
        .with_item_validation(ItemValidation::Concurrent);

    let order = orchestrator
        .create_order(request(1, &[(7, 2), (8, 1), (9, 2)]))
        .await
        .unwrap();
    assert_eq!(order.total, 55.0);
    let products: Vec<ProductId> = order.items.iter().map(|i| i.product_id).collect();
    assert_eq!(products, vec![ProductId(7), ProductId(8), ProductId(9)]);

    let err = orchestrator
        .create_order(request(1, &[(7, 1), (404, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ValidationFailure(_)));
    assert_eq!(stored_orders(&h.store).await, 1);
}

#[tokio::test]
async fn unavailable_dependency_is_retryable() {
    let h = harness_with(
        StubUsers::knowing(&[1]),
        StubCatalog {
            failure: Some(RemoteError::unavailable("connection refused")),
            ..StubCatalog::default()
        },
        BreakerSettings::default(),
        None,
    );

    let err = h.orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap_err();

    match &err {
        OrderError::DependencyUnavailable { dependency, source } => {
            assert_eq!(dependency, "product-service");
            assert_eq!(source.code(), Some(StatusCode::Unavailable));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(stored_orders(&h.store).await, 0);
}

#[tokio::test]
async fn open_breaker_rejects_without_calling_the_dependency() {
    let settings = BreakerSettings {
        min_requests: 2,
        failure_ratio: 0.5,
        ..BreakerSettings::default()
    };
    let h = harness_with(
        StubUsers::knowing(&[1]),
        StubCatalog::with_prices(&[(7, 20.0)]),
        settings,
        None,
    );
    h.users.fail_with(Some(RemoteError::unavailable("down")));

    for _ in 0..2 {
        let err = h.orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap_err();
        assert!(matches!(err, OrderError::DependencyUnavailable { .. }));
    }
    assert_eq!(h.registry.breaker("user-service").state(), State::Open);

    let err = h.orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::BreakerOpen {
            dependency: "user-service".into(),
            rejection: Rejection::Open,
        }
    );
    assert!(err.is_retryable());
    assert_eq!(h.users.calls.load(Ordering::SeqCst), 2);

    // the product breaker is independent
    assert_eq!(h.registry.breaker("product-service").state(), State::Closed);
}

#[tokio::test]
async fn missing_entities_do_not_trip_the_breaker() {
    let settings = BreakerSettings {
        min_requests: 2,
        failure_ratio: 0.5,
        ..BreakerSettings::default()
    };
    let h = harness_with(
        StubUsers::knowing(&[1]),
        StubCatalog::with_prices(&[(7, 20.0)]),
        settings,
        None,
    );

    for _ in 0..10 {
        let err = h.orchestrator.create_order(request(99, &[(7, 1)])).await.unwrap_err();
        assert!(matches!(err, OrderError::ValidationFailure(_)));
    }

    let breaker = h.registry.breaker("user-service");
    assert_eq!(breaker.state(), State::Closed);
    assert_eq!(breaker.snapshot().counts.failures, 0);
    assert_eq!(h.users.calls.load(Ordering::SeqCst), 10);
}

#[tokio::test(start_paused = true)]
async fn slow_dependency_times_out_as_deadline_exceeded() {
    let h = harness_with(
        StubUsers {
            known: vec![1],
            delay: Some(Duration::from_secs(10)),
            ..StubUsers::default()
        },
        StubCatalog::with_prices(&[(7, 20.0)]),
        BreakerSettings::default(),
        None,
    );

    let err = h.orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap_err();

    match err {
        OrderError::DependencyUnavailable { source, .. } => {
            assert_eq!(source.code(), Some(StatusCode::DeadlineExceeded));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        h.registry.breaker("user-service").snapshot().counts.failures,
        1
    );
}

#[tokio::test(start_paused = true)]
async fn request_deadline_bounds_validation() {
    let h = harness_with(
        StubUsers {
            known: vec![1],
            delay: Some(Duration::from_secs(2)),
            ..StubUsers::default()
        },
        StubCatalog::with_prices(&[(7, 20.0)]),
        BreakerSettings::default(),
        None,
    );
    let orchestrator = h
        .orchestrator
        .clone()
        .with_request_timeout(Duration::from_secs(1));

    let err = orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap_err();

    assert_eq!(err, OrderError::DeadlineExceeded(Duration::from_secs(1)));
    assert_eq!(stored_orders(&h.store).await, 0);
    // the abandoned call is neither a success nor a failure
    let snapshot = h.registry.breaker("user-service").snapshot();
    assert_eq!(snapshot.counts.requests, 0);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test]
async fn negative_shipping_and_discount_count_as_zero() {
    let h = harness();
    let mut req = request(1, &[(7, 2)]);
    req.shipping_cost = -10.0;
    req.discount = -5.0;

    let order = h.orchestrator.create_order(req).await.unwrap();

    assert_eq!(order.total, 40.0);
    assert_eq!(order.shipping_cost, 0.0);
    assert_eq!(order.discount, 0.0);
}

#[tokio::test]
async fn discount_larger_than_the_order_gives_zero() {
    let h = harness();
    let mut req = request(1, &[(9, 1)]);
    req.discount = 100.0;

    let order = h.orchestrator.create_order(req).await.unwrap();
    assert_eq!(order.total, 0.0);
}

#[tokio::test]
async fn malformed_requests_never_reach_dependencies() {
    let h = harness();

    let err = h.orchestrator.create_order(request(1, &[])).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidRequest(_)));
    let err = h.orchestrator.create_order(request(1, &[(7, 0)])).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidRequest(_)));

    assert_eq!(h.users.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_total_write_keeps_the_item_change() {
    let client = start_store();
    let h = harness_with(
        StubUsers::knowing(&[1]),
        StubCatalog::with_prices(&[(7, 20.0), (8, 5.0)]),
        BreakerSettings::default(),
        Some(Arc::new(BrokenTotals(client.clone()))),
    );

    let order = h.orchestrator.create_order(request(1, &[(7, 2)])).await.unwrap();
    let err = h
        .orchestrator
        .add_order_item(
            order.id,
            AddOrderItemRequest {
                product_id: ProductId(8),
                quantity: 1,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::Storage(_)));
    let stored = client.get_order(order.id).await.unwrap();
    assert_eq!(stored.items.len(), 2);
    assert_eq!(stored.total, 45.0);
}

#[tokio::test]
async fn status_updates_accept_any_known_status() {
    let h = harness();
    let order = h.orchestrator.create_order(request(1, &[(7, 1)])).await.unwrap();

    let shipped = h
        .orchestrator
        .update_order_status(order.id, "shipped")
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let back = h
        .orchestrator
        .update_order_status(order.id, "pending")
        .await
        .unwrap();
    assert_eq!(back.status, OrderStatus::Pending);

    let err = h
        .orchestrator
        .update_order_status(order.id, "lost")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidRequest(_)));

    let err = h
        .orchestrator
        .update_order_status(OrderId(999), "paid")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
}

#[tokio::test]
async fn list_orders_filters_by_user_newest_first() {
    let h = harness();
    for user in [1, 2, 1, 1] {
        h.orchestrator.create_order(request(user, &[(7, 1)])).await.unwrap();
    }

    let page = h
        .orchestrator
        .list_orders(ListOrdersRequest {
            user_id: Some(UserId(1)),
            page: 1,
            per_page: 2,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    let ids: Vec<OrderId> = page.items.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![OrderId(4), OrderId(3)]);

    let all = h
        .orchestrator
        .list_orders(ListOrdersRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 4);
    assert_eq!(all.items.len(), 4);
}

#[tokio::test]
async fn missing_order_is_not_found() {
    let h = harness();
    let err = h.orchestrator.get_order_by_id(OrderId(1)).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));
}

#[tokio::test(start_paused = true)]
async fn slow_writes_after_validation_are_not_cut_off() {
    let client = start_store();
    let h = harness_with(
        StubUsers::knowing(&[1]),
        StubCatalog::with_prices(&[(7, 20.0), (8, 5.0)]),
        BreakerSettings::default(),
        Some(Arc::new(SlowStore {
            inner: client.clone(),
            delay: Duration::from_secs(2),
        })),
    );
    let orchestrator = h
        .orchestrator
        .clone()
        .with_request_timeout(Duration::from_secs(1));

    let order = orchestrator.create_order(request(1, &[(7, 2)])).await.unwrap();
    assert_eq!(order.total, 45.0);
    assert_eq!(stored_orders(&client).await, 1);

    let updated = orchestrator
        .add_order_item(
            order.id,
            AddOrderItemRequest {
                product_id: ProductId(8),
                quantity: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.total, 50.0);
    assert_eq!(client.get_order(order.id).await.unwrap().total, 50.0);
}
