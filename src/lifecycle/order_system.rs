use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::OrchestratorConfig;
use crate::order_actor::ItemSequence;
use crate::orchestrator::OrderOrchestrator;
use crate::validators::{ProductValidator, UserValidator};
use resilience::{BreakerRegistry, BreakerSettings, GuardedCaller, LogListener};
use std::sync::Arc;
use tracing::{error, info};

/// Breaker name of the user service.
pub const USER_SERVICE: &str = "user-service";
/// Breaker name of the product service.
pub const PRODUCT_SERVICE: &str = "product-service";

/// The running order system.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: starting and stopping the user, product and order actors
/// - **Dependency Wiring**: one breaker per remote dependency, the guarded callers and
///   validators built on them, and the [`OrderOrchestrator`] on top
///
/// The user and product actors stand in for remote services: the orchestrator reaches
/// them only through [`UserDirectory`](crate::clients::UserDirectory) and
/// [`ProductCatalog`](crate::clients::ProductCatalog), behind their breakers.
///
/// # Example
///
/// ```rust
/// use order_orchestrator::config::OrchestratorConfig;
/// use order_orchestrator::lifecycle::OrderSystem;
///
/// #[tokio::main]
/// async fn main() -> Result<(), String> {
///     let system = OrderSystem::new(&OrchestratorConfig::default());
///     // ... system.orchestrator.create_order(request).await ...
///     system.shutdown().await
/// }
/// ```
pub struct OrderSystem {
    pub orchestrator: OrderOrchestrator,

    /// Seeds and administers the user service.
    pub user_client: UserClient,

    /// Seeds and administers the product catalog.
    pub product_client: ProductClient,

    /// Direct access to the order store.
    pub order_client: OrderClient,

    pub registry: Arc<BreakerRegistry>,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Spawns the actors and wires the orchestrator. Must be called inside a Tokio
    /// runtime.
    pub fn new(config: &OrchestratorConfig) -> Self {
        let (user_actor, user_client) = crate::user_actor::new();
        let (product_actor, product_client) = crate::product_actor::new();
        let (order_actor, order_client) = crate::order_actor::new();

        let user_handle = tokio::spawn(user_actor.run(()));
        let product_handle = tokio::spawn(product_actor.run(()));
        // Item ids are allocated by the order actor alone
        let order_handle = tokio::spawn(order_actor.run(ItemSequence::default()));

        let registry = Arc::new(
            BreakerRegistry::new(BreakerSettings::default())
                .configure(USER_SERVICE, config.user_service.settings())
                .configure(PRODUCT_SERVICE, config.product_service.settings())
                .with_listener(Arc::new(LogListener)),
        );

        let timeout = config.downstream_timeout();
        let users = UserValidator::new(
            Arc::new(user_client.clone()),
            GuardedCaller::new(registry.breaker(USER_SERVICE), timeout),
        );
        let products = ProductValidator::new(
            Arc::new(product_client.clone()),
            GuardedCaller::new(registry.breaker(PRODUCT_SERVICE), timeout),
        );
        let orchestrator = OrderOrchestrator::new(users, products, Arc::new(order_client.clone()))
            .with_item_validation(config.item_validation)
            .with_request_timeout(config.request_timeout());

        info!(
            downstream_timeout_ms = config.downstream_timeout_ms,
            item_validation = ?config.item_validation,
            "Order system started"
        );

        Self {
            orchestrator,
            user_client,
            product_client,
            order_client,
            registry,
            handles: vec![user_handle, product_handle, order_handle],
        }
    }

    /// Drops every client and waits for the actors to exit.
    ///
    /// Clones of the orchestrator or of the clients keep their actors alive, so they
    /// must be dropped before calling this.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.orchestrator);
        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        for (name, snapshot) in self.registry.snapshots() {
            info!(breaker = %name, state = %snapshot.state, "Final breaker state");
        }
        info!("System shutdown complete.");
        Ok(())
    }
}
