use order_orchestrator::config::OrchestratorConfig;
use order_orchestrator::lifecycle::{setup_tracing, OrderSystem};
use order_orchestrator::model::{OrderId, ProductCreate, ProductId, UserCreate, UserId};
use order_orchestrator::orchestrator::{
    AddOrderItemRequest, CreateOrderRequest, ItemRequest, ListOrdersRequest,
};
use std::path::Path;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    // ORCHESTRATOR_CONFIG names a TOML file; otherwise defaults plus environment
    let config = match std::env::var("ORCHESTRATOR_CONFIG") {
        Ok(path) => OrchestratorConfig::load(Path::new(&path)),
        Err(_) => OrchestratorConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;

    info!("Starting order system");
    let system = OrderSystem::new(&config);

    let span = tracing::info_span!("seeding");
    let (user_id, widget, gadget) = async {
        let user_id = system
            .user_client
            .create_user(UserCreate {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .map_err(|e| e.to_string())?;
        let widget = system
            .product_client
            .create_product(ProductCreate {
                name: "Widget".to_string(),
                price: 20.0,
            })
            .await
            .map_err(|e| e.to_string())?;
        let gadget = system
            .product_client
            .create_product(ProductCreate {
                name: "Gadget".to_string(),
                price: 5.0,
            })
            .await
            .map_err(|e| e.to_string())?;
        Ok::<(UserId, ProductId, ProductId), String>((user_id, widget, gadget))
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("order_processing");
    let order_id = async {
        let order = system
            .orchestrator
            .create_order(CreateOrderRequest {
                user_id,
                shipping_cost: 10.0,
                shipping_duration_days: 3,
                discount: 5.0,
                items: vec![ItemRequest {
                    product_id: widget,
                    quantity: 2,
                }],
            })
            .await
            .map_err(|e| e.to_string())?;
        info!(order_id = %order.id, total = order.total, "Order placed");

        let order = system
            .orchestrator
            .add_order_item(
                order.id,
                AddOrderItemRequest {
                    product_id: gadget,
                    quantity: 1,
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        info!(order_id = %order.id, total = order.total, "Item added");

        let order = system
            .orchestrator
            .update_order_status(order.id, "paid")
            .await
            .map_err(|e| e.to_string())?;
        info!(order_id = %order.id, status = %order.status, "Order paid");
        Ok::<OrderId, String>(order.id)
    }
    .instrument(span)
    .await?;

    // A product that does not exist is rejected without tripping the breaker
    let missing = system
        .orchestrator
        .create_order(CreateOrderRequest {
            user_id,
            shipping_cost: 0.0,
            shipping_duration_days: 1,
            discount: 0.0,
            items: vec![ItemRequest {
                product_id: ProductId(999),
                quantity: 1,
            }],
        })
        .await;
    match missing {
        Ok(order) => error!(order_id = %order.id, "Order with an unknown product was accepted"),
        Err(e) => info!(error = %e, retryable = e.is_retryable(), "Order rejected"),
    }

    match system.orchestrator.list_orders(ListOrdersRequest::default()).await {
        Ok(listing) => info!(%order_id, orders = listing.total, "Listed orders"),
        Err(e) => error!(error = %e, "Listing orders failed"),
    }

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
