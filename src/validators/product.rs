use crate::clients::ProductCatalog;
use crate::model::ProductId;
use resilience::{CallOutcome, GuardedCaller};
use std::sync::Arc;
use tracing::instrument;

/// Checks that a product exists and reads its current price.
#[derive(Clone)]
pub struct ProductValidator {
    catalog: Arc<dyn ProductCatalog>,
    guard: GuardedCaller,
}

impl ProductValidator {
    pub fn new(catalog: Arc<dyn ProductCatalog>, guard: GuardedCaller) -> Self {
        Self { catalog, guard }
    }

    pub fn dependency(&self) -> &str {
        self.guard.breaker().name()
    }

    pub fn guard(&self) -> &GuardedCaller {
        &self.guard
    }

    /// On success, the unit price to snapshot into the order item.
    #[instrument(skip(self), fields(dependency = %self.dependency()))]
    pub async fn validate_product_exists(&self, id: ProductId) -> CallOutcome<f64> {
        self.guard
            .call(|| async { self.catalog.get_product(id).await })
            .await
            .map(|product| product.price)
    }
}
