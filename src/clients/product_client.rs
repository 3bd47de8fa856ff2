//! # Product Client
//!
//! Wraps a `ResourceClient<Product>`: catalog management for the demo and tests, and
//! [`ProductCatalog`] for the orchestrator.
use crate::clients::{remote_error, ProductCatalog};
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::ProductError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use resilience::RemoteError;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.entity_error::<ProductError>() {
            Some(inner) => inner.clone(),
            None => ProductError::ActorCommunicationError(e.to_string()),
        }
    }
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner
            .create(params)
            .await
            .map(|product| product.id)
            .map_err(Self::map_error)
    }

    /// Changes the catalog price. Existing order items keep the price they captured.
    #[instrument(skip(self))]
    pub async fn update_price(&self, id: ProductId, price: f64) -> Result<Product, ProductError> {
        debug!("Sending request");
        let update = ProductUpdate { price };
        self.inner.update(id, update).await.map_err(|e| match e {
            FrameworkError::NotFound(_) => ProductError::NotFound(id.to_string()),
            other => Self::map_error(other),
        })
    }
}

#[async_trait]
impl ProductCatalog for ProductClient {
    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, RemoteError> {
        match self.inner.get(id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => Err(RemoteError::not_found(format!("{id} not found"))),
            Err(e) => Err(remote_error(e)),
        }
    }
}
