//! # Breaker Registry
//!
//! Owns one breaker per dependency name. The registry is created once and passed to
//! whatever builds the outbound callers; there is no global breaker state.

use crate::breaker::{BreakerSettings, CircuitBreaker, Snapshot};
use crate::listener::StateChangeListener;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub struct BreakerRegistry {
    defaults: BreakerSettings,
    overrides: HashMap<String, BreakerSettings>,
    listeners: Vec<Arc<dyn StateChangeListener>>,
    breakers: Mutex<HashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new(defaults: BreakerSettings) -> Self {
        Self {
            defaults,
            overrides: HashMap::new(),
            listeners: Vec::new(),
            breakers: Mutex::new(HashMap::new()),
        }
    }

    /// Settings for one dependency, replacing the defaults.
    pub fn configure(mut self, name: impl Into<String>, settings: BreakerSettings) -> Self {
        self.overrides.insert(name.into(), settings);
        self
    }

    /// Listener attached to every breaker created from now on.
    pub fn with_listener(mut self, listener: Arc<dyn StateChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// The breaker for `name`, created on first use.
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap_or_else(PoisonError::into_inner);
        breakers
            .entry(name.to_string())
            .or_insert_with(|| {
                let settings = self
                    .overrides
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| self.defaults.clone());
                debug!(breaker = name, enabled = settings.enabled, "Creating breaker");
                let breaker = self
                    .listeners
                    .iter()
                    .fold(CircuitBreaker::new(name, settings), |b, l| {
                        b.with_listener(l.clone())
                    });
                Arc::new(breaker)
            })
            .clone()
    }

    /// Snapshots of every breaker created so far, sorted by name.
    pub fn snapshots(&self) -> Vec<(String, Snapshot)> {
        let breakers: Vec<Arc<CircuitBreaker>> = self
            .breakers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let mut snapshots: Vec<(String, Snapshot)> = breakers
            .iter()
            .map(|b| (b.name().to_string(), b.snapshot()))
            .collect();
        snapshots.sort_by(|a, b| a.0.cmp(&b.0));
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::State;
    use std::time::Duration;

    #[tokio::test]
    async fn same_name_shares_a_breaker_distinct_names_do_not() {
        let registry = BreakerRegistry::new(BreakerSettings {
            min_requests: 1,
            failure_ratio: 1.0,
            ..BreakerSettings::default()
        });

        let users = registry.breaker("user-service");
        assert!(Arc::ptr_eq(&users, &registry.breaker("user-service")));

        users.try_acquire().unwrap().failure();
        assert_eq!(registry.breaker("user-service").state(), State::Open);
        assert_eq!(registry.breaker("product-service").state(), State::Closed);

        let names: Vec<String> = registry.snapshots().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["product-service", "user-service"]);
    }

    #[tokio::test]
    async fn overrides_apply_per_name() {
        let registry = BreakerRegistry::new(BreakerSettings::default())
            .configure("product-service", BreakerSettings::disabled())
            .configure(
                "user-service",
                BreakerSettings {
                    timeout: Duration::from_secs(1),
                    ..BreakerSettings::default()
                },
            );

        assert!(!registry.breaker("product-service").settings().enabled);
        assert_eq!(
            registry.breaker("user-service").settings().timeout,
            Duration::from_secs(1)
        );
        assert_eq!(
            registry.breaker("cart-service").settings(),
            &BreakerSettings::default()
        );
    }
}
