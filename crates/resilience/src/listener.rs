//! # State-Change Listeners
//!
//! Breakers report every transition to their listeners after the breaker lock is
//! released. Listeners must return quickly; they run on the caller's task.

use crate::breaker::State;
use tokio::sync::mpsc;
use tracing::warn;

/// One breaker transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub name: String,
    pub from: State,
    pub to: State,
}

pub trait StateChangeListener: Send + Sync {
    fn on_state_change(&self, change: &StateChange);
}

/// Emits each transition as a structured `warn!` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl StateChangeListener for LogListener {
    fn on_state_change(&self, change: &StateChange) {
        warn!(
            event = "circuit_breaker_state_change",
            name = %change.name,
            from = %change.from,
            to = %change.to,
            "Circuit breaker state changed"
        );
    }
}

/// Forwards transitions into an unbounded channel. Sending never blocks, and a
/// dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<StateChange>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StateChange>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl StateChangeListener for ChannelListener {
    fn on_state_change(&self, change: &StateChange) {
        let _ = self.sender.send(change.clone());
    }
}
