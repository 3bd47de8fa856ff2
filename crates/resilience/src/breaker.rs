//! # Circuit Breaker
//!
//! A per-dependency state machine that decides whether a call may be attempted.
//!
//! - **Closed**: calls pass. Completed calls are counted in a window of `interval`;
//!   after every completed call the breaker trips when at least `min_requests` calls
//!   completed and the failure ratio reached `failure_ratio`.
//! - **Open**: calls are rejected without touching the dependency until `timeout` has
//!   elapsed since the breaker opened.
//! - **HalfOpen**: up to `max_requests` probes are admitted. One failed probe reopens
//!   the breaker; `max_requests` consecutive successes close it.
//!
//! Every transition and every window roll starts a new *generation* and resets the
//! counters as a unit. Each admitted call carries a [`Ticket`] stamped with the
//! generation it was admitted in, and results from an older generation are ignored.

use crate::listener::{StateChange, StateChangeListener};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half-open",
        })
    }
}

/// Breaker parameters for one dependency.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSettings {
    /// A disabled breaker admits everything and tracks nothing.
    pub enabled: bool,
    /// Probe budget while half-open. Zero is treated as one.
    pub max_requests: u32,
    /// Length of the closed-state counting window. Zero never rolls the window.
    pub interval: Duration,
    /// How long the breaker stays open before admitting probes.
    pub timeout: Duration,
    /// Trip threshold, `failures / requests`, in `[0, 1]`.
    pub failure_ratio: f64,
    /// Completed calls required before the ratio is considered.
    pub min_requests: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(20),
            failure_ratio: 0.6,
            min_requests: 20,
        }
    }
}

impl BreakerSettings {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    fn probe_budget(&self) -> u32 {
        self.max_requests.max(1)
    }

    fn ready_to_trip(&self, counts: &Counts) -> bool {
        if counts.requests == 0 || counts.requests < self.min_requests {
            return false;
        }
        f64::from(counts.failures) / f64::from(counts.requests) >= self.failure_ratio
    }
}

/// Completed calls in the current generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub requests: u32,
    pub successes: u32,
    pub failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    fn on_success(&mut self) {
        self.requests += 1;
        self.successes += 1;
        self.consecutive_successes += 1;
        self.consecutive_failures = 0;
    }

    fn on_failure(&mut self) {
        self.requests += 1;
        self.failures += 1;
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
    }
}

/// Why a call was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("circuit breaker is open")]
    Open,
    #[error("circuit breaker is half-open and its probe budget is in use")]
    TooManyProbes,
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: State,
    pub counts: Counts,
    /// Admitted calls of the current generation that have not reported yet.
    pub in_flight: u32,
    pub window_start: Instant,
    pub opened_at: Option<Instant>,
}

struct Inner {
    state: State,
    generation: u64,
    counts: Counts,
    in_flight: u32,
    window_start: Instant,
    opened_at: Option<Instant>,
}

impl Inner {
    fn new_generation(&mut self, now: Instant) {
        self.generation += 1;
        self.counts = Counts::default();
        self.in_flight = 0;
        self.window_start = now;
    }
}

/// Circuit breaker guarding one dependency.
///
/// All state lives behind one mutex that is never held across an `.await`, so the
/// breaker can be shared through an `Arc` by any number of concurrent callers.
pub struct CircuitBreaker {
    name: String,
    settings: BreakerSettings,
    inner: Mutex<Inner>,
    listeners: Vec<Arc<dyn StateChangeListener>>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            inner: Mutex::new(Inner {
                state: State::Closed,
                generation: 0,
                counts: Counts::default(),
                in_flight: 0,
                window_start: Instant::now(),
                opened_at: None,
            }),
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn StateChangeListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &BreakerSettings {
        &self.settings
    }

    pub fn state(&self) -> State {
        self.snapshot().state
    }

    /// Current state and counters, after applying any pending timeout or window roll.
    pub fn snapshot(&self) -> Snapshot {
        let now = Instant::now();
        let mut inner = self.lock();
        let changes = self.refresh(&mut inner, now);
        let snapshot = Snapshot {
            state: inner.state,
            counts: inner.counts,
            in_flight: inner.in_flight,
            window_start: inner.window_start,
            opened_at: inner.opened_at,
        };
        drop(inner);
        self.notify(changes);
        snapshot
    }

    /// Asks to attempt one call.
    ///
    /// The returned ticket must be settled with [`Ticket::success`] or
    /// [`Ticket::failure`]; dropping it unsettled frees its slot without counting.
    pub fn try_acquire(&self) -> Result<Ticket<'_>, Rejection> {
        if !self.settings.enabled {
            return Ok(Ticket::new(self, 0));
        }

        let now = Instant::now();
        let mut inner = self.lock();
        let changes = self.refresh(&mut inner, now);
        let admitted = match inner.state {
            State::Open => Err(Rejection::Open),
            State::HalfOpen
                if inner.counts.requests + inner.in_flight >= self.settings.probe_budget() =>
            {
                Err(Rejection::TooManyProbes)
            }
            State::Closed | State::HalfOpen => {
                inner.in_flight += 1;
                Ok(inner.generation)
            }
        };
        drop(inner);
        self.notify(changes);

        match admitted {
            Ok(generation) => Ok(Ticket::new(self, generation)),
            Err(rejection) => {
                debug!(breaker = %self.name, %rejection, "Call rejected");
                Err(rejection)
            }
        }
    }

    fn on_result(&self, generation: u64, outcome: Option<bool>) {
        if !self.settings.enabled {
            return;
        }

        let now = Instant::now();
        let mut inner = self.lock();
        let mut changes = self.refresh(&mut inner, now);

        if generation == inner.generation {
            inner.in_flight = inner.in_flight.saturating_sub(1);
            match (outcome, inner.state) {
                (None, _) => {}
                (Some(true), State::Closed) => {
                    inner.counts.on_success();
                    if self.settings.ready_to_trip(&inner.counts) {
                        changes.extend(self.transition(&mut inner, State::Open, now));
                    }
                }
                (Some(false), State::Closed) => {
                    inner.counts.on_failure();
                    if self.settings.ready_to_trip(&inner.counts) {
                        changes.extend(self.transition(&mut inner, State::Open, now));
                    }
                }
                (Some(true), State::HalfOpen) => {
                    inner.counts.on_success();
                    if inner.counts.consecutive_successes >= self.settings.probe_budget() {
                        changes.extend(self.transition(&mut inner, State::Closed, now));
                    }
                }
                (Some(false), State::HalfOpen) => {
                    inner.counts.on_failure();
                    changes.extend(self.transition(&mut inner, State::Open, now));
                }
                // Open admits nothing, so no ticket of the current generation exists.
                (Some(_), State::Open) => {}
            }
        }

        drop(inner);
        self.notify(changes);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies the time-driven moves: closed window roll and open cool-down expiry.
    fn refresh(&self, inner: &mut Inner, now: Instant) -> Vec<StateChange> {
        match inner.state {
            State::Closed => {
                let interval = self.settings.interval;
                if !interval.is_zero() && now.duration_since(inner.window_start) >= interval {
                    inner.new_generation(now);
                }
                Vec::new()
            }
            State::Open => match inner.opened_at {
                Some(opened) if now.duration_since(opened) >= self.settings.timeout => {
                    self.transition(inner, State::HalfOpen, now).into_iter().collect()
                }
                _ => Vec::new(),
            },
            State::HalfOpen => Vec::new(),
        }
    }

    fn transition(&self, inner: &mut Inner, to: State, now: Instant) -> Option<StateChange> {
        let from = inner.state;
        if from == to {
            return None;
        }
        inner.state = to;
        inner.new_generation(now);
        if to == State::Open {
            inner.opened_at = Some(now);
        }
        info!(breaker = %self.name, %from, %to, "Transition");
        Some(StateChange {
            name: self.name.clone(),
            from,
            to,
        })
    }

    fn notify(&self, changes: Vec<StateChange>) {
        for change in &changes {
            for listener in &self.listeners {
                listener.on_state_change(change);
            }
        }
    }
}

/// Admission for one call, stamped with the generation it was admitted in.
#[must_use = "an unsettled ticket counts as neither success nor failure"]
pub struct Ticket<'a> {
    breaker: &'a CircuitBreaker,
    generation: u64,
    settled: bool,
}

impl fmt::Debug for Ticket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ticket")
            .field("breaker", &self.breaker.name)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'a> Ticket<'a> {
    fn new(breaker: &'a CircuitBreaker, generation: u64) -> Self {
        Self {
            breaker,
            generation,
            settled: false,
        }
    }

    pub fn success(self) {
        self.record(true);
    }

    pub fn failure(self) {
        self.record(false);
    }

    pub fn record(mut self, success: bool) {
        self.settled = true;
        self.breaker.on_result(self.generation, Some(success));
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.on_result(self.generation, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::ChannelListener;

    fn settings() -> BreakerSettings {
        BreakerSettings {
            enabled: true,
            max_requests: 2,
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
            failure_ratio: 0.5,
            min_requests: 4,
        }
    }

    fn run(breaker: &CircuitBreaker, outcomes: &[bool]) {
        for &ok in outcomes {
            breaker.try_acquire().unwrap().record(ok);
        }
    }

    fn trip(breaker: &CircuitBreaker) {
        run(breaker, &[false, false, false, false]);
        assert_eq!(breaker.state(), State::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn trips_once_ratio_reached_with_enough_samples() {
        let breaker = CircuitBreaker::new("svc", settings());

        run(&breaker, &[false, true, false]);
        assert_eq!(breaker.state(), State::Closed);

        run(&breaker, &[true]);
        assert_eq!(breaker.state(), State::Open);
        assert_eq!(breaker.try_acquire().unwrap_err(), Rejection::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn never_trips_below_min_requests() {
        let breaker = CircuitBreaker::new(
            "svc",
            BreakerSettings {
                min_requests: 5,
                ..settings()
            },
        );

        run(&breaker, &[false, false, false, false]);
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Closed);
        assert_eq!(snapshot.counts.failures, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn stays_open_until_timeout_has_fully_elapsed() {
        let breaker = CircuitBreaker::new("svc", settings());
        trip(&breaker);

        tokio::time::advance(Duration::from_secs(10) - Duration::from_millis(1)).await;
        assert_eq!(breaker.try_acquire().unwrap_err(), Rejection::Open);

        tokio::time::advance(Duration::from_millis(1)).await;
        let probe = breaker.try_acquire().unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);
        probe.success();
    }

    #[tokio::test(start_paused = true)]
    async fn half_open_caps_probes_and_closes_after_consecutive_successes() {
        let breaker = CircuitBreaker::new("svc", settings());
        trip(&breaker);
        tokio::time::advance(Duration::from_secs(10)).await;

        let first = breaker.try_acquire().unwrap();
        let second = breaker.try_acquire().unwrap();
        assert_eq!(breaker.try_acquire().unwrap_err(), Rejection::TooManyProbes);

        first.success();
        assert_eq!(breaker.state(), State::HalfOpen);
        second.success();

        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Closed);
        assert_eq!(snapshot.counts, Counts::default());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_probe_reopens_and_restarts_cool_down() {
        let breaker = CircuitBreaker::new("svc", settings());
        trip(&breaker);
        tokio::time::advance(Duration::from_secs(10)).await;

        breaker.try_acquire().unwrap().failure();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Open);
        assert_eq!(snapshot.opened_at, Some(Instant::now()));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(breaker.try_acquire().unwrap_err(), Rejection::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_window_rolls_over() {
        let breaker = CircuitBreaker::new(
            "svc",
            BreakerSettings {
                min_requests: 2,
                failure_ratio: 1.0,
                interval: Duration::from_secs(10),
                ..settings()
            },
        );

        run(&breaker, &[false]);
        tokio::time::advance(Duration::from_secs(10)).await;
        run(&breaker, &[false]);

        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Closed);
        assert_eq!(snapshot.counts.requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_rolls() {
        let breaker = CircuitBreaker::new(
            "svc",
            BreakerSettings {
                min_requests: 2,
                failure_ratio: 1.0,
                interval: Duration::ZERO,
                ..settings()
            },
        );

        run(&breaker, &[false]);
        tokio::time::advance(Duration::from_secs(3600)).await;
        run(&breaker, &[false]);
        assert_eq!(breaker.state(), State::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn results_from_an_older_generation_are_ignored() {
        let breaker = CircuitBreaker::new(
            "svc",
            BreakerSettings {
                min_requests: 1,
                failure_ratio: 1.0,
                ..settings()
            },
        );

        let slow = breaker.try_acquire().unwrap();
        breaker.try_acquire().unwrap().failure();
        assert_eq!(breaker.state(), State::Open);

        slow.success();
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Open);
        assert_eq!(snapshot.counts, Counts::default());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_ticket_frees_its_probe_slot() {
        let breaker = CircuitBreaker::new(
            "svc",
            BreakerSettings {
                max_requests: 0,
                ..settings()
            },
        );
        trip(&breaker);
        tokio::time::advance(Duration::from_secs(10)).await;

        let probe = breaker.try_acquire().unwrap();
        assert_eq!(breaker.try_acquire().unwrap_err(), Rejection::TooManyProbes);
        drop(probe);

        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.in_flight, 0);
        assert_eq!(snapshot.counts.requests, 0);

        breaker.try_acquire().unwrap().success();
        assert_eq!(breaker.state(), State::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_breaker_is_a_pass_through() {
        let breaker = CircuitBreaker::new("svc", BreakerSettings::disabled());
        for _ in 0..100 {
            breaker.try_acquire().unwrap().failure();
        }
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.state, State::Closed);
        assert_eq!(snapshot.counts, Counts::default());
    }

    #[tokio::test(start_paused = true)]
    async fn listeners_see_every_transition() {
        let (listener, mut events) = ChannelListener::new();
        let breaker = CircuitBreaker::new("user-service", settings()).with_listener(Arc::new(listener));

        trip(&breaker);
        tokio::time::advance(Duration::from_secs(10)).await;
        run(&breaker, &[true, true]);

        let mut seen = Vec::new();
        while let Ok(change) = events.try_recv() {
            assert_eq!(change.name, "user-service");
            seen.push((change.from, change.to));
        }
        assert_eq!(
            seen,
            vec![
                (State::Closed, State::Open),
                (State::Open, State::HalfOpen),
                (State::HalfOpen, State::Closed),
            ]
        );
    }
}
