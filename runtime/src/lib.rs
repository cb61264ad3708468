//! # Prioritize Runtime
//!
//! Runtime implementation for the ticket-prioritization state container.
//!
//! This crate provides the Store runtime that owns the canonical state,
//! applies actions through a reducer and executes the effects the reducer
//! describes.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, applies actions, notifies subscribers
//! - **Effect Executor**: Runs effect descriptions on tokio and feeds their
//!   resulting actions back through `dispatch`
//! - **Subscriptions**: Argument-less change signals for consumers
//!
//! ## Ordering
//!
//! Actions are applied strictly in the order `dispatch` is called. Effect
//! completions are dispatched when they resume, so two overlapping requests
//! apply in response-arrival order, not request order.
//!
//! ## Example
//!
//! ```ignore
//! use prioritize_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! let subscription = store.subscribe(|| println!("state changed"));
//! store.dispatch(Action::DoSomething)?;
//!
//! let value = store.state(|s| s.some_field);
//! subscription.unsubscribe();
//! ```

use prioritize_core::{effect::Effect, reducer::Reducer};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned by `dispatch()` once `shutdown()` has been called.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timed out waiting for the effects of a dispatch to finish
        #[error("Timed out waiting for {0} effects")]
        EffectTimeout(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use prioritize_runtime::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_shutdown_timeout(Duration::from_secs(5))
///     .with_shutdown_poll_interval(Duration::from_millis(10));
/// assert_eq!(config.default_shutdown_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
    /// How often shutdown re-checks the pending effect count
    pub shutdown_poll_interval: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(default_shutdown_timeout: Duration, shutdown_poll_interval: Duration) -> Self {
        Self {
            default_shutdown_timeout,
            shutdown_poll_interval,
        }
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }

    /// Set the shutdown poll interval
    #[must_use]
    pub const fn with_shutdown_poll_interval(mut self, interval: Duration) -> Self {
        self.shutdown_poll_interval = interval;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_shutdown_timeout: Duration::from_secs(30),
            shutdown_poll_interval: Duration::from_millis(100),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::dispatch()`]. The state change itself is already
/// committed when the handle is returned; the handle only tracks the effects
/// the reducer scheduled, including the dispatch of whatever action each of
/// them produced.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.dispatch(Action::LoadTickets)?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The load finished and its result (if any) has been applied
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and the tracking context that feeds it
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running.
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EffectTimeout`] with the number of effects still
    /// running if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        if tokio::time::timeout(timeout, self.wait()).await.is_err() {
            return Err(StoreError::EffectTimeout(self.pending()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for applying actions and executing effects.
pub mod store {
    use super::metrics::{EffectMetrics, StoreMetrics};
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, StoreConfig, StoreError, watch,
    };
    use std::sync::{Mutex, PoisonError, RwLock, Weak};

    type Listener = Arc<dyn Fn() + Send + Sync>;

    /// Registered listeners in subscription order
    #[derive(Default)]
    struct ListenerRegistry {
        next_id: u64,
        entries: Vec<(u64, Listener)>,
    }

    /// Handle returned by [`Store::subscribe`]
    ///
    /// Dropping the handle does **not** remove the listener; call
    /// [`Subscription::unsubscribe`].
    #[must_use = "keep the subscription to be able to unsubscribe later"]
    pub struct Subscription {
        id: u64,
        registry: Weak<Mutex<ListenerRegistry>>,
    }

    impl Subscription {
        /// Remove the listener from its store
        ///
        /// Returns `false` if the store is gone or the listener was already removed.
        #[allow(clippy::must_use_candidate)]
        pub fn unsubscribe(self) -> bool {
            let Some(registry) = self.registry.upgrade() else {
                return false;
            };
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            let before = registry.entries.len();
            registry.entries.retain(|(id, _)| *id != self.id);
            before != registry.entries.len()
        }
    }

    impl std::fmt::Debug for Subscription {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Subscription").field("id", &self.id).finish()
        }
    }

    /// The Store - sole owner of the canonical state
    ///
    /// The Store manages:
    /// 1. State (behind an `RwLock`, only ever written by the reducer)
    /// 2. Reducer (transition logic)
    /// 3. Environment (injected dependencies)
    /// 4. Subscribers (notified after every committed action)
    /// 5. Effect execution (with feedback loop)
    ///
    /// Cloning a Store is cheap and yields another handle to the same state;
    /// pass clones to every consumer instead of reaching for a global.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        environment: Arc<E>,
        listeners: Arc<Mutex<ListenerRegistry>>,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let config = StoreConfig::default().with_shutdown_timeout(Duration::from_secs(5));
        /// let store = Store::with_config(AppState::default(), reducer, env, config);
        /// ```
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                environment: Arc::new(environment),
                listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Dispatch an action to the store
        ///
        /// This is the only way state changes:
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Releases the lock and notifies every subscriber
        /// 4. Starts the returned effects on the ambient tokio runtime
        ///
        /// When this returns the new state is committed and all subscribers
        /// have run. Effects keep running afterwards; use the returned
        /// [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic propagates to the caller.
        #[tracing::instrument(skip(self, action), name = "store_dispatch")]
        pub fn dispatch(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                StoreMetrics::record_rejected();
                return Err(StoreError::ShutdownInProgress);
            }

            Ok(self.apply(action, true))
        }

        /// Reduce, commit, notify, then start effects
        fn apply(&self, action: A, start_effects: bool) -> EffectHandle {
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                tracing::trace!("Acquired write lock on state");

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &*self.environment);
                StoreMetrics::record_dispatch(start.elapsed(), effects.len());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            self.notify();

            if start_effects {
                for effect in effects {
                    self.execute_effect(effect, &tracking);
                }
            } else if !effects.is_empty() {
                tracing::debug!(
                    dropped = effects.len(),
                    "Store is shutting down, not starting follow-up effects"
                );
                EffectMetrics::record_dropped(effects.len());
            }

            handle
        }

        /// Call every subscriber, in subscription order, without holding any lock
        fn notify(&self) {
            let listeners: Vec<_> = {
                let registry = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
                registry
                    .entries
                    .iter()
                    .map(|(_, listener)| Arc::clone(listener))
                    .collect()
            };

            StoreMetrics::record_notify(listeners.len());
            for listener in listeners {
                listener();
            }
        }

        /// Register a change listener
        ///
        /// The listener receives no arguments; it is a signal to re-read the
        /// state through [`Store::state`] or [`Store::snapshot`]. It runs
        /// synchronously inside `dispatch`, after the new state is committed.
        pub fn subscribe<F>(&self, listener: F) -> Subscription
        where
            F: Fn() + Send + Sync + 'static,
        {
            let mut registry = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(listener)));
            tracing::debug!(subscription = id, "Listener subscribed");

            Subscription {
                id,
                registry: Arc::downgrade(&self.listeners),
            }
        }

        /// Number of registered listeners
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .len()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let ticket_count = store.state(|s| s.tickets.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&*state)
        }

        /// Clone the current state
        #[must_use]
        pub fn snapshot(&self) -> S
        where
            S: Clone,
        {
            self.state(S::clone)
        }

        /// Number of effects currently running for this store
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Whether `shutdown` has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Waits for pending effects to complete (with timeout)
        ///
        /// Effects already running are not cancelled. Their results are still
        /// applied, but any effects those results would start are dropped.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            StoreMetrics::record_shutdown("initiated");

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    StoreMetrics::record_shutdown("completed");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running",
                        pending
                    );
                    StoreMetrics::record_shutdown("timeout");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(self.config.shutdown_poll_interval).await;
            }
        }

        /// Shut down using the configured default timeout
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_with_default_timeout(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        /// Apply an action produced by an effect
        ///
        /// Feedback is applied even while shutting down, because the request
        /// that produced it was already in flight.
        fn feed_back(&self, action: A) {
            let start_effects = !self.shutdown.load(Ordering::Acquire);
            let _ = self.apply(action, start_effects);
        }

        /// Register a running effect with both the dispatch handle and the store
        fn track(&self, tracking: &EffectTracking) -> (DecrementGuard, AtomicCounterGuard) {
            tracking.increment();
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            (
                DecrementGuard(tracking.clone()),
                AtomicCounterGuard(Arc::clone(&self.pending_effects)),
            )
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Future`: Executes async computation, dispatches resulting action if `Some`
        /// - `Delay`: Waits for duration, then dispatches action
        /// - `Parallel`: Executes effects concurrently
        /// - `Sequential`: Executes effects in order, waiting for each to complete
        ///
        /// Effects need a tokio runtime. Without one the effect is dropped and
        /// logged; the state change that produced it stays committed.
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            let runtime = match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    return;
                }
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    EffectMetrics::record_executed("parallel");
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                    return;
                }
                ref other => match tokio::runtime::Handle::try_current() {
                    Ok(runtime) => runtime,
                    Err(error) => {
                        tracing::error!(
                            effect = effect_kind(other),
                            %error,
                            "No tokio runtime available, dropping effect"
                        );
                        EffectMetrics::record_dropped(1);
                        return;
                    }
                },
            };

            match effect {
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    EffectMetrics::record_executed("future");
                    let guards = self.track(tracking);
                    let store = self.clone();

                    runtime.spawn(async move {
                        let _guards = guards;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, dispatching");
                            store.feed_back(action);
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                }
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    EffectMetrics::record_executed("delay");
                    let guards = self.track(tracking);
                    let store = self.clone();

                    runtime.spawn(async move {
                        let _guards = guards;
                        tokio::time::sleep(duration).await;
                        tracing::trace!("Effect::Delay completed, dispatching action");
                        store.feed_back(*action);
                    });
                }
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    EffectMetrics::record_executed("sequential");
                    let guards = self.track(tracking);
                    let store = self.clone();

                    runtime.spawn(async move {
                        let _guards = guards;

                        for (idx, effect) in effects.into_iter().enumerate() {
                            tracing::trace!(
                                "Executing sequential effect {} of {}",
                                idx + 1,
                                effect_count
                            );

                            let (sub_tx, mut sub_rx) = watch::channel(());
                            let sub_tracking = EffectTracking {
                                counter: Arc::new(AtomicUsize::new(0)),
                                notifier: sub_tx,
                            };

                            store.execute_effect(effect, &sub_tracking);

                            while sub_tracking.counter.load(Ordering::SeqCst) > 0 {
                                if sub_rx.changed().await.is_err() {
                                    break;
                                }
                            }
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                }
                Effect::None | Effect::Parallel(_) => {}
            }
        }
    }

    fn effect_kind<A>(effect: &Effect<A>) -> &'static str {
        match effect {
            Effect::None => "none",
            Effect::Parallel(_) => "parallel",
            Effect::Sequential(_) => "sequential",
            Effect::Delay { .. } => "delay",
            Effect::Future(_) => "future",
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                environment: Arc::clone(&self.environment),
                listeners: Arc::clone(&self.listeners),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }

    impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("config", &self.config)
                .field("pending_effects", &self.pending_effects.load(Ordering::Acquire))
                .field("shutting_down", &self.shutdown.load(Ordering::Acquire))
                .finish_non_exhaustive()
        }
    }
}

pub use store::{Store, Subscription};
