//! # Prioritize Testing
//!
//! Testing utilities for reducers and stores.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect assertions and an effect driver for reducer-level tests
//! - Probes that record store notifications
//!
//! ## Example
//!
//! ```ignore
//! use prioritize_testing::{NotificationProbe, StateHistory};
//!
//! #[tokio::test]
//! async fn test_login_loads_tickets() {
//!     let store = build_store(environment);
//!     let probe = NotificationProbe::attach(&store);
//!     let history = StateHistory::attach(&store, |s: &AppState| s.tickets.len());
//!
//!     let mut handle = store.dispatch(AppAction::SetUser(Some(user))).unwrap();
//!     handle.wait().await;
//!
//!     assert_eq!(probe.count(), 2);
//!     assert_eq!(history.values(), vec![0, 3]);
//! }
//! ```

use prioritize_core::{effect::Effect, reducer::Reducer};
use prioritize_runtime::Store;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};


pub use reducer_test::{ReducerTest, assertions};

/// Store observers for tests.
pub mod probes {
    use super::{Arc, AtomicUsize, Mutex, Ordering, PoisonError, Reducer, Store};

    /// Counts how many times a store notified its listeners.
    #[derive(Debug, Clone, Default)]
    pub struct NotificationProbe {
        calls: Arc<AtomicUsize>,
    }

    impl NotificationProbe {
        /// Create a detached probe
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Subscribe a fresh probe to `store`
        ///
        /// The listener stays registered for the life of the store.
        pub fn attach<S, A, E, R>(store: &Store<S, A, E, R>) -> Self
        where
            R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
            A: Send + 'static,
            S: Send + Sync + 'static,
            E: Send + Sync + 'static,
        {
            let probe = Self::new();
            let _subscription = store.subscribe(probe.listener());
            probe
        }

        /// A listener closure that bumps this probe
        #[must_use]
        pub fn listener(&self) -> impl Fn() + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        /// Notifications seen so far
        #[must_use]
        pub fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Records a projection of the state at every notification.
    #[derive(Debug)]
    pub struct StateHistory<T> {
        values: Arc<Mutex<Vec<T>>>,
    }

    impl<T> Clone for StateHistory<T> {
        fn clone(&self) -> Self {
            Self {
                values: Arc::clone(&self.values),
            }
        }
    }

    impl<T> StateHistory<T>
    where
        T: Clone + Send + 'static,
    {
        /// Subscribe to `store`, recording `project(&state)` after each commit
        pub fn attach<S, A, E, R, F>(store: &Store<S, A, E, R>, project: F) -> Self
        where
            R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
            A: Send + 'static,
            S: Send + Sync + 'static,
            E: Send + Sync + 'static,
            F: Fn(&S) -> T + Send + Sync + 'static,
        {
            let values = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&values);
            let reader = store.clone();
            let _subscription = store.subscribe(move || {
                let value = reader.state(&project);
                sink.lock().unwrap_or_else(PoisonError::into_inner).push(value);
            });
            Self { values }
        }

        /// Every recorded value, oldest first
        #[must_use]
        pub fn values(&self) -> Vec<T> {
            self.values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// The most recent value, if any
        #[must_use]
        pub fn last(&self) -> Option<T> {
            self.values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }
    }
}

/// Drives effect descriptions without a store.
pub mod effects {
    use super::{Effect, VecDeque};

    /// Run effects to completion and collect the actions they produce
    ///
    /// Groups are flattened in declaration order and `Delay` effects yield
    /// their action immediately. Produced actions are **not** reduced.
    pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut queue: VecDeque<Effect<A>> = effects.into_iter().collect();
        let mut actions = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::None => {}
                Effect::Parallel(group) | Effect::Sequential(group) => {
                    for effect in group.into_iter().rev() {
                        queue.push_front(effect);
                    }
                }
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        actions.push(action);
                    }
                }
            }
        }

        actions
    }
}

/// Tracing setup for tests.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly fmt subscriber once per process
    ///
    /// Honors `RUST_LOG`, defaulting to `warn`. Later calls are no-ops.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use effects::collect_actions;
pub use logging::init_test_tracing;
pub use probes::{NotificationProbe, StateHistory};
