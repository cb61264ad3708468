//! Store wiring.
//!
//! There is no global store: build one with [`build_store`] and hand clones
//! of it to whatever needs to read state or dispatch.

use crate::action::AppAction;
use crate::reducer::{AppReducer, TicketEnvironment, app_reducer};
use crate::service::TicketService;
use crate::types::AppState;
use prioritize_runtime::{Store, StoreConfig};
use std::sync::Arc;

/// The application store
pub type TicketStore = Store<AppState, AppAction, TicketEnvironment, AppReducer>;

/// Empty-state store over `service`
#[must_use]
pub fn build_store(service: Arc<dyn TicketService>) -> TicketStore {
    build_store_with_config(service, StoreConfig::default())
}

/// Empty-state store over `service` with a custom runtime configuration
#[must_use]
pub fn build_store_with_config(service: Arc<dyn TicketService>, config: StoreConfig) -> TicketStore {
    Store::with_config(
        AppState::new(),
        app_reducer(),
        TicketEnvironment::new(service),
        config,
    )
}
