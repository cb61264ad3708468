//! Client state for a ticket-prioritization app.
//!
//! Tickets are work items scored by target, impact, confidence and effort.
//! This crate holds the one source of truth for the ticket list and the
//! session, and keeps it consistent while fetch/create/update requests finish
//! in any order:
//!
//! - [`AppState`] and the domain types
//! - [`AppAction`], the closed set of transitions and requests
//! - [`app_reducer`] for the store and [`reduce`] as a plain function
//! - [`TicketService`] with in-memory and HTTP implementations
//! - [`build_store`] to wire it all into a
//!   [`Store`](prioritize_runtime::Store)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tickets::{AppAction, InMemoryTicketService, TicketDraft, User, build_store};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = build_store(Arc::new(InMemoryTicketService::new()));
//!
//! // Logging in loads the ticket list
//! let mut handle = store.dispatch(AppAction::SetUser(Some(User::new("ana"))))?;
//! handle.wait().await;
//!
//! // Creating a ticket appends the server's copy once it answers
//! let mut handle = store.dispatch(AppAction::CreateTicket(TicketDraft::new("Search")))?;
//! handle.wait().await;
//!
//! println!("{} tickets", store.state(|s| s.len()));
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod effects;
pub mod http;
pub mod memory;
pub mod reducer;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use action::AppAction;
pub use config::{Backend, ClientConfig, ConfigError};
pub use http::HttpTicketService;
pub use memory::{CallCounts, InMemoryTicketService};
pub use reducer::{
    AppReducer, SessionReducer, TicketEnvironment, TicketListReducer, app_reducer, reduce,
};
pub use service::{ServiceError, ServiceFuture, TicketService};
pub use store::{TicketStore, build_store, build_store_with_config};
pub use types::{AppState, AuthToken, ReferenceId, Ticket, TicketDraft, TicketId, User};
