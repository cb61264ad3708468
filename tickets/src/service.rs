//! The remote ticket service seen from the client.
//!
//! The reducers never call the service themselves; they return effects that
//! do (see [`crate::effects`]). Implementations live in [`crate::memory`] and
//! [`crate::http`].

use crate::types::{Ticket, TicketDraft, TicketId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TicketService`] methods
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Errors reported by a ticket service
///
/// None of these ever reach [`AppState`](crate::AppState); they are logged and
/// counted, and the state keeps its last known-good value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request never got a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with an unexpected status
    #[error("Server error (status {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// No ticket with this id exists
    #[error("Ticket {0} not found")]
    NotFound(TicketId),

    /// The server rejected the submitted fields
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The response body could not be decoded
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// Missing or rejected credential
    #[error("Unauthorized")]
    Unauthorized,
}

/// Operations the client needs from the backend
///
/// Methods return boxed futures so the service can sit behind
/// `Arc<dyn TicketService>` in the environment.
pub trait TicketService: Send + Sync {
    /// Fetch every ticket, in server order
    ///
    /// # Errors
    ///
    /// Transport or server errors.
    fn list_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>>;

    /// Create a ticket and return it with its server-assigned id
    ///
    /// # Errors
    ///
    /// Validation, transport or server errors.
    fn create_ticket(&self, draft: TicketDraft) -> ServiceFuture<'_, Ticket>;

    /// Store new field values for an existing ticket
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the id is unknown, plus validation,
    /// transport or server errors.
    fn update_ticket(&self, ticket: Ticket) -> ServiceFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ServiceError::NotFound(TicketId::new(12)).to_string(),
            "Ticket 12 not found"
        );
        assert_eq!(
            ServiceError::Server {
                status: 503,
                message: "maintenance".to_string()
            }
            .to_string(),
            "Server error (status 503): maintenance"
        );
    }
}
