//! In-memory ticket service.
//!
//! Behaves like the backend for the demo binary and the tests: ids are
//! assigned sequentially, updates to unknown ids fail with `NotFound`, and a
//! failure can be injected to exercise the error path.

use crate::service::{ServiceError, ServiceFuture, TicketService};
use crate::types::{Ticket, TicketDraft, TicketId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Calls received per operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `list_tickets` calls
    pub list: usize,
    /// `create_ticket` calls
    pub create: usize,
    /// `update_ticket` calls
    pub update: usize,
}

#[derive(Debug)]
struct Backend {
    tickets: Vec<Ticket>,
    next_id: u64,
    failure: Option<ServiceError>,
}

/// Ticket service backed by a `Vec`
#[derive(Debug)]
pub struct InMemoryTicketService {
    backend: Mutex<Backend>,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
}

impl InMemoryTicketService {
    /// Empty service; the first created ticket gets id 1
    #[must_use]
    pub fn new() -> Self {
        Self::with_tickets(Vec::new())
    }

    /// Service pre-seeded with `tickets`; new ids continue after the largest
    #[must_use]
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let next_id = tickets.iter().map(|t| t.id.get()).max().unwrap_or(0).saturating_add(1);
        Self {
            backend: Mutex::new(Backend {
                tickets,
                next_id,
                failure: None,
            }),
            latency: None,
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call fail with `error` (`None` to recover)
    pub fn fail_with(&self, error: Option<ServiceError>) {
        self.lock().failure = error;
    }

    /// Tickets currently held by the service
    #[must_use]
    pub fn tickets(&self) -> Vec<Ticket> {
        self.lock().tickets.clone()
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            list: self.list_calls.load(Ordering::SeqCst),
            create: self.create_calls.load(Ordering::SeqCst),
            update: self.update_calls.load(Ordering::SeqCst),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn respond(&self) -> Result<(), ServiceError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.lock().failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryTicketService {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketService for InMemoryTicketService {
    fn list_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.respond().await?;
            Ok(self.tickets())
        })
    }

    fn create_ticket(&self, draft: TicketDraft) -> ServiceFuture<'_, Ticket> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.respond().await?;
            if draft.initiative.trim().is_empty() {
                return Err(ServiceError::Validation(
                    "initiative must not be empty".to_string(),
                ));
            }

            let mut backend = self.lock();
            if backend.tickets.iter().any(|t| t.id.get() == backend.next_id) {
                return Err(ServiceError::Server {
                    status: 507,
                    message: "ticket ids exhausted".to_string(),
                });
            }
            let ticket = draft.into_ticket(TicketId::new(backend.next_id));
            backend.next_id = backend.next_id.saturating_add(1);
            backend.tickets.push(ticket.clone());
            Ok(ticket)
        })
    }

    fn update_ticket(&self, ticket: Ticket) -> ServiceFuture<'_, ()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            self.respond().await?;
            let mut backend = self.lock();
            let Some(slot) = backend.tickets.iter_mut().find(|t| t.id == ticket.id) else {
                return Err(ServiceError::NotFound(ticket.id));
            };
            *slot = ticket;
            Ok(())
        })
    }
}
