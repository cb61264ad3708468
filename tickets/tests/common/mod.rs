//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tickets::{ServiceError, ServiceFuture, Ticket, TicketDraft, TicketId, TicketService};
use tokio::sync::Notify;

/// Ticket with default scores
pub fn ticket(id: u64, initiative: &str) -> Ticket {
    TicketDraft::new(initiative).into_ticket(TicketId::new(id))
}

/// Initiatives of `tickets`, in order
pub fn initiatives(tickets: &[Ticket]) -> Vec<String> {
    tickets.iter().map(|t| t.initiative.clone()).collect()
}

/// Service whose responses are held until the test releases them
///
/// Each call waits on a gate named after the request: `"list"` for
/// `list_tickets`, the initiative for `create_ticket` and `update_ticket`.
/// Ids are handed out in the order requests reach the service.
#[derive(Default)]
pub struct GatedTicketService {
    next_id: AtomicU64,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashMap<String, ServiceError>>,
    listed: Mutex<Vec<Ticket>>,
}

impl GatedTicketService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets returned by `list_tickets`
    pub fn set_listing(&self, tickets: Vec<Ticket>) {
        *self.listed.lock().unwrap() = tickets;
    }

    /// Let the request behind `gate` answer
    pub fn release(&self, gate: &str) {
        self.gate(gate).notify_one();
    }

    /// Make the request behind `gate` fail with `error` once released
    pub fn fail(&self, gate: &str, error: ServiceError) {
        self.failures.lock().unwrap().insert(gate.to_string(), error);
    }

    fn gate(&self, name: &str) -> Arc<Notify> {
        Arc::clone(
            self.gates
                .lock()
                .unwrap()
                .entry(name.to_string())
                .or_default(),
        )
    }

    async fn pass(&self, name: &str) -> Result<(), ServiceError> {
        self.gate(name).notified().await;
        match self.failures.lock().unwrap().remove(name) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl TicketService for GatedTicketService {
    fn list_tickets(&self) -> ServiceFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.pass("list").await?;
            Ok(self.listed.lock().unwrap().clone())
        })
    }

    fn create_ticket(&self, draft: TicketDraft) -> ServiceFuture<'_, Ticket> {
        let id = TicketId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        Box::pin(async move {
            self.pass(&draft.initiative).await?;
            Ok(draft.into_ticket(id))
        })
    }

    fn update_ticket(&self, ticket: Ticket) -> ServiceFuture<'_, ()> {
        Box::pin(async move { self.pass(&ticket.initiative).await })
    }
}
