//! Effects that call the ticket service.
//!
//! Each function builds one `Effect::Future`. On success the future yields
//! exactly one transition; on failure it yields nothing, so the state keeps
//! its last known-good value and the failure only shows up in logs and
//! metrics.

use crate::action::AppAction;
use crate::reducer::TicketEnvironment;
use crate::service::ServiceError;
use crate::types::{Ticket, TicketDraft};
use prioritize_core::{async_call, effect::Effect};
use prioritize_runtime::metrics::ServiceMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Metric/log label of `list_tickets`
pub const LIST_TICKETS: &str = "list_tickets";
/// Metric/log label of `create_ticket`
pub const CREATE_TICKET: &str = "create_ticket";
/// Metric/log label of `update_ticket`
pub const UPDATE_TICKET: &str = "update_ticket";

/// Fetch all tickets, then `SetTickets`
pub fn load_tickets(env: &TicketEnvironment) -> Effect<AppAction> {
    let service = Arc::clone(&env.service);
    async_call! {
        call: observed(LIST_TICKETS, service.list_tickets()),
        on_success: |tickets| Some(AppAction::SetTickets(tickets)),
        on_error: |_error| None,
    }
}

/// Create a ticket, then `AddTicket` with the server's copy
pub fn create_ticket(env: &TicketEnvironment, draft: TicketDraft) -> Effect<AppAction> {
    let service = Arc::clone(&env.service);
    async_call! {
        call: observed(CREATE_TICKET, service.create_ticket(draft)),
        on_success: |ticket| Some(AppAction::AddTicket(ticket)),
        on_error: |_error| None,
    }
}

/// Store an edited ticket, then `UpdateTicket` with the same value
pub fn save_ticket(env: &TicketEnvironment, ticket: Ticket) -> Effect<AppAction> {
    let service = Arc::clone(&env.service);
    async_call! {
        call: observed(UPDATE_TICKET, service.update_ticket(ticket.clone())),
        on_success: |()| Some(AppAction::UpdateTicket(ticket)),
        on_error: |_error| None,
    }
}

/// Count, time and log one service call
async fn observed<T, F>(operation: &'static str, call: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    ServiceMetrics::record_request(operation);
    tracing::debug!(operation, "Calling ticket service");
    let start = Instant::now();

    let result = call.await;

    match &result {
        Ok(_) => {
            ServiceMetrics::record_success(operation, start.elapsed());
            tracing::debug!(
                operation,
                elapsed_ms = start.elapsed().as_millis(),
                "Ticket service call succeeded"
            );
        }
        Err(error) => {
            ServiceMetrics::record_failure(operation);
            tracing::warn!(operation, %error, "Ticket service call failed, state unchanged");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTicketService;
    use crate::service::TicketService;
    use crate::types::TicketId;
    use prioritize_testing::collect_actions;

    fn env_with(service: &Arc<InMemoryTicketService>) -> TicketEnvironment {
        TicketEnvironment::new(Arc::clone(service) as Arc<dyn TicketService>)
    }

    #[tokio::test]
    async fn test_load_yields_set_tickets() {
        let seeded = TicketDraft::new("a").into_ticket(TicketId::new(1));
        let service = Arc::new(InMemoryTicketService::with_tickets(vec![seeded.clone()]));

        let actions = collect_actions([load_tickets(&env_with(&service))]).await;

        assert_eq!(actions, vec![AppAction::SetTickets(vec![seeded])]);
    }

    #[tokio::test]
    async fn test_create_yields_server_ticket() {
        let service = Arc::new(InMemoryTicketService::new());

        let actions =
            collect_actions([create_ticket(&env_with(&service), TicketDraft::new("new"))]).await;

        assert_eq!(
            actions,
            vec![AppAction::AddTicket(
                TicketDraft::new("new").into_ticket(TicketId::new(1))
            )]
        );
    }

    #[tokio::test]
    async fn test_save_yields_the_sent_ticket() {
        let original = TicketDraft::new("a").into_ticket(TicketId::new(3));
        let service = Arc::new(InMemoryTicketService::with_tickets(vec![original]));
        let edited = TicketDraft::new("a")
            .with_description("revised")
            .into_ticket(TicketId::new(3));

        let actions = collect_actions([save_ticket(&env_with(&service), edited.clone())]).await;

        assert_eq!(actions, vec![AppAction::UpdateTicket(edited)]);
    }

    #[tokio::test]
    async fn test_failure_yields_nothing() {
        let service = Arc::new(InMemoryTicketService::new());
        service.fail_with(Some(ServiceError::Unauthorized));
        let env = env_with(&service);

        let actions = collect_actions([
            load_tickets(&env),
            create_ticket(&env, TicketDraft::new("x")),
            save_ticket(&env, TicketDraft::new("x").into_ticket(TicketId::new(1))),
        ])
        .await;

        assert!(actions.is_empty());
    }
}
