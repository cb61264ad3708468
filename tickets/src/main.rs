//! Command-line demo of the ticket client state.
//!
//! Logs in, creates two tickets concurrently, edits one and prints the list
//! after every step. Uses the in-memory service unless `TICKETS_BACKEND=http`.

use anyhow::Context;
use chrono::NaiveDate;
use prioritize_runtime::metrics::MetricsServer;
use std::sync::Arc;
use std::time::Duration;
use tickets::{
    AppAction, AppState, AuthToken, Backend, ClientConfig, HttpTicketService,
    InMemoryTicketService, ReferenceId, TicketDraft, TicketId, TicketService, User,
    build_store_with_config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("reading configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Ticket Prioritization Client ===\n");

    let mut metrics = config.metrics_addr.map(MetricsServer::new);
    if let Some(server) = metrics.as_mut() {
        server.start().context("starting metrics")?;
    }

    let service = build_service(&config)?;
    let store = build_store_with_config(service, config.store_config());

    let listener_store = store.clone();
    let subscription = store.subscribe(move || {
        let (count, user) = listener_store.state(|s| {
            (s.len(), s.logged_in_user.as_ref().map(|u| u.username.clone()))
        });
        tracing::debug!(tickets = count, user = ?user, "State changed");
    });

    // Logging in triggers exactly one load. The token in state is session
    // data; the HTTP service got its own copy in build_service.
    if let Some(token) = &config.api_token {
        store.dispatch(AppAction::SetAuth(Some(AuthToken::new(token.clone()))))?;
    }
    let mut login = store.dispatch(AppAction::SetUser(Some(User::new("demo"))))?;
    login.wait_with_timeout(config.request_timeout).await?;
    print_tickets("After login", &store.snapshot());

    // Two overlapping creates: applied in response order
    let mut first = store.dispatch(AppAction::CreateTicket(
        TicketDraft::new("Single sign-on")
            .with_description("Let staff log in with the company directory")
            .with_scores(
                ReferenceId::new(3),
                ReferenceId::new(3),
                ReferenceId::new(2),
                ReferenceId::new(4),
            ),
    ))?;
    let mut second = store.dispatch(AppAction::CreateTicket(
        TicketDraft::new("CSV export").with_description("Export the ticket list"),
    ))?;
    let (first, second) = futures::future::join(
        first.wait_with_timeout(config.request_timeout),
        second.wait_with_timeout(config.request_timeout),
    )
    .await;
    first?;
    second?;
    print_tickets("After creating two tickets", &store.snapshot());

    // Edit: the full ticket is rebuilt from the draft before it is sent
    if let Some(ticket) = store.state(|s| s.tickets.first().cloned()) {
        let mut draft = ticket.draft();
        draft.description = format!("{} (revised)", draft.description);
        if let Some(due) = NaiveDate::from_ymd_opt(2025, 6, 30) {
            draft = draft.with_due_date(due);
        }
        let mut save = store.dispatch(AppAction::SaveTicket { id: ticket.id, draft })?;
        save.wait_with_timeout(config.request_timeout).await?;
        print_tickets("After editing the first ticket", &store.snapshot());
    }

    // Updating an unknown id changes nothing
    let ghost = TicketDraft::new("ghost").into_ticket(TicketId::new(u64::MAX));
    store.dispatch(AppAction::UpdateTicket(ghost))?;
    println!("Unknown update ignored: {} tickets\n", store.state(AppState::len));

    subscription.unsubscribe();
    store
        .shutdown(config.shutdown_timeout)
        .await
        .context("shutting down store")?;

    if let Some(text) = metrics.as_ref().and_then(MetricsServer::render) {
        println!("=== Metrics ===\n{text}");
    }

    Ok(())
}

fn build_service(config: &ClientConfig) -> anyhow::Result<Arc<dyn TicketService>> {
    match config.backend {
        Backend::InMemory => {
            let seeded = vec![
                TicketDraft::new("Onboarding checklist")
                    .with_description("Guide new users through setup")
                    .into_ticket(TicketId::new(1)),
                TicketDraft::new("Dark mode")
                    .with_description("Theme support for the dashboard")
                    .into_ticket(TicketId::new(2)),
            ];
            Ok(Arc::new(
                InMemoryTicketService::with_tickets(seeded).with_latency(Duration::from_millis(25)),
            ))
        }
        Backend::Http => {
            let mut service = HttpTicketService::new(&config.api_url, config.request_timeout)
                .context("building HTTP client")?;
            if let Some(token) = &config.api_token {
                service = service.with_token(AuthToken::new(token.clone()));
            }
            tracing::info!(url = %config.api_url, "Using HTTP ticket service");
            Ok(Arc::new(service))
        }
    }
}

fn print_tickets(heading: &str, state: &AppState) {
    println!("{heading}:");
    if state.is_empty() {
        println!("  (no tickets)");
    }
    for ticket in &state.tickets {
        println!(
            "  #{:<3} {:<22} target={} impact={} confidence={} effort={}  {}",
            ticket.id,
            ticket.initiative,
            ticket.target_id,
            ticket.impact_id,
            ticket.confidence_id,
            ticket.effort_id,
            ticket.description
        );
    }
    println!();
}
