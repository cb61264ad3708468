//! Reducer logic for the ticket client.
//!
//! Two reducers share [`AppState`]:
//!
//! - [`SessionReducer`] owns `logged_in_user` and `auth`, and starts the
//!   ticket load on login.
//! - [`TicketListReducer`] owns `tickets` and turns requests into service
//!   effects.
//!
//! [`app_reducer`] combines them. [`reduce`] is the same state transition as
//! a plain function, for callers that only need the next state.

use crate::action::AppAction;
use crate::effects;
use crate::service::TicketService;
use crate::types::AppState;
use prioritize_core::{
    SmallVec,
    composition::{BoxedReducer, CombinedReducer, combine_reducers},
    effect::Effect,
    reducer::Reducer,
    smallvec,
};
use std::sync::Arc;

/// Environment dependencies for the ticket reducers
///
/// The service carries its own transport credential, set when it is built
/// (see [`HttpTicketService::with_token`](crate::http::HttpTicketService::with_token)).
/// `AppState::auth` is session state only and is not read by the effects.
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Backend the request effects call
    pub service: Arc<dyn TicketService>,
}

impl TicketEnvironment {
    /// Creates a new `TicketEnvironment`
    #[must_use]
    pub fn new(service: Arc<dyn TicketService>) -> Self {
        Self { service }
    }
}

impl std::fmt::Debug for TicketEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketEnvironment").finish_non_exhaustive()
    }
}

/// The combined application reducer
pub type AppReducer = CombinedReducer<AppState, AppAction, TicketEnvironment>;

/// Build the application reducer: session first, then the ticket list
#[must_use]
pub fn app_reducer() -> AppReducer {
    let reducers: Vec<BoxedReducer<AppState, AppAction, TicketEnvironment>> =
        vec![Box::new(SessionReducer), Box::new(TicketListReducer)];
    combine_reducers(reducers)
}

/// Next state for `action`, leaving `state` untouched
///
/// Total: requests and unrecognized actions return an equal state.
#[must_use]
pub fn reduce(state: &AppState, action: AppAction) -> AppState {
    let mut next = state.clone();
    match action {
        AppAction::SetTickets(tickets) => next.set_tickets(tickets),
        AppAction::AddTicket(ticket) => next.add_ticket(ticket),
        AppAction::UpdateTicket(ticket) => {
            next.update_ticket(ticket);
        }
        AppAction::SetUser(user) => {
            next.set_user(user);
        }
        AppAction::SetAuth(auth) => next.set_auth(auth),
        AppAction::Reset => next = AppState::default(),
        AppAction::LoadTickets
        | AppAction::CreateTicket(_)
        | AppAction::SaveTicket { .. }
        | AppAction::Unknown => {}
    }
    next
}

/// Reducer for the session half of the state
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::SetUser(user) => {
                let username = user.as_ref().map(|u| u.username.clone());
                if state.set_user(user) {
                    tracing::info!(user = ?username, "User logged in, loading tickets");
                    return smallvec![effects::load_tickets(env)];
                }
                if username.is_none() {
                    tracing::debug!("User logged out");
                }
            }
            AppAction::SetAuth(auth) => state.set_auth(auth),
            AppAction::Reset => {
                state.set_user(None);
                state.set_auth(None);
            }
            _ => {}
        }
        SmallVec::new()
    }
}

/// Reducer for the ticket list
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketListReducer;

impl Reducer for TicketListReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Transitions ==========
            AppAction::SetTickets(tickets) => {
                tracing::debug!(count = tickets.len(), "Replacing ticket list");
                state.set_tickets(tickets);
            }
            AppAction::AddTicket(ticket) => state.add_ticket(ticket),
            AppAction::UpdateTicket(ticket) => {
                let id = ticket.id;
                if !state.update_ticket(ticket) {
                    tracing::debug!(%id, "No ticket with this id, update ignored");
                }
            }
            AppAction::Reset => state.set_tickets(Vec::new()),

            // ========== Requests ==========
            AppAction::LoadTickets => return smallvec![effects::load_tickets(env)],
            AppAction::CreateTicket(draft) => return smallvec![effects::create_ticket(env, draft)],
            AppAction::SaveTicket { id, draft } => {
                return smallvec![effects::save_ticket(env, draft.into_ticket(id))];
            }

            AppAction::SetUser(_) | AppAction::SetAuth(_) | AppAction::Unknown => {}
        }
        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTicketService;
    use crate::types::{AuthToken, Ticket, TicketDraft, TicketId, User};
    use prioritize_testing::{ReducerTest, assertions};

    fn create_test_env() -> TicketEnvironment {
        TicketEnvironment::new(Arc::new(InMemoryTicketService::new()))
    }

    fn ticket(id: u64, initiative: &str) -> Ticket {
        TicketDraft::new(initiative).into_ticket(TicketId::new(id))
    }

    fn ids(state: &AppState) -> Vec<u64> {
        state.tickets.iter().map(|t| t.id.get()).collect()
    }

    fn with_tickets(tickets: Vec<Ticket>) -> AppState {
        AppState {
            tickets,
            ..AppState::default()
        }
    }

    #[test]
    fn test_set_tickets_replaces_wholesale() {
        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(with_tickets(vec![ticket(1, "a"), ticket(2, "b")]))
            .when_action(AppAction::SetTickets(vec![ticket(3, "c")]))
            .then_state(|state| assert_eq!(ids(state), vec![3]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_ticket_appends() {
        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(with_tickets(vec![ticket(1, "a")]))
            .when_action(AppAction::AddTicket(ticket(2, "b")))
            .then_state(|state| assert_eq!(ids(state), vec![1, 2]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_update_ticket_in_place() {
        let mut revised = ticket(2, "b");
        revised.description = "revised".to_string();

        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(with_tickets(vec![ticket(1, "a"), ticket(2, "b"), ticket(3, "c")]))
            .when_action(AppAction::UpdateTicket(revised))
            .then_state(|state| {
                assert_eq!(ids(state), vec![1, 2, 3]);
                assert_eq!(state.tickets[1].description, "revised");
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_update_missing_ticket_is_noop() {
        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(with_tickets(vec![ticket(1, "a")]))
            .when_action(AppAction::UpdateTicket(ticket(26, "z")))
            .then_state(|state| assert_eq!(*state, with_tickets(vec![ticket(1, "a")])))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_login_requests_tickets_once() {
        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(AppState::new())
            .when_actions([
                AppAction::SetUser(Some(User::new("ana"))),
                AppAction::SetUser(Some(User::new("ana"))),
                AppAction::SetAuth(Some(AuthToken::new("t"))),
            ])
            .then_state(|state| {
                assert!(state.is_logged_in());
                assert!(state.auth.is_some());
            })
            .then_effects(|effects| assertions::assert_future_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_logout_keeps_tickets_and_relogin_reloads() {
        let logged_in = AppState {
            tickets: vec![ticket(1, "a")],
            logged_in_user: Some(User::new("ana")),
            auth: None,
        };

        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(logged_in)
            .when_actions([
                AppAction::SetUser(None),
                AppAction::SetUser(Some(User::new("bo"))),
            ])
            .then_state(|state| {
                assert_eq!(ids(state), vec![1]);
                assert_eq!(state.logged_in_user, Some(User::new("bo")));
            })
            .then_effects(|effects| assertions::assert_future_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn test_requests_leave_state_alone() {
        let state = with_tickets(vec![ticket(1, "a")]);
        let expected = state.clone();

        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(state)
            .when_actions([
                AppAction::LoadTickets,
                AppAction::CreateTicket(TicketDraft::new("b")),
                AppAction::SaveTicket {
                    id: TicketId::new(1),
                    draft: TicketDraft::new("a2"),
                },
            ])
            .then_state(move |state| assert_eq!(*state, expected))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 3);
                assertions::assert_future_effects_count(effects, 3);
            })
            .run();
    }

    #[test]
    fn test_reset_clears_everything() {
        let full = AppState {
            tickets: vec![ticket(1, "a")],
            logged_in_user: Some(User::new("ana")),
            auth: Some(AuthToken::new("t")),
        };

        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(full)
            .when_action(AppAction::Reset)
            .then_state(|state| assert_eq!(*state, AppState::default()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_unknown_is_identity() {
        let state = with_tickets(vec![ticket(1, "a")]);
        let expected = state.clone();

        ReducerTest::new(app_reducer())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(AppAction::Unknown)
            .then_state(move |state| assert_eq!(*state, expected))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_pure_reduce_does_not_touch_input() {
        let state = with_tickets(vec![ticket(1, "a")]);
        let before = state.clone();

        let next = reduce(&state, AppAction::AddTicket(ticket(2, "b")));

        assert_eq!(state, before);
        assert_eq!(ids(&next), vec![1, 2]);
    }

    #[test]
    fn test_pure_reduce_matches_store_reducer() {
        let reducer = app_reducer();
        let env = create_test_env();
        let actions = [
            AppAction::SetUser(Some(User::new("ana"))),
            AppAction::SetTickets(vec![ticket(1, "a"), ticket(2, "b")]),
            AppAction::UpdateTicket(ticket(2, "b2")),
            AppAction::AddTicket(ticket(3, "c")),
            AppAction::SetAuth(Some(AuthToken::new("t"))),
            AppAction::SetUser(None),
        ];

        let mut pure = AppState::new();
        let mut stored = AppState::new();
        for action in actions {
            pure = reduce(&pure, action.clone());
            let _ = reducer.reduce(&mut stored, action, &env);
        }

        assert_eq!(pure, stored);
    }
}
