//! Property tests for the pure state transition.

use proptest::prelude::*;
use tickets::{
    AppAction, AppState, AuthToken, ReferenceId, Ticket, TicketDraft, TicketId, User, reduce,
};

fn ticket_strategy() -> impl Strategy<Value = Ticket> {
    (
        0u64..20,
        "[a-z]{1,8}",
        "[a-z ]{0,16}",
        1u32..5,
        1u32..5,
        1u32..5,
        1u32..5,
    )
        .prop_map(|(id, initiative, description, target, impact, confidence, effort)| {
            TicketDraft::new(initiative)
                .with_description(description)
                .with_scores(
                    ReferenceId::new(target),
                    ReferenceId::new(impact),
                    ReferenceId::new(confidence),
                    ReferenceId::new(effort),
                )
                .into_ticket(TicketId::new(id))
        })
}

fn state_strategy() -> impl Strategy<Value = AppState> {
    (
        prop::collection::vec(ticket_strategy(), 0..8),
        prop::option::of("[a-z]{3,6}"),
        prop::option::of("[a-z0-9]{8}"),
    )
        .prop_map(|(tickets, user, auth)| {
            let mut state = AppState::new();
            state.set_tickets(tickets);
            state.set_user(user.map(User::new));
            state.set_auth(auth.map(AuthToken::new));
            state
        })
}

fn request_strategy() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        Just(AppAction::LoadTickets),
        Just(AppAction::Unknown),
        "[a-z]{1,8}".prop_map(|i| AppAction::CreateTicket(TicketDraft::new(i))),
        (0u64..20, "[a-z]{1,8}").prop_map(|(id, i)| AppAction::SaveTicket {
            id: TicketId::new(id),
            draft: TicketDraft::new(i),
        }),
    ]
}

fn action_strategy() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        prop::collection::vec(ticket_strategy(), 0..6).prop_map(AppAction::SetTickets),
        ticket_strategy().prop_map(AppAction::AddTicket),
        ticket_strategy().prop_map(AppAction::UpdateTicket),
        prop::option::of("[a-z]{3,6}").prop_map(|u| AppAction::SetUser(u.map(User::new))),
        prop::option::of("[a-z0-9]{8}").prop_map(|t| AppAction::SetAuth(t.map(AuthToken::new))),
        Just(AppAction::Reset),
        request_strategy(),
    ]
}

proptest! {
    #[test]
    fn reduce_is_deterministic_and_pure(state in state_strategy(), action in action_strategy()) {
        let before = state.clone();
        let first = reduce(&state, action.clone());
        let second = reduce(&state, action);
        prop_assert_eq!(first, second);
        prop_assert_eq!(state, before);
    }

    #[test]
    fn requests_and_unknown_are_identity(state in state_strategy(), action in request_strategy()) {
        prop_assert_eq!(reduce(&state, action), state);
    }

    #[test]
    fn set_tickets_replaces_list_and_keeps_session(
        state in state_strategy(),
        tickets in prop::collection::vec(ticket_strategy(), 0..8),
    ) {
        let next = reduce(&state, AppAction::SetTickets(tickets.clone()));
        prop_assert_eq!(&next.tickets, &tickets);
        prop_assert_eq!(&next.logged_in_user, &state.logged_in_user);
        prop_assert_eq!(&next.auth, &state.auth);
    }

    #[test]
    fn add_ticket_appends_at_end(state in state_strategy(), ticket in ticket_strategy()) {
        let next = reduce(&state, AppAction::AddTicket(ticket.clone()));
        prop_assert_eq!(next.len(), state.len() + 1);
        prop_assert_eq!(&next.tickets[..state.len()], &state.tickets[..]);
        prop_assert_eq!(next.tickets.last(), Some(&ticket));
    }

    #[test]
    fn update_ticket_replaces_first_match_in_place(
        state in state_strategy(),
        ticket in ticket_strategy(),
    ) {
        let next = reduce(&state, AppAction::UpdateTicket(ticket.clone()));
        prop_assert_eq!(next.len(), state.len());

        match state.position(ticket.id) {
            Some(index) => {
                for (i, (after, before)) in next.tickets.iter().zip(&state.tickets).enumerate() {
                    if i == index {
                        prop_assert_eq!(after, &ticket);
                    } else {
                        prop_assert_eq!(after, before);
                    }
                }
            }
            None => prop_assert_eq!(&next, &state),
        }
    }

    #[test]
    fn ticket_order_is_stable_under_updates(
        state in state_strategy(),
        updates in prop::collection::vec(ticket_strategy(), 0..6),
    ) {
        let next = updates
            .into_iter()
            .fold(state.clone(), |acc, t| reduce(&acc, AppAction::UpdateTicket(t)));
        let before: Vec<_> = state.tickets.iter().map(|t| t.id).collect();
        let after: Vec<_> = next.tickets.iter().map(|t| t.id).collect();
        prop_assert_eq!(after, before);
    }

    #[test]
    fn reset_returns_initial_state(state in state_strategy()) {
        prop_assert_eq!(reduce(&state, AppAction::Reset), AppState::default());
    }
}
