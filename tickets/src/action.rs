//! The action contract.
//!
//! Actions are the only way to change [`AppState`](crate::AppState). They come
//! in two kinds:
//!
//! - **Transitions** change state directly and never start work.
//! - **Requests** never change state; each one starts exactly one call to the
//!   ticket service, whose success is fed back as a transition.
//!
//! On the wire an action is `{"type": "<camelCaseKind>", "data": <payload>}`.

use crate::types::{AuthToken, Ticket, TicketDraft, TicketId, User};
use serde::{Deserialize, Serialize};

/// Every action the store accepts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum AppAction {
    // ========== Transitions ==========
    /// Replace the ticket list wholesale
    SetTickets(Vec<Ticket>),
    /// Append a ticket created by the server
    AddTicket(Ticket),
    /// Replace the ticket with the same id in place; no-op if absent
    UpdateTicket(Ticket),
    /// Log in (`Some`) or out (`None`)
    SetUser(Option<User>),
    /// Replace the session credential
    SetAuth(Option<AuthToken>),
    /// Back to the empty initial state
    Reset,

    // ========== Requests ==========
    /// Fetch every ticket; success yields [`AppAction::SetTickets`]
    LoadTickets,
    /// Create a ticket; success yields [`AppAction::AddTicket`] with the server's ticket
    CreateTicket(TicketDraft),
    /// Save edits to an existing ticket; success yields [`AppAction::UpdateTicket`]
    SaveTicket {
        /// Ticket being edited
        id: TicketId,
        /// Full set of edited fields
        draft: TicketDraft,
    },

    /// Any action kind this client does not recognize; reduces to nothing
    #[serde(other)]
    Unknown,
}

impl AppAction {
    /// Wire tags of every recognized kind
    pub const KINDS: [&'static str; 10] = [
        "setTickets",
        "addTicket",
        "updateTicket",
        "setUser",
        "setAuth",
        "reset",
        "loadTickets",
        "createTicket",
        "saveTicket",
        "unknown",
    ];

    /// Whether this action asks the ticket service for something
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(
            self,
            Self::LoadTickets | Self::CreateTicket(_) | Self::SaveTicket { .. }
        )
    }

    /// Whether this action changes state directly
    #[must_use]
    pub const fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::SetTickets(_)
                | Self::AddTicket(_)
                | Self::UpdateTicket(_)
                | Self::SetUser(_)
                | Self::SetAuth(_)
                | Self::Reset
        )
    }

    /// Wire tag of this action
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SetTickets(_) => "setTickets",
            Self::AddTicket(_) => "addTicket",
            Self::UpdateTicket(_) => "updateTicket",
            Self::SetUser(_) => "setUser",
            Self::SetAuth(_) => "setAuth",
            Self::Reset => "reset",
            Self::LoadTickets => "loadTickets",
            Self::CreateTicket(_) => "createTicket",
            Self::SaveTicket { .. } => "saveTicket",
            Self::Unknown => "unknown",
        }
    }

    /// Decode an action from its JSON form
    ///
    /// An unrecognized `type`, or `"unknown"` itself, decodes to
    /// [`AppAction::Unknown`] whatever its payload. A recognized `type` with a malformed payload is an error.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the value is not an action envelope
    /// or a recognized action's payload does not match its kind.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let recognized = match value.get("type").and_then(serde_json::Value::as_str) {
            Some(kind) => {
                kind != Self::Unknown.kind() && Self::KINDS.iter().any(|known| *known == kind)
            }
            None => true,
        };

        if recognized {
            serde_json::from_value(value)
        } else {
            Ok(Self::Unknown)
        }
    }
}

impl std::str::FromStr for AppAction {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let ticket = TicketDraft::new("Search").into_ticket(TicketId::new(3));
        let json = serde_json::to_value(AppAction::AddTicket(ticket)).unwrap();

        assert_eq!(json["type"], "addTicket");
        assert_eq!(json["data"]["id"], 3);
        assert_eq!(json["data"]["initiative"], "Search");
    }

    #[test]
    fn test_decode_known_action() {
        let action: AppAction =
            r#"{"type":"setUser","data":{"username":"ana"}}"#.parse().unwrap();

        assert_eq!(action, AppAction::SetUser(Some(User::new("ana"))));
    }

    #[test]
    fn test_decode_logout() {
        let action: AppAction = r#"{"type":"setUser","data":null}"#.parse().unwrap();
        assert_eq!(action, AppAction::SetUser(None));
    }

    #[test]
    fn test_unknown_kind_with_payload_decodes_to_unknown() {
        let action = AppAction::from_json(json!({
            "type": "setFilter",
            "data": {"query": "billing"}
        }))
        .unwrap();

        assert_eq!(action, AppAction::Unknown);
    }

    #[test]
    fn test_unknown_kind_without_payload_decodes_to_unknown() {
        let action = AppAction::from_json(json!({"type": "toggleTheme"})).unwrap();
        assert_eq!(action, AppAction::Unknown);
    }

    #[test]
    fn test_unknown_tag_with_payload_decodes_to_unknown() {
        let action = AppAction::from_json(json!({
            "type": "unknown",
            "data": {"anything": true}
        }))
        .unwrap();

        assert_eq!(action, AppAction::Unknown);
    }

    #[test]
    fn test_malformed_known_action_is_an_error() {
        let result = AppAction::from_json(json!({"type": "addTicket", "data": 42}));
        assert!(result.is_err());
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let actions = [
            AppAction::SetTickets(vec![]),
            AppAction::SetAuth(None),
            AppAction::Reset,
            AppAction::LoadTickets,
            AppAction::CreateTicket(TicketDraft::default()),
            AppAction::SaveTicket {
                id: TicketId::new(1),
                draft: TicketDraft::default(),
            },
        ];

        for action in actions {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.kind());
            assert!(AppAction::KINDS.contains(&action.kind()));
        }
    }

    #[test]
    fn test_classification() {
        assert!(AppAction::LoadTickets.is_request());
        assert!(!AppAction::LoadTickets.is_transition());
        assert!(AppAction::Reset.is_transition());
        assert!(!AppAction::Unknown.is_request());
        assert!(!AppAction::Unknown.is_transition());
    }
}
