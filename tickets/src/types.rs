//! Domain types for the ticket-prioritization client.
//!
//! A [`Ticket`] is a work item scored along four axes (target, impact,
//! confidence, effort), each a foreign key into a fixed reference list.
//! [`AppState`] is the single root the store owns: the ordered ticket list plus
//! the session identity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-assigned ticket identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    /// Wrap a raw identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Key into one of the fixed scoring lists (targets, impacts, confidences, efforts)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(u32);

impl ReferenceId {
    /// Wrap a raw reference key
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw reference key
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for ReferenceId {
    /// The first entry of every reference list
    fn default() -> Self {
        Self(1)
    }
}

impl std::fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// A work item as stored by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique, server-assigned identifier
    pub id: TicketId,
    /// Short name of the initiative
    pub initiative: String,
    /// Free-form description
    pub description: String,
    /// Target reference
    pub target_id: ReferenceId,
    /// Impact reference
    pub impact_id: ReferenceId,
    /// Confidence reference
    pub confidence_id: ReferenceId,
    /// Effort reference
    pub effort_id: ReferenceId,
    /// Optional due date
    #[serde(rename = "duedate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Optional base64-encoded attachment
    #[serde(rename = "selectedFile", default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Reviewer feedback
    #[serde(default)]
    pub feedback: String,
}

impl Ticket {
    /// The editable fields of this ticket, e.g. to prefill an edit form
    #[must_use]
    pub fn draft(&self) -> TicketDraft {
        TicketDraft {
            initiative: self.initiative.clone(),
            description: self.description.clone(),
            target_id: self.target_id,
            impact_id: self.impact_id,
            confidence_id: self.confidence_id,
            effort_id: self.effort_id,
            due_date: self.due_date,
            attachment: self.attachment.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

/// The editable fields of a ticket, before the server assigns an id
///
/// Defaults match a blank form: empty text, every reference on its first
/// entry, no due date and no attachment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketDraft {
    /// Short name of the initiative
    pub initiative: String,
    /// Free-form description
    pub description: String,
    /// Target reference
    pub target_id: ReferenceId,
    /// Impact reference
    pub impact_id: ReferenceId,
    /// Confidence reference
    pub confidence_id: ReferenceId,
    /// Effort reference
    pub effort_id: ReferenceId,
    /// Optional due date
    #[serde(rename = "duedate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Optional base64-encoded attachment
    #[serde(rename = "selectedFile", skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Reviewer feedback
    pub feedback: String,
}

impl TicketDraft {
    /// Blank draft with the given initiative
    #[must_use]
    pub fn new(initiative: impl Into<String>) -> Self {
        Self {
            initiative: initiative.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the four scoring references
    #[must_use]
    pub const fn with_scores(
        mut self,
        target: ReferenceId,
        impact: ReferenceId,
        confidence: ReferenceId,
        effort: ReferenceId,
    ) -> Self {
        self.target_id = target;
        self.impact_id = impact;
        self.confidence_id = confidence;
        self.effort_id = effort;
        self
    }

    /// Set the due date
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Merge these fields with `id` into a complete ticket
    #[must_use]
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        Ticket {
            id,
            initiative: self.initiative,
            description: self.description,
            target_id: self.target_id,
            impact_id: self.impact_id,
            confidence_id: self.confidence_id,
            effort_id: self.effort_id,
            due_date: self.due_date,
            attachment: self.attachment,
            feedback: self.feedback,
        }
    }
}

/// Logged-in identity
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub username: String,
}

impl User {
    /// Create a user
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Session credential
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building `Authorization` headers
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Root application state
///
/// The transition methods below are the only writers; reducers call them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppState {
    /// Tickets in insertion/fetch order, unique by id
    pub tickets: Vec<Ticket>,
    /// Current user, if logged in
    pub logged_in_user: Option<User>,
    /// Current credential, if any
    pub auth: Option<AuthToken>,
}

impl AppState {
    /// Empty state: no tickets, nobody logged in
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a ticket by id (first match)
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|ticket| ticket.id == id)
    }

    /// Index of a ticket by id (first match)
    #[must_use]
    pub fn position(&self, id: TicketId) -> Option<usize> {
        self.tickets.iter().position(|ticket| ticket.id == id)
    }

    /// Number of tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether there are no tickets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Whether a user is logged in
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.logged_in_user.is_some()
    }

    /// Replace the ticket list wholesale
    pub fn set_tickets(&mut self, tickets: Vec<Ticket>) {
        self.tickets = tickets;
    }

    /// Append a ticket
    ///
    /// The id is not checked; ids come from the server.
    pub fn add_ticket(&mut self, ticket: Ticket) {
        self.tickets.push(ticket);
    }

    /// Replace the first ticket with the same id, in place
    ///
    /// Returns `false` (and changes nothing) if no ticket has that id.
    pub fn update_ticket(&mut self, ticket: Ticket) -> bool {
        match self.tickets.iter_mut().find(|existing| existing.id == ticket.id) {
            Some(slot) => {
                *slot = ticket;
                true
            }
            None => false,
        }
    }

    /// Replace the logged-in user
    ///
    /// Returns `true` when this is a login: no user before, a user now.
    pub fn set_user(&mut self, user: Option<User>) -> bool {
        let logging_in = self.logged_in_user.is_none() && user.is_some();
        self.logged_in_user = user;
        logging_in
    }

    /// Replace the credential
    pub fn set_auth(&mut self, auth: Option<AuthToken>) {
        self.auth = auth;
    }
}
