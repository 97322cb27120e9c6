//! Domain events flowing through the request pipeline.

use semantest_types::outcome::{MatchResult, RequestOutcome};
use semantest_types::request::CommandEnvelope;

use std::fmt;

/// Routing tag for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CommandReceived,
    MatchFound,
    SelectionNeeded,
    OutcomeReady,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::CommandReceived => write!(f, "command_received"),
            EventKind::MatchFound => write!(f, "match_found"),
            EventKind::SelectionNeeded => write!(f, "selection_needed"),
            EventKind::OutcomeReady => write!(f, "outcome_ready"),
        }
    }
}

/// One step of a request pipeline.
///
/// Handlers consume an event and return follow-up events as plain values;
/// no entity holds a back-reference to the dispatcher.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A command arrived from the transport layer.
    CommandReceived { envelope: CommandEnvelope },
    /// The matching engine accepted a candidate for this command.
    MatchFound {
        envelope: CommandEnvelope,
        matched: MatchResult,
    },
    /// No acceptable candidate; the user must pick an element.
    SelectionNeeded { envelope: CommandEnvelope },
    /// Terminal: the request is resolved.
    OutcomeReady { outcome: RequestOutcome },
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::CommandReceived { .. } => EventKind::CommandReceived,
            DomainEvent::MatchFound { .. } => EventKind::MatchFound,
            DomainEvent::SelectionNeeded { .. } => EventKind::SelectionNeeded,
            DomainEvent::OutcomeReady { .. } => EventKind::OutcomeReady,
        }
    }
}
