//! EventPump: the work queue loop.

use semantest_types::error::RepositoryError;
use semantest_types::outcome::RequestOutcome;
use tracing::warn;

use std::collections::VecDeque;

use crate::dispatch::event::DomainEvent;
use crate::dispatch::registry::HandlerRegistry;

/// Drains a FIFO queue of events through the registry until a terminal
/// `OutcomeReady` appears.
///
/// Events are processed one at a time; follow-ups queue behind whatever is
/// already pending. `OutcomeReady` is never dispatched to a handler -- it
/// ends the run.
pub struct EventPump {
    registry: HandlerRegistry,
}

impl EventPump {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run one pipeline to completion.
    ///
    /// Returns `Ok(None)` when the queue drains without producing an
    /// outcome, which means an event had no registered handler or a handler
    /// returned nothing -- a wiring bug the caller turns into an error.
    pub async fn run(
        &self,
        initial: DomainEvent,
    ) -> Result<Option<RequestOutcome>, RepositoryError> {
        let mut queue: VecDeque<DomainEvent> = VecDeque::new();
        queue.push_back(initial);

        while let Some(event) = queue.pop_front() {
            if let DomainEvent::OutcomeReady { outcome } = event {
                return Ok(Some(outcome));
            }
            let kind = event.kind();
            match self.registry.get(kind) {
                Some(handler) => {
                    let follow_ups = handler.handle_boxed(event).await?;
                    queue.extend(follow_ups);
                }
                None => {
                    warn!(%kind, "No handler registered for event, dropping");
                }
            }
        }
        Ok(None)
    }
}
