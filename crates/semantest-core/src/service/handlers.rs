//! The three pipeline handlers behind `AutomationService`.
//!
//! Each handler consumes one event kind and emits the follow-up that moves
//! the request toward a terminal `OutcomeReady`:
//!
//! - `MatchHandler`: `CommandReceived -> MatchFound | SelectionNeeded`
//! - `ExecuteHandler`: `MatchFound -> OutcomeReady`
//! - `SelectHandler`: `SelectionNeeded -> OutcomeReady`

use semantest_types::error::{RepositoryError, SelectionError};
use semantest_types::outcome::{Disposition, ExecutionStatus, RequestOutcome};
use semantest_types::pattern::AutomationPattern;
use tracing::{debug, info, warn};

use std::sync::Arc;

use crate::dispatch::event::DomainEvent;
use crate::dispatch::registry::EventHandler;
use crate::execution::coordinator::ExecutionCoordinator;
use crate::execution::executor::ElementExecutor;
use crate::matching::engine::MatchingEngine;
use crate::repository::pattern::PatternRepository;
use crate::selection::selector::ElementSelector;
use crate::training::tracker::TrainingTracker;

/// Routes an incoming command to matching or to element selection.
///
/// The mode check happens exactly once, here, when the request enters the
/// pipeline. A training session for the request's hostname bypasses
/// matching entirely: during training the user demonstrates, the engine
/// does not guess.
pub struct MatchHandler<R: PatternRepository> {
    engine: MatchingEngine<R>,
    tracker: Arc<TrainingTracker>,
}

impl<R: PatternRepository> MatchHandler<R> {
    pub fn new(engine: MatchingEngine<R>, tracker: Arc<TrainingTracker>) -> Self {
        Self { engine, tracker }
    }
}

impl<R: PatternRepository> EventHandler for MatchHandler<R> {
    async fn handle(&self, event: DomainEvent) -> Result<Vec<DomainEvent>, RepositoryError> {
        let envelope = match event {
            DomainEvent::CommandReceived { envelope } => envelope,
            _ => return Ok(Vec::new()),
        };

        if self
            .tracker
            .is_training_for(&envelope.request.context.hostname)
            .await
        {
            debug!(
                correlation_id = %envelope.correlation_id,
                hostname = %envelope.request.context.hostname,
                "Training active for this website, asking the user"
            );
            return Ok(vec![DomainEvent::SelectionNeeded { envelope }]);
        }

        match self.engine.best_match(&envelope.request).await? {
            Some(matched) => {
                debug!(
                    correlation_id = %envelope.correlation_id,
                    pattern_id = %matched.pattern.id,
                    overall = matched.score.overall,
                    "Best match accepted"
                );
                Ok(vec![DomainEvent::MatchFound { envelope, matched }])
            }
            None => {
                debug!(
                    correlation_id = %envelope.correlation_id,
                    hostname = %envelope.request.context.hostname,
                    "No acceptable pattern, asking the user"
                );
                Ok(vec![DomainEvent::SelectionNeeded { envelope }])
            }
        }
    }
}

/// Replays the matched pattern and turns the execution outcome into the
/// request's disposition.
pub struct ExecuteHandler<R: PatternRepository, E: ElementExecutor> {
    coordinator: ExecutionCoordinator<R, E>,
}

impl<R: PatternRepository, E: ElementExecutor> ExecuteHandler<R, E> {
    pub fn new(coordinator: ExecutionCoordinator<R, E>) -> Self {
        Self { coordinator }
    }
}

impl<R: PatternRepository, E: ElementExecutor> EventHandler for ExecuteHandler<R, E> {
    async fn handle(&self, event: DomainEvent) -> Result<Vec<DomainEvent>, RepositoryError> {
        let (envelope, matched) = match event {
            DomainEvent::MatchFound { envelope, matched } => (envelope, matched),
            _ => return Ok(Vec::new()),
        };

        let execution = self
            .coordinator
            .execute_matched(&matched, &envelope.request)
            .await?;

        let disposition = match execution.status {
            ExecutionStatus::Executed { result_data } => Disposition::PatternExecuted {
                pattern_id: execution.pattern_id,
                result_data,
            },
            ExecutionStatus::Failed { reason } => {
                warn!(
                    correlation_id = %envelope.correlation_id,
                    pattern_id = %execution.pattern_id,
                    %reason,
                    "Matched pattern failed to replay"
                );
                Disposition::PatternExecutionFailed {
                    pattern_id: execution.pattern_id,
                    reason,
                }
            }
        };
        Ok(vec![DomainEvent::OutcomeReady {
            outcome: RequestOutcome::new(envelope.correlation_id, disposition),
        }])
    }
}

/// Asks the user to pick an element, then learns the pick as a new pattern.
///
/// Both roads lead here -- an active training session or an automatic-mode
/// request nothing matched -- and both learn: a confirmed pick is a
/// demonstration either way. A cancelled or unavailable selection resolves
/// the request without learning anything.
pub struct SelectHandler<R: PatternRepository, S: ElementSelector> {
    repository: R,
    selector: S,
    tracker: Arc<TrainingTracker>,
}

impl<R: PatternRepository, S: ElementSelector> SelectHandler<R, S> {
    pub fn new(repository: R, selector: S, tracker: Arc<TrainingTracker>) -> Self {
        Self {
            repository,
            selector,
            tracker,
        }
    }
}

impl<R: PatternRepository, S: ElementSelector> EventHandler for SelectHandler<R, S> {
    async fn handle(&self, event: DomainEvent) -> Result<Vec<DomainEvent>, RepositoryError> {
        let envelope = match event {
            DomainEvent::SelectionNeeded { envelope } => envelope,
            _ => return Ok(Vec::new()),
        };
        let request = &envelope.request;

        let learned = match self.selector.request_selection(request).await {
            Ok(selection) => {
                let pattern = AutomationPattern::learned(
                    request.payload.clone(),
                    request.context.clone(),
                    selection.selector,
                );
                self.repository.store(&pattern).await?;
                self.tracker
                    .record_pattern_learned(&request.context.hostname)
                    .await;
                info!(
                    pattern_id = %pattern.id,
                    hostname = %request.context.hostname,
                    message_type = %request.message_type(),
                    selector = %pattern.selector,
                    "Learned new automation pattern"
                );
                Some(pattern.id)
            }
            Err(SelectionError::Cancelled) => {
                debug!(
                    correlation_id = %envelope.correlation_id,
                    "Element selection cancelled, nothing learned"
                );
                None
            }
            Err(SelectionError::Unavailable(reason)) => {
                warn!(
                    correlation_id = %envelope.correlation_id,
                    %reason,
                    "Selection UI unavailable, nothing learned"
                );
                None
            }
        };

        Ok(vec![DomainEvent::OutcomeReady {
            outcome: RequestOutcome::new(
                envelope.correlation_id,
                Disposition::ElementSelectionRequested { learned },
            ),
        }])
    }
}
