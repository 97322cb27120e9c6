//! ExecutionCoordinator: replaying a matched pattern and recording the
//! outcome.

use semantest_types::error::RepositoryError;
use semantest_types::outcome::{ExecutionOutcome, ExecutionStatus, MatchResult};
use semantest_types::request::AutomationRequest;
use tracing::{debug, warn};

use crate::execution::executor::ElementExecutor;
use crate::repository::pattern::PatternRepository;

/// Drives one pattern execution: `Matched -> Executing -> Succeeded|Failed`.
///
/// Collaborators arrive through the constructor. The coordinator replays the
/// stored selector with the live request's payload (stored parameter values
/// are stale by definition; only the selector and action kind are reused),
/// records exactly one outcome per invocation, and never deletes a pattern
/// or retries with a different candidate. Falling back after a failure is
/// the caller's decision, so one corrupted pattern cannot cascade into
/// repeated failed DOM operations.
pub struct ExecutionCoordinator<R: PatternRepository, E: ElementExecutor> {
    repository: R,
    executor: E,
}

impl<R: PatternRepository, E: ElementExecutor> ExecutionCoordinator<R, E> {
    pub fn new(repository: R, executor: E) -> Self {
        Self {
            repository,
            executor,
        }
    }

    /// Execute `matched` for `request` and fold the result into the
    /// pattern's history.
    ///
    /// Executor failure is an outcome, not an error: the returned
    /// `ExecutionOutcome` carries `Failed` and the pattern's confidence pays
    /// for it. Only storage trouble surfaces as `Err`.
    pub async fn execute_matched(
        &self,
        matched: &MatchResult,
        request: &AutomationRequest,
    ) -> Result<ExecutionOutcome, RepositoryError> {
        let pattern = &matched.pattern;
        debug!(
            pattern_id = %pattern.id,
            selector = %pattern.selector,
            message_type = %request.message_type(),
            "Executing matched pattern"
        );

        let response = self
            .executor
            .execute(&pattern.selector, request.message_type(), &request.payload)
            .await;

        let updated = self
            .repository
            .record_outcome(&pattern.id, response.success)
            .await?;
        if !updated {
            warn!(pattern_id = %pattern.id, "Outcome recorded for unknown pattern, ignoring");
        }

        let status = if response.success {
            ExecutionStatus::Executed {
                result_data: response.result_data,
            }
        } else {
            ExecutionStatus::Failed {
                reason: response.failure_reason(),
            }
        };
        Ok(ExecutionOutcome {
            pattern_id: pattern.id,
            status,
        })
    }
}
