//! TrainingSessionRepository trait definition.
//!
//! Append-only history of training sessions. The live state machine is the
//! in-memory `TrainingTracker`; this port only records what happened so
//! sessions survive for auditing and the CLI.

use semantest_types::error::RepositoryError;
use semantest_types::training::TrainingSession;

/// Repository trait for the training session audit log.
///
/// Implementations live in semantest-infra (e.g.,
/// `SqliteTrainingSessionRepository`).
pub trait TrainingSessionRepository: Send + Sync {
    /// Record that a session started.
    fn record_started(
        &self,
        session: &TrainingSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Record that a session ended (updates the row written at start).
    fn record_ended(
        &self,
        session: &TrainingSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent sessions, newest first.
    fn recent(
        &self,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<TrainingSession>, RepositoryError>> + Send;
}
