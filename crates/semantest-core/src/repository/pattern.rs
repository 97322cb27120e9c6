//! PatternRepository trait definition.
//!
//! The single owner of pattern persistence. All pattern reads and writes in
//! the engine go through this port; nothing else touches storage.

use semantest_types::error::RepositoryError;
use semantest_types::pattern::{AutomationPattern, PatternId};
use semantest_types::request::MessageType;
use semantest_types::stats::PatternStatistics;

/// Repository trait for learned automation patterns.
///
/// Implementations live in semantest-infra (e.g., `SqlitePatternRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// Concurrency contract: `record_outcome` must apply its read-modify-write
/// of the counters and confidence atomically per pattern id, even under
/// concurrent callers. Reads may run concurrently with each other and with
/// writes to other patterns.
pub trait PatternRepository: Send + Sync {
    /// Persist a newly learned pattern.
    fn store(
        &self,
        pattern: &AutomationPattern,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch a pattern by id.
    fn get(
        &self,
        id: &PatternId,
    ) -> impl std::future::Future<Output = Result<Option<AutomationPattern>, RepositoryError>> + Send;

    /// All patterns learned on `hostname` for `message_type`, unranked.
    ///
    /// This is the matcher's candidate pool; scoring and ordering happen in
    /// the matching engine, not here.
    fn find_candidates(
        &self,
        hostname: &str,
        message_type: MessageType,
    ) -> impl std::future::Future<Output = Result<Vec<AutomationPattern>, RepositoryError>> + Send;

    /// Fold one execution outcome into the pattern's counters and confidence.
    ///
    /// Returns `Ok(true)` when a pattern was updated and `Ok(false)` when no
    /// pattern with that id exists (an outcome for a deleted pattern is a
    /// logged no-op, not an error).
    fn record_outcome(
        &self,
        id: &PatternId,
        success: bool,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete patterns older than `max_age_days` whose usage count is below
    /// the retention floor. Returns how many were removed. Never touches
    /// proven patterns, whatever their age.
    fn cleanup(
        &self,
        max_age_days: u32,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Total number of stored patterns.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Every stored pattern, for backup or sharing.
    fn export_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<AutomationPattern>, RepositoryError>> + Send;

    /// Bulk-load patterns, replacing any with matching ids. Returns how many
    /// were written.
    fn import(
        &self,
        patterns: &[AutomationPattern],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Aggregate statistics over the whole store.
    fn statistics(
        &self,
    ) -> impl std::future::Future<Output = Result<PatternStatistics, RepositoryError>> + Send;

    /// Remove one pattern by id. Errors with `NotFound` when absent, since
    /// explicit removal of a missing pattern means the caller's view is
    /// stale.
    fn delete(
        &self,
        id: &PatternId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
