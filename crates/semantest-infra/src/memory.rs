//! In-memory pattern repository.
//!
//! DashMap-backed implementation of `PatternRepository` for tests and for
//! running the engine without persistence. Per-pattern updates take the
//! entry's shard lock, so concurrent outcome recordings for the same
//! pattern apply one at a time.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use semantest_core::repository::pattern::PatternRepository;
use semantest_types::config::{CleanupPolicy, ConfidenceSmoothing};
use semantest_types::error::RepositoryError;
use semantest_types::pattern::{AutomationPattern, PatternId};
use semantest_types::request::MessageType;
use semantest_types::stats::PatternStatistics;

use std::collections::BTreeMap;
use std::sync::Arc;

/// Non-persistent implementation of `PatternRepository`.
#[derive(Clone, Default)]
pub struct MemoryPatternRepository {
    patterns: Arc<DashMap<PatternId, AutomationPattern>>,
    smoothing: ConfidenceSmoothing,
    retention: CleanupPolicy,
}

impl MemoryPatternRepository {
    pub fn new(smoothing: ConfidenceSmoothing, retention: CleanupPolicy) -> Self {
        Self {
            patterns: Arc::new(DashMap::new()),
            smoothing,
            retention,
        }
    }
}

impl PatternRepository for MemoryPatternRepository {
    async fn store(&self, pattern: &AutomationPattern) -> Result<(), RepositoryError> {
        match self.patterns.entry(pattern.id) {
            Entry::Occupied(_) => Err(RepositoryError::Conflict(format!(
                "pattern '{}' already exists",
                pattern.id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(pattern.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, id: &PatternId) -> Result<Option<AutomationPattern>, RepositoryError> {
        Ok(self.patterns.get(id).map(|p| p.clone()))
    }

    async fn find_candidates(
        &self,
        hostname: &str,
        message_type: MessageType,
    ) -> Result<Vec<AutomationPattern>, RepositoryError> {
        Ok(self
            .patterns
            .iter()
            .filter(|p| p.hostname() == hostname && p.message_type() == message_type)
            .map(|p| p.clone())
            .collect())
    }

    async fn record_outcome(&self, id: &PatternId, success: bool) -> Result<bool, RepositoryError> {
        match self.patterns.get_mut(id) {
            Some(mut pattern) => {
                pattern.apply_outcome(success, &self.smoothing);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cleanup(&self, max_age_days: u32) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days as i64);
        let before = self.patterns.len();
        self.patterns
            .retain(|_, p| p.learned_at >= cutoff || p.usage_count >= self.retention.low_use_floor);
        Ok((before - self.patterns.len()) as u64)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.patterns.len() as u64)
    }

    async fn export_all(&self) -> Result<Vec<AutomationPattern>, RepositoryError> {
        let mut patterns: Vec<AutomationPattern> =
            self.patterns.iter().map(|p| p.clone()).collect();
        patterns.sort_by(|a, b| a.learned_at.cmp(&b.learned_at).then(a.id.cmp(&b.id)));
        Ok(patterns)
    }

    async fn import(&self, patterns: &[AutomationPattern]) -> Result<u64, RepositoryError> {
        for pattern in patterns {
            self.patterns.insert(pattern.id, pattern.clone());
        }
        Ok(patterns.len() as u64)
    }

    async fn statistics(&self) -> Result<PatternStatistics, RepositoryError> {
        let mut patterns_by_website: BTreeMap<String, u64> = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut successes = 0u64;
        let mut usage = 0u64;
        let mut total = 0u64;

        for pattern in self.patterns.iter() {
            total += 1;
            *patterns_by_website
                .entry(pattern.hostname().to_string())
                .or_default() += 1;
            confidence_sum += pattern.confidence;
            successes += pattern.successful_executions;
            usage += pattern.usage_count;
        }

        Ok(PatternStatistics {
            total_patterns: total,
            patterns_by_website,
            average_confidence: if total == 0 {
                0.0
            } else {
                confidence_sum / total as f64
            },
            success_rate: if usage == 0 {
                0.0
            } else {
                successes as f64 / usage as f64
            },
        })
    }

    async fn delete(&self, id: &PatternId) -> Result<(), RepositoryError> {
        self.patterns
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}
