//! SQLite pattern repository implementation.
//!
//! Implements `PatternRepository` from `semantest-core` using sqlx with
//! split read/write pools. Payload and context are stored as JSON blobs;
//! `hostname`, `message_type`, and `learned_at` are denormalized into
//! columns so candidate lookup and cleanup stay indexed queries.

use chrono::{DateTime, Utc};
use semantest_core::repository::pattern::PatternRepository;
use semantest_types::config::{CleanupPolicy, ConfidenceSmoothing};
use semantest_types::context::ExecutionContext;
use semantest_types::error::RepositoryError;
use semantest_types::pattern::{AutomationPattern, PatternId};
use semantest_types::request::{ActionPayload, MessageType};
use semantest_types::stats::PatternStatistics;
use sqlx::Row;

use std::collections::BTreeMap;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `PatternRepository`.
#[derive(Clone)]
pub struct SqlitePatternRepository {
    pool: DatabasePool,
    smoothing: ConfidenceSmoothing,
    retention: CleanupPolicy,
}

impl SqlitePatternRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool, smoothing: ConfidenceSmoothing, retention: CleanupPolicy) -> Self {
        Self {
            pool,
            smoothing,
            retention,
        }
    }
}

/// Internal row type for mapping SQLite rows to domain patterns.
struct PatternRow {
    id: String,
    selector: String,
    payload: String,
    context: String,
    confidence: f64,
    usage_count: i64,
    successful_executions: i64,
    learned_at: String,
    updated_at: String,
}

impl PatternRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            selector: row.try_get("selector")?,
            payload: row.try_get("payload")?,
            context: row.try_get("context")?,
            confidence: row.try_get("confidence")?,
            usage_count: row.try_get("usage_count")?,
            successful_executions: row.try_get("successful_executions")?,
            learned_at: row.try_get("learned_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_pattern(self) -> Result<AutomationPattern, RepositoryError> {
        let id = self
            .id
            .parse::<PatternId>()
            .map_err(|e| RepositoryError::Query(format!("invalid pattern id: {e}")))?;

        let payload: ActionPayload = serde_json::from_str(&self.payload)
            .map_err(|e| RepositoryError::Query(format!("invalid payload JSON: {e}")))?;

        let context: ExecutionContext = serde_json::from_str(&self.context)
            .map_err(|e| RepositoryError::Query(format!("invalid context JSON: {e}")))?;

        let learned_at = parse_datetime(&self.learned_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(AutomationPattern {
            id,
            payload,
            context,
            selector: self.selector,
            confidence: self.confidence,
            usage_count: self.usage_count as u64,
            successful_executions: self.successful_executions as u64,
            learned_at,
            updated_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn rows_into_patterns(
    rows: Vec<sqlx::sqlite::SqliteRow>,
) -> Result<Vec<AutomationPattern>, RepositoryError> {
    let mut patterns = Vec::with_capacity(rows.len());
    for row in &rows {
        let pattern_row =
            PatternRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        patterns.push(pattern_row.into_pattern()?);
    }
    Ok(patterns)
}

impl PatternRepository for SqlitePatternRepository {
    async fn store(&self, pattern: &AutomationPattern) -> Result<(), RepositoryError> {
        let payload_json = serde_json::to_string(&pattern.payload)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let context_json = serde_json::to_string(&pattern.context)
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO patterns (id, message_type, hostname, selector, payload, context, confidence, usage_count, successful_executions, learned_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(pattern.id.to_string())
        .bind(pattern.message_type().to_string())
        .bind(pattern.hostname())
        .bind(&pattern.selector)
        .bind(&payload_json)
        .bind(&context_json)
        .bind(pattern.confidence)
        .bind(pattern.usage_count as i64)
        .bind(pattern.successful_executions as i64)
        .bind(format_datetime(&pattern.learned_at))
        .bind(format_datetime(&pattern.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "pattern '{}' already exists",
                    pattern.id
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get(&self, id: &PatternId) -> Result<Option<AutomationPattern>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM patterns WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let pattern_row =
                    PatternRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(pattern_row.into_pattern()?))
            }
            None => Ok(None),
        }
    }

    async fn find_candidates(
        &self,
        hostname: &str,
        message_type: MessageType,
    ) -> Result<Vec<AutomationPattern>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM patterns WHERE hostname = ? AND message_type = ?")
            .bind(hostname)
            .bind(message_type.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_patterns(rows)
    }

    /// Counter bumps and the EMA confidence update happen in one UPDATE
    /// statement, so concurrent outcomes for the same pattern serialize on
    /// the single-writer pool and each is applied exactly once.
    async fn record_outcome(&self, id: &PatternId, success: bool) -> Result<bool, RepositoryError> {
        let observed = if success { 1.0 } else { 0.0 };
        let result = sqlx::query(
            "UPDATE patterns
             SET usage_count = usage_count + 1,
                 successful_executions = successful_executions + ?,
                 confidence = MAX(?, (1.0 - ?) * confidence + ? * ?),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(if success { 1i64 } else { 0i64 })
        .bind(self.smoothing.floor)
        .bind(self.smoothing.alpha)
        .bind(self.smoothing.alpha)
        .bind(observed)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn cleanup(&self, max_age_days: u32) -> Result<u64, RepositoryError> {
        let cutoff = Utc::now() - chrono::Duration::days(max_age_days as i64);
        let result = sqlx::query("DELETE FROM patterns WHERE learned_at < ? AND usage_count < ?")
            .bind(format_datetime(&cutoff))
            .bind(self.retention.low_use_floor as i64)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM patterns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(row.0 as u64)
    }

    async fn export_all(&self) -> Result<Vec<AutomationPattern>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM patterns ORDER BY learned_at, id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_into_patterns(rows)
    }

    async fn import(&self, patterns: &[AutomationPattern]) -> Result<u64, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut written = 0u64;
        for pattern in patterns {
            let payload_json = serde_json::to_string(&pattern.payload)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let context_json = serde_json::to_string(&pattern.context)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            let result = sqlx::query(
                "INSERT OR REPLACE INTO patterns (id, message_type, hostname, selector, payload, context, confidence, usage_count, successful_executions, learned_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(pattern.id.to_string())
            .bind(pattern.message_type().to_string())
            .bind(pattern.hostname())
            .bind(&pattern.selector)
            .bind(&payload_json)
            .bind(&context_json)
            .bind(pattern.confidence)
            .bind(pattern.usage_count as i64)
            .bind(pattern.successful_executions as i64)
            .bind(format_datetime(&pattern.learned_at))
            .bind(format_datetime(&pattern.updated_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

            written += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(written)
    }

    async fn statistics(&self) -> Result<PatternStatistics, RepositoryError> {
        let totals: (i64, f64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(AVG(confidence), 0.0), COALESCE(SUM(successful_executions), 0), COALESCE(SUM(usage_count), 0) FROM patterns",
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let by_website: Vec<(String, i64)> =
            sqlx::query_as("SELECT hostname, COUNT(*) FROM patterns GROUP BY hostname")
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let patterns_by_website: BTreeMap<String, u64> = by_website
            .into_iter()
            .map(|(hostname, n)| (hostname, n as u64))
            .collect();

        let (total, average_confidence, successes, usage) = totals;
        let success_rate = if usage == 0 {
            0.0
        } else {
            successes as f64 / usage as f64
        };

        Ok(PatternStatistics {
            total_patterns: total as u64,
            patterns_by_website,
            average_confidence,
            success_rate,
        })
    }

    async fn delete(&self, id: &PatternId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM patterns WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::DatabasePool;

    async fn test_repo() -> SqlitePatternRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        SqlitePatternRepository::new(
            pool,
            ConfidenceSmoothing::default(),
            CleanupPolicy::default(),
        )
    }

    fn make_pattern(hostname: &str, value: &str) -> AutomationPattern {
        AutomationPattern::learned(
            ActionPayload::FillText {
                value: value.to_string(),
                clear_first: None,
                press_enter: None,
            },
            ExecutionContext {
                url: format!("https://{hostname}/compose"),
                hostname: hostname.to_string(),
                pathname: "/compose".to_string(),
                title: "Compose".to_string(),
                captured_at: Utc::now(),
                page_structure_hash: "a1b2c3".to_string(),
            },
            "textarea#prompt".to_string(),
        )
    }

    #[tokio::test]
    async fn test_store_and_get_roundtrip() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");

        repo.store(&pattern).await.unwrap();
        let loaded = repo.get(&pattern.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, pattern.id);
        assert_eq!(loaded.payload, pattern.payload);
        assert_eq!(loaded.context, pattern.context);
        assert_eq!(loaded.selector, pattern.selector);
        assert_eq!(loaded.confidence, 1.0);
        assert_eq!(loaded.usage_count, 0);
        assert_eq!(loaded.learned_at, pattern.learned_at);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = test_repo().await;
        assert!(repo.get(&PatternId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_duplicate_id_conflicts() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");

        repo.store(&pattern).await.unwrap();
        let err = repo.store(&pattern).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_candidates_filters_by_hostname_and_type() {
        let repo = test_repo().await;
        let fill_chatgpt = make_pattern("chatgpt.com", "hello");
        let fill_github = make_pattern("github.com", "hello");
        let click_chatgpt = AutomationPattern::learned(
            ActionPayload::ClickElement { description: None },
            fill_chatgpt.context.clone(),
            "button.send".to_string(),
        );

        repo.store(&fill_chatgpt).await.unwrap();
        repo.store(&fill_github).await.unwrap();
        repo.store(&click_chatgpt).await.unwrap();

        let candidates = repo
            .find_candidates("chatgpt.com", MessageType::FillText)
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, fill_chatgpt.id);
    }

    #[tokio::test]
    async fn test_record_outcome_success_updates_counters() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");
        repo.store(&pattern).await.unwrap();

        let updated = repo.record_outcome(&pattern.id, true).await.unwrap();
        assert!(updated);

        let loaded = repo.get(&pattern.id).await.unwrap().unwrap();
        assert_eq!(loaded.usage_count, 1);
        assert_eq!(loaded.successful_executions, 1);
        // (1 - 0.2) * 1.0 + 0.2 * 1.0
        assert!((loaded.confidence - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_outcome_failure_decays_confidence() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");
        repo.store(&pattern).await.unwrap();

        repo.record_outcome(&pattern.id, false).await.unwrap();

        let loaded = repo.get(&pattern.id).await.unwrap().unwrap();
        assert_eq!(loaded.usage_count, 1);
        assert_eq!(loaded.successful_executions, 0);
        // (1 - 0.2) * 1.0 + 0.2 * 0.0
        assert!((loaded.confidence - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_two_failures_increment_usage_twice() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");
        repo.store(&pattern).await.unwrap();

        repo.record_outcome(&pattern.id, false).await.unwrap();
        repo.record_outcome(&pattern.id, false).await.unwrap();

        let loaded = repo.get(&pattern.id).await.unwrap().unwrap();
        assert_eq!(loaded.usage_count, 2);
        assert_eq!(loaded.successful_executions, 0);
        assert!((loaded.confidence - 0.64).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_id_returns_false() {
        let repo = test_repo().await;
        let updated = repo.record_outcome(&PatternId::new(), true).await.unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_stale_low_use_patterns() {
        let repo = test_repo().await;

        let mut stale_unused = make_pattern("chatgpt.com", "old");
        stale_unused.learned_at = Utc::now() - chrono::Duration::days(40);

        let mut stale_proven = make_pattern("chatgpt.com", "proven");
        stale_proven.learned_at = Utc::now() - chrono::Duration::days(40);
        stale_proven.usage_count = 500;
        stale_proven.successful_executions = 480;

        let fresh = make_pattern("chatgpt.com", "new");

        repo.store(&stale_unused).await.unwrap();
        repo.store(&stale_proven).await.unwrap();
        repo.store(&fresh).await.unwrap();

        let removed = repo.cleanup(30).await.unwrap();
        assert_eq!(removed, 1);

        assert!(repo.get(&stale_unused.id).await.unwrap().is_none());
        assert!(repo.get(&stale_proven.id).await.unwrap().is_some());
        assert!(repo.get(&fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cleanup_with_no_matches_returns_zero() {
        let repo = test_repo().await;
        repo.store(&make_pattern("chatgpt.com", "hello"))
            .await
            .unwrap();
        assert_eq!(repo.cleanup(30).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_and_errors_when_missing() {
        let repo = test_repo().await;
        let pattern = make_pattern("chatgpt.com", "hello");
        repo.store(&pattern).await.unwrap();

        repo.delete(&pattern.id).await.unwrap();
        assert!(repo.get(&pattern.id).await.unwrap().is_none());

        let err = repo.delete(&pattern.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_import_upserts_existing_ids() {
        let repo = test_repo().await;
        let mut pattern = make_pattern("chatgpt.com", "hello");
        repo.store(&pattern).await.unwrap();

        pattern.selector = "textarea#prompt-v2".to_string();
        pattern.confidence = 0.7;
        let written = repo.import(std::slice::from_ref(&pattern)).await.unwrap();
        assert_eq!(written, 1);

        assert_eq!(repo.count().await.unwrap(), 1);
        let loaded = repo.get(&pattern.id).await.unwrap().unwrap();
        assert_eq!(loaded.selector, "textarea#prompt-v2");
        assert!((loaded.confidence - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_export_all_returns_every_pattern() {
        let repo = test_repo().await;
        repo.store(&make_pattern("chatgpt.com", "one")).await.unwrap();
        repo.store(&make_pattern("github.com", "two")).await.unwrap();

        let exported = repo.export_all().await.unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_statistics_aggregates() {
        let repo = test_repo().await;
        let p1 = make_pattern("chatgpt.com", "one");
        let p2 = make_pattern("chatgpt.com", "two");
        let p3 = make_pattern("github.com", "three");
        repo.store(&p1).await.unwrap();
        repo.store(&p2).await.unwrap();
        repo.store(&p3).await.unwrap();
        repo.record_outcome(&p1.id, true).await.unwrap();

        let stats = repo.statistics().await.unwrap();
        assert_eq!(stats.total_patterns, 3);
        assert_eq!(stats.patterns_by_website.get("chatgpt.com"), Some(&2));
        assert_eq!(stats.patterns_by_website.get("github.com"), Some(&1));
        assert!((stats.average_confidence - 1.0).abs() < 1e-9);
        assert!((stats.success_rate - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_statistics_empty_store_reports_zeroes() {
        let repo = test_repo().await;
        let stats = repo.statistics().await.unwrap();
        assert_eq!(stats.total_patterns, 0);
        assert!(stats.patterns_by_website.is_empty());
        assert_eq!(stats.average_confidence, 0.0);
        assert_eq!(stats.success_rate, 0.0);
    }
}
