//! SQLite training session audit log.

use chrono::{DateTime, Utc};
use semantest_core::repository::training::TrainingSessionRepository;
use semantest_types::error::RepositoryError;
use semantest_types::training::{SessionId, TrainingSession};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TrainingSessionRepository`.
#[derive(Clone)]
pub struct SqliteTrainingSessionRepository {
    pool: DatabasePool,
}

impl SqliteTrainingSessionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Upsert the full session row. Start and end both write the same
    /// shape, so a lost start row cannot make the end unrecordable and a
    /// retried start stays a single row.
    async fn upsert(&self, session: &TrainingSession) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO training_sessions (id, website, started_at, ended_at, end_reason, patterns_learned)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.website)
        .bind(session.started_at.to_rfc3339())
        .bind(session.ended_at.map(|dt| dt.to_rfc3339()))
        .bind(session.end_reason.map(|r| r.to_string()))
        .bind(session.patterns_learned as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

struct SessionRow {
    id: String,
    website: String,
    started_at: String,
    ended_at: Option<String>,
    end_reason: Option<String>,
    patterns_learned: i64,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            website: row.try_get("website")?,
            started_at: row.try_get("started_at")?,
            ended_at: row.try_get("ended_at")?,
            end_reason: row.try_get("end_reason")?,
            patterns_learned: row.try_get("patterns_learned")?,
        })
    }

    fn into_session(self) -> Result<TrainingSession, RepositoryError> {
        let id = self
            .id
            .parse::<SessionId>()
            .map_err(|e| RepositoryError::Query(format!("invalid session id: {e}")))?;

        let started_at = parse_datetime(&self.started_at)?;
        let ended_at = self
            .ended_at
            .as_deref()
            .map(parse_datetime)
            .transpose()?;
        let end_reason = self
            .end_reason
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(RepositoryError::Query)?;

        Ok(TrainingSession {
            id,
            website: self.website,
            started_at,
            ended_at,
            end_reason,
            patterns_learned: self.patterns_learned as u64,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl TrainingSessionRepository for SqliteTrainingSessionRepository {
    async fn record_started(&self, session: &TrainingSession) -> Result<(), RepositoryError> {
        self.upsert(session).await
    }

    async fn record_ended(&self, session: &TrainingSession) -> Result<(), RepositoryError> {
        self.upsert(session).await
    }

    async fn recent(&self, limit: i64) -> Result<Vec<TrainingSession>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM training_sessions ORDER BY started_at DESC LIMIT ?")
            .bind(limit)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row =
                SessionRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }
        Ok(sessions)
    }
}
