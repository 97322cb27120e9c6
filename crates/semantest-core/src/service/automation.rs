//! AutomationService: the engine's single entry point.
//!
//! Owns the training tracker, wires the pipeline handlers into a dispatch
//! registry, and drives each incoming command through the event pump to a
//! terminal outcome. Pattern management operations (statistics, export,
//! import, cleanup) delegate straight to the repository.

use semantest_types::config::EngineConfig;
use semantest_types::error::{RepositoryError, TrainingError};
use semantest_types::outcome::RequestOutcome;
use semantest_types::pattern::{AutomationPattern, PatternId};
use semantest_types::request::CommandEnvelope;
use semantest_types::stats::PatternStatistics;
use semantest_types::training::{AutomationMode, DeactivationReason, TrainingSession};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use std::sync::Arc;

use crate::bus::OutcomeBus;
use crate::dispatch::event::{DomainEvent, EventKind};
use crate::dispatch::pump::EventPump;
use crate::dispatch::registry::HandlerRegistry;
use crate::execution::coordinator::ExecutionCoordinator;
use crate::execution::executor::ElementExecutor;
use crate::matching::engine::MatchingEngine;
use crate::repository::pattern::PatternRepository;
use crate::repository::training::TrainingSessionRepository;
use crate::selection::selector::ElementSelector;
use crate::service::handlers::{ExecuteHandler, MatchHandler, SelectHandler};
use crate::training::tracker::TrainingTracker;

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// Service orchestrating the full request lifecycle.
///
/// Generic over repository traits to maintain clean architecture --
/// semantest-core never depends on semantest-infra. The executor and
/// selector are type-erased into the handler registry at construction, so
/// the service itself only carries the repository, the session log, and the
/// shared tracker.
pub struct AutomationService<R: PatternRepository, T: TrainingSessionRepository> {
    repository: R,
    sessions: T,
    tracker: Arc<TrainingTracker>,
    pump: EventPump,
    bus: OutcomeBus,
}

impl<R, T> AutomationService<R, T>
where
    R: PatternRepository + Clone + 'static,
    T: TrainingSessionRepository,
{
    /// Create a new AutomationService.
    ///
    /// - `repository`: persistence for learned patterns
    /// - `sessions`: append-only training session audit log
    /// - `executor`: performs DOM actions against the live page
    /// - `selector`: asks the user to pick an element
    /// - `config`: scoring weights and acceptance threshold
    ///
    /// The matching engine and execution coordinator each own a clone of
    /// the repository; clones must observe each other's writes (sharing a
    /// pool or an `Arc`'d store), which every provided implementation does.
    pub fn new<E, S>(repository: R, sessions: T, executor: E, selector: S, config: EngineConfig) -> Self
    where
        E: ElementExecutor + 'static,
        S: ElementSelector + 'static,
    {
        let tracker = Arc::new(TrainingTracker::new());

        let registry = HandlerRegistry::new();
        registry.register(
            EventKind::CommandReceived,
            MatchHandler::new(
                MatchingEngine::new(repository.clone(), config.matching),
                Arc::clone(&tracker),
            ),
        );
        registry.register(
            EventKind::MatchFound,
            ExecuteHandler::new(ExecutionCoordinator::new(repository.clone(), executor)),
        );
        registry.register(
            EventKind::SelectionNeeded,
            SelectHandler::new(repository.clone(), selector, Arc::clone(&tracker)),
        );

        Self {
            repository,
            sessions,
            tracker,
            pump: EventPump::new(registry),
            bus: OutcomeBus::new(OUTCOME_CHANNEL_CAPACITY),
        }
    }

    /// Resolve one incoming command.
    ///
    /// Runs the pipeline `CommandReceived -> ... -> OutcomeReady` and
    /// publishes the outcome on the bus before returning it. Every outcome
    /// echoes the envelope's correlation id unchanged.
    pub async fn handle_automation_request(
        &self,
        envelope: CommandEnvelope,
    ) -> Result<RequestOutcome, RepositoryError> {
        let correlation_id = envelope.correlation_id;
        debug!(
            %correlation_id,
            message_type = %envelope.request.message_type(),
            hostname = %envelope.request.context.hostname,
            "Handling automation command"
        );

        let outcome = self
            .pump
            .run(DomainEvent::CommandReceived { envelope })
            .await?
            .ok_or_else(|| {
                RepositoryError::Query(format!(
                    "pipeline for command {correlation_id} finished without an outcome"
                ))
            })?;

        self.bus.publish(outcome.clone());
        Ok(outcome)
    }

    /// New receiver for resolved outcomes (transport bridge, dashboards).
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<RequestOutcome> {
        self.bus.subscribe()
    }

    /// Start a training session for `website` and switch to training mode.
    ///
    /// The audit write is best-effort: a failing session log is worth a
    /// warning, not a refusal to train.
    pub async fn enable_training(&self, website: &str) -> Result<TrainingSession, TrainingError> {
        let session = self.tracker.enable_training_mode(website).await?;
        if let Err(error) = self.sessions.record_started(&session).await {
            warn!(error = %error, session_id = %session.id, "Failed to record training session start");
        }
        Ok(session)
    }

    /// End the active training session, if any, leaving the mode flag as
    /// it is. Returns the ended session.
    pub async fn disable_training(&self, reason: DeactivationReason) -> Option<TrainingSession> {
        let session = self.tracker.disable_training_mode(reason).await?;
        if let Err(error) = self.sessions.record_ended(&session).await {
            warn!(error = %error, session_id = %session.id, "Failed to record training session end");
        }
        Some(session)
    }

    /// Force automatic mode, ending the active session if one exists.
    pub async fn switch_to_automatic(&self) -> Option<TrainingSession> {
        let session = self.tracker.switch_to_automatic_mode().await?;
        if let Err(error) = self.sessions.record_ended(&session).await {
            warn!(error = %error, session_id = %session.id, "Failed to record training session end");
        }
        Some(session)
    }

    /// The current automation mode.
    pub async fn current_mode(&self) -> AutomationMode {
        self.tracker.current_mode().await
    }

    /// The active training session, if any.
    pub async fn active_session(&self) -> Option<TrainingSession> {
        self.tracker.active_session().await
    }

    /// Most recent training sessions from the audit log, newest first.
    pub async fn recent_sessions(&self, limit: i64) -> Result<Vec<TrainingSession>, RepositoryError> {
        self.sessions.recent(limit).await
    }

    /// Aggregate statistics over the pattern store.
    pub async fn pattern_statistics(&self) -> Result<PatternStatistics, RepositoryError> {
        self.repository.statistics().await
    }

    /// Fetch one pattern by id.
    pub async fn get_pattern(
        &self,
        id: &PatternId,
    ) -> Result<Option<AutomationPattern>, RepositoryError> {
        self.repository.get(id).await
    }

    /// Every stored pattern, for backup or sharing.
    pub async fn export_patterns(&self) -> Result<Vec<AutomationPattern>, RepositoryError> {
        self.repository.export_all().await
    }

    /// Bulk-load patterns, replacing any with matching ids. Returns how
    /// many were written.
    pub async fn import_patterns(
        &self,
        patterns: &[AutomationPattern],
    ) -> Result<u64, RepositoryError> {
        self.repository.import(patterns).await
    }

    /// Age out stale, rarely used patterns. Returns how many were removed.
    pub async fn cleanup_patterns(&self, max_age_days: u32) -> Result<u64, RepositoryError> {
        self.repository.cleanup(max_age_days).await
    }

    /// Remove one pattern by id.
    pub async fn delete_pattern(&self, id: &PatternId) -> Result<(), RepositoryError> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;
    use semantest_types::config::{CleanupPolicy, ConfidenceSmoothing};
    use semantest_types::context::ExecutionContext;
    use semantest_types::error::SelectionError;
    use semantest_types::outcome::Disposition;
    use semantest_types::request::{ActionPayload, AutomationRequest, MessageType};
    use uuid::Uuid;

    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::execution::executor::ExecutorResponse;
    use crate::selection::selector::ElementSelection;

    // --- Mocks ---

    #[derive(Clone, Default)]
    struct SharedRepository {
        patterns: Arc<Mutex<Vec<AutomationPattern>>>,
    }

    impl SharedRepository {
        fn seeded(patterns: Vec<AutomationPattern>) -> Self {
            Self {
                patterns: Arc::new(Mutex::new(patterns)),
            }
        }

        fn snapshot(&self) -> Vec<AutomationPattern> {
            self.patterns.lock().unwrap().clone()
        }
    }

    impl PatternRepository for SharedRepository {
        async fn store(&self, pattern: &AutomationPattern) -> Result<(), RepositoryError> {
            self.patterns.lock().unwrap().push(pattern.clone());
            Ok(())
        }

        async fn get(&self, id: &PatternId) -> Result<Option<AutomationPattern>, RepositoryError> {
            Ok(self
                .patterns
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.id == *id)
                .cloned())
        }

        async fn find_candidates(
            &self,
            hostname: &str,
            message_type: MessageType,
        ) -> Result<Vec<AutomationPattern>, RepositoryError> {
            Ok(self
                .patterns
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.hostname() == hostname && p.message_type() == message_type)
                .cloned()
                .collect())
        }

        async fn record_outcome(
            &self,
            id: &PatternId,
            success: bool,
        ) -> Result<bool, RepositoryError> {
            let mut patterns = self.patterns.lock().unwrap();
            match patterns.iter_mut().find(|p| p.id == *id) {
                Some(pattern) => {
                    pattern.apply_outcome(success, &ConfidenceSmoothing::default());
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn cleanup(&self, max_age_days: u32) -> Result<u64, RepositoryError> {
            let cutoff = Utc::now() - chrono::Duration::days(max_age_days as i64);
            let floor = CleanupPolicy::default().low_use_floor;
            let mut patterns = self.patterns.lock().unwrap();
            let before = patterns.len();
            patterns.retain(|p| p.learned_at >= cutoff || p.usage_count >= floor);
            Ok((before - patterns.len()) as u64)
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(self.patterns.lock().unwrap().len() as u64)
        }

        async fn export_all(&self) -> Result<Vec<AutomationPattern>, RepositoryError> {
            Ok(self.snapshot())
        }

        async fn import(&self, incoming: &[AutomationPattern]) -> Result<u64, RepositoryError> {
            let mut patterns = self.patterns.lock().unwrap();
            for pattern in incoming {
                patterns.retain(|existing| existing.id != pattern.id);
                patterns.push(pattern.clone());
            }
            Ok(incoming.len() as u64)
        }

        async fn statistics(&self) -> Result<PatternStatistics, RepositoryError> {
            let patterns = self.patterns.lock().unwrap();
            let mut patterns_by_website: BTreeMap<String, u64> = BTreeMap::new();
            for pattern in patterns.iter() {
                *patterns_by_website
                    .entry(pattern.hostname().to_string())
                    .or_insert(0) += 1;
            }
            let average_confidence = if patterns.is_empty() {
                0.0
            } else {
                patterns.iter().map(|p| p.confidence).sum::<f64>() / patterns.len() as f64
            };
            let usage: u64 = patterns.iter().map(|p| p.usage_count).sum();
            let successes: u64 = patterns.iter().map(|p| p.successful_executions).sum();
            let success_rate = if usage == 0 {
                0.0
            } else {
                successes as f64 / usage as f64
            };
            Ok(PatternStatistics {
                total_patterns: patterns.len() as u64,
                patterns_by_website,
                average_confidence,
                success_rate,
            })
        }

        async fn delete(&self, id: &PatternId) -> Result<(), RepositoryError> {
            let mut patterns = self.patterns.lock().unwrap();
            let before = patterns.len();
            patterns.retain(|p| p.id != *id);
            if patterns.len() == before {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        }
    }

    #[derive(Clone)]
    struct ScriptedExecutor {
        response: ExecutorResponse,
        calls: Arc<Mutex<Vec<(String, MessageType, ActionPayload)>>>,
    }

    impl ScriptedExecutor {
        fn succeeding() -> Self {
            Self {
                response: ExecutorResponse::ok(None),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: ExecutorResponse::failed(message),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn recorded(&self) -> Vec<(String, MessageType, ActionPayload)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ElementExecutor for ScriptedExecutor {
        async fn execute(
            &self,
            selector: &str,
            message_type: MessageType,
            payload: &ActionPayload,
        ) -> ExecutorResponse {
            self.calls
                .lock()
                .unwrap()
                .push((selector.to_string(), message_type, payload.clone()));
            self.response.clone()
        }
    }

    #[derive(Clone, Copy)]
    enum SelectorScript {
        Pick(&'static str),
        Cancel,
        Unavailable(&'static str),
    }

    #[derive(Clone)]
    struct ScriptedSelector {
        script: SelectorScript,
        requests: Arc<AtomicUsize>,
    }

    impl ScriptedSelector {
        fn picking(selector: &'static str) -> Self {
            Self {
                script: SelectorScript::Pick(selector),
                requests: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn cancelling() -> Self {
            Self {
                script: SelectorScript::Cancel,
                requests: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn unavailable(reason: &'static str) -> Self {
            Self {
                script: SelectorScript::Unavailable(reason),
                requests: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl ElementSelector for ScriptedSelector {
        async fn request_selection(
            &self,
            _request: &AutomationRequest,
        ) -> Result<ElementSelection, SelectionError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.script {
                SelectorScript::Pick(selector) => Ok(ElementSelection {
                    selector: selector.to_string(),
                    element_descriptor: None,
                }),
                SelectorScript::Cancel => Err(SelectionError::Cancelled),
                SelectorScript::Unavailable(reason) => {
                    Err(SelectionError::Unavailable(reason.to_string()))
                }
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSessionLog {
        started: Arc<Mutex<Vec<TrainingSession>>>,
        ended: Arc<Mutex<Vec<TrainingSession>>>,
    }

    impl TrainingSessionRepository for RecordingSessionLog {
        async fn record_started(&self, session: &TrainingSession) -> Result<(), RepositoryError> {
            self.started.lock().unwrap().push(session.clone());
            Ok(())
        }

        async fn record_ended(&self, session: &TrainingSession) -> Result<(), RepositoryError> {
            self.ended.lock().unwrap().push(session.clone());
            Ok(())
        }

        async fn recent(&self, limit: i64) -> Result<Vec<TrainingSession>, RepositoryError> {
            let mut sessions = self.started.lock().unwrap().clone();
            sessions.reverse();
            sessions.truncate(limit as usize);
            Ok(sessions)
        }
    }

    struct FailingSessionLog;

    impl TrainingSessionRepository for FailingSessionLog {
        async fn record_started(&self, _session: &TrainingSession) -> Result<(), RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn record_ended(&self, _session: &TrainingSession) -> Result<(), RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn recent(&self, _limit: i64) -> Result<Vec<TrainingSession>, RepositoryError> {
            Err(RepositoryError::Connection)
        }
    }

    // --- Helpers ---

    fn chatgpt_context(hash: &str) -> ExecutionContext {
        ExecutionContext {
            url: "https://chatgpt.com/g/projects".to_string(),
            hostname: "chatgpt.com".to_string(),
            pathname: "/g/projects".to_string(),
            title: "ChatGPT".to_string(),
            captured_at: Utc::now(),
            page_structure_hash: hash.to_string(),
        }
    }

    fn fill_text(value: &str) -> ActionPayload {
        ActionPayload::FillText {
            value: value.to_string(),
            clear_first: None,
            press_enter: None,
        }
    }

    fn envelope(payload: ActionPayload, context: ExecutionContext) -> CommandEnvelope {
        CommandEnvelope::new(Uuid::now_v7(), AutomationRequest::new(payload, context))
    }

    fn demonstrated_pattern() -> AutomationPattern {
        AutomationPattern::learned(
            fill_text("the demo text"),
            chatgpt_context("hash-a"),
            "textarea#prompt".to_string(),
        )
    }

    fn service<E, S, T>(
        repository: SharedRepository,
        sessions: T,
        executor: E,
        selector: S,
    ) -> AutomationService<SharedRepository, T>
    where
        E: ElementExecutor + 'static,
        S: ElementSelector + 'static,
        T: TrainingSessionRepository,
    {
        AutomationService::new(
            repository,
            sessions,
            executor,
            selector,
            EngineConfig::default(),
        )
    }

    // --- Tests ---

    #[tokio::test]
    async fn matched_request_replays_stored_selector_with_live_payload() {
        let pattern = demonstrated_pattern();
        let pattern_id = pattern.id;
        let repository = SharedRepository::seeded(vec![pattern]);
        let executor = ScriptedExecutor::succeeding();
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            executor.clone(),
            ScriptedSelector::picking("unused"),
        );

        let outcome = svc
            .handle_automation_request(envelope(fill_text("the live text"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::PatternExecuted {
                pattern_id: executed,
                ..
            } => assert_eq!(executed, pattern_id),
            other => panic!("expected pattern execution, got {other:?}"),
        }

        let calls = executor.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "textarea#prompt");
        assert_eq!(calls[0].1, MessageType::FillText);
        assert_eq!(calls[0].2, fill_text("the live text"));

        let stored = &repository.snapshot()[0];
        assert_eq!(stored.usage_count, 1);
        assert_eq!(stored.successful_executions, 1);
    }

    #[tokio::test]
    async fn unmatched_request_asks_user_and_learns_the_pick() {
        let repository = SharedRepository::default();
        let executor = ScriptedExecutor::succeeding();
        let selector = ScriptedSelector::picking("button.send-primary");
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            executor.clone(),
            selector.clone(),
        );

        let outcome = svc
            .handle_automation_request(envelope(fill_text("hello"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        let learned = match outcome.disposition {
            Disposition::ElementSelectionRequested { learned } => learned,
            other => panic!("expected selection request, got {other:?}"),
        };
        let learned = learned.expect("a confirmed pick learns a pattern");

        assert!(executor.recorded().is_empty());
        assert_eq!(selector.request_count(), 1);

        let stored = repository.snapshot();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, learned);
        assert_eq!(stored[0].selector, "button.send-primary");
        assert_eq!(stored[0].confidence, 1.0);
        assert_eq!(stored[0].usage_count, 0);
    }

    #[tokio::test]
    async fn training_mode_bypasses_matching_for_that_website() {
        // A perfect candidate exists, but training mode asks the user anyway.
        let repository = SharedRepository::seeded(vec![demonstrated_pattern()]);
        let executor = ScriptedExecutor::succeeding();
        let selector = ScriptedSelector::picking("div.composer textarea");
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            executor.clone(),
            selector.clone(),
        );

        svc.enable_training("chatgpt.com").await.unwrap();
        let outcome = svc
            .handle_automation_request(envelope(fill_text("the live text"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::ElementSelectionRequested { learned } => {
                assert!(learned.is_some());
            }
            other => panic!("expected selection request, got {other:?}"),
        }
        assert!(executor.recorded().is_empty());
        assert_eq!(repository.snapshot().len(), 2);

        let session = svc.active_session().await.unwrap();
        assert_eq!(session.patterns_learned, 1);
    }

    #[tokio::test]
    async fn training_for_another_website_does_not_bypass_matching() {
        let pattern = demonstrated_pattern();
        let pattern_id = pattern.id;
        let repository = SharedRepository::seeded(vec![pattern]);
        let svc = service(
            repository,
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        svc.enable_training("github.com").await.unwrap();
        let outcome = svc
            .handle_automation_request(envelope(fill_text("the live text"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::PatternExecuted {
                pattern_id: executed,
                ..
            } => assert_eq!(executed, pattern_id),
            other => panic!("expected pattern execution, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_selection_resolves_without_learning() {
        let repository = SharedRepository::default();
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::cancelling(),
        );

        let outcome = svc
            .handle_automation_request(envelope(fill_text("hello"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::ElementSelectionRequested { learned } => assert!(learned.is_none()),
            other => panic!("expected selection request, got {other:?}"),
        }
        assert!(repository.snapshot().is_empty());
    }

    #[tokio::test]
    async fn unavailable_selection_ui_resolves_without_learning() {
        let repository = SharedRepository::default();
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::unavailable("extension popup closed"),
        );

        let outcome = svc
            .handle_automation_request(envelope(fill_text("hello"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::ElementSelectionRequested { learned } => assert!(learned.is_none()),
            other => panic!("expected selection request, got {other:?}"),
        }
        assert!(repository.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_replay_reports_reason_and_dents_confidence() {
        let pattern = demonstrated_pattern();
        let pattern_id = pattern.id;
        let repository = SharedRepository::seeded(vec![pattern]);
        let svc = service(
            repository.clone(),
            RecordingSessionLog::default(),
            ScriptedExecutor::failing("element not found on page"),
            ScriptedSelector::picking("unused"),
        );

        let outcome = svc
            .handle_automation_request(envelope(fill_text("the live text"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        match outcome.disposition {
            Disposition::PatternExecutionFailed {
                pattern_id: failed,
                reason,
            } => {
                assert_eq!(failed, pattern_id);
                assert_eq!(reason, "element not found on page");
            }
            other => panic!("expected failed execution, got {other:?}"),
        }

        let stored = &repository.snapshot()[0];
        assert_eq!(stored.usage_count, 1);
        assert_eq!(stored.successful_executions, 0);
        assert!((stored.confidence - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn outcome_echoes_correlation_id() {
        let svc = service(
            SharedRepository::default(),
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::cancelling(),
        );

        let env = envelope(fill_text("hello"), chatgpt_context("hash-a"));
        let correlation_id = env.correlation_id;
        let outcome = svc.handle_automation_request(env).await.unwrap();
        assert_eq!(outcome.correlation_id, correlation_id);
    }

    #[tokio::test]
    async fn outcomes_are_published_on_the_bus() {
        let svc = service(
            SharedRepository::default(),
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("button.send"),
        );
        let mut rx = svc.subscribe_outcomes();

        let returned = svc
            .handle_automation_request(envelope(fill_text("hello"), chatgpt_context("hash-a")))
            .await
            .unwrap();

        let published = rx.recv().await.unwrap();
        assert_eq!(published.correlation_id, returned.correlation_id);
        assert_eq!(published.disposition, returned.disposition);
    }

    #[tokio::test]
    async fn enable_training_writes_audit_row() {
        let log = RecordingSessionLog::default();
        let svc = service(
            SharedRepository::default(),
            log.clone(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        let session = svc.enable_training("chatgpt.com").await.unwrap();
        let started = log.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].id, session.id);
    }

    #[tokio::test]
    async fn disable_training_records_session_end() {
        let log = RecordingSessionLog::default();
        let svc = service(
            SharedRepository::default(),
            log.clone(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        svc.enable_training("chatgpt.com").await.unwrap();
        let ended = svc
            .disable_training(DeactivationReason::UserRequest)
            .await
            .unwrap();
        assert!(!ended.is_active());

        let recorded = log.ended.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].end_reason, Some(DeactivationReason::UserRequest));
    }

    #[tokio::test]
    async fn audit_log_failure_does_not_block_training() {
        let svc = service(
            SharedRepository::default(),
            FailingSessionLog,
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        let session = svc.enable_training("chatgpt.com").await.unwrap();
        assert!(session.is_active());
        assert_eq!(svc.current_mode().await, AutomationMode::Training);

        let ended = svc.disable_training(DeactivationReason::UserRequest).await;
        assert!(ended.is_some());
    }

    #[tokio::test]
    async fn pattern_statistics_delegates_to_repository() {
        let github = AutomationPattern::learned(
            ActionPayload::ClickElement { description: None },
            ExecutionContext {
                url: "https://github.com/pulls".to_string(),
                hostname: "github.com".to_string(),
                pathname: "/pulls".to_string(),
                title: "Pull Requests".to_string(),
                captured_at: Utc::now(),
                page_structure_hash: "hash-gh".to_string(),
            },
            "button.merge".to_string(),
        );
        let repository = SharedRepository::seeded(vec![demonstrated_pattern(), github]);
        let svc = service(
            repository,
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        let stats = svc.pattern_statistics().await.unwrap();
        assert_eq!(stats.total_patterns, 2);
        assert_eq!(stats.patterns_by_website.get("chatgpt.com"), Some(&1));
        assert_eq!(stats.patterns_by_website.get("github.com"), Some(&1));
        assert!((stats.average_confidence - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn exported_patterns_import_into_another_store() {
        let source = SharedRepository::seeded(vec![demonstrated_pattern(), demonstrated_pattern()]);
        let source_svc = service(
            source,
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );

        let exported = source_svc.export_patterns().await.unwrap();
        assert_eq!(exported.len(), 2);

        let target = SharedRepository::default();
        let target_svc = service(
            target.clone(),
            RecordingSessionLog::default(),
            ScriptedExecutor::succeeding(),
            ScriptedSelector::picking("unused"),
        );
        let written = target_svc.import_patterns(&exported).await.unwrap();
        assert_eq!(written, 2);
        assert_eq!(target.snapshot().len(), 2);
    }
}
