//! TrainingTracker: the process-wide mode flag and active session.

use semantest_types::error::TrainingError;
use semantest_types::training::{AutomationMode, DeactivationReason, TrainingSession};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Mode flag and active-session pointer behind one lock.
struct TrackerState {
    mode: AutomationMode,
    active: Option<TrainingSession>,
}

/// Owns the `Inactive -> Active -> Inactive` session lifecycle and the
/// process-wide automation mode.
///
/// Both live behind a single mutex so a mode read and the session it refers
/// to can never be observed mid-transition. The mode mutates only through
/// `enable_training_mode` and `switch_to_automatic_mode`; nothing else
/// writes it.
///
/// Pipelines capture the mode once when a request enters and complete under
/// that mode; a transition during a request affects the next request, not
/// the one in flight.
pub struct TrainingTracker {
    state: Mutex<TrackerState>,
}

impl TrainingTracker {
    /// Starts in automatic mode with no session.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState {
                mode: AutomationMode::Automatic,
                active: None,
            }),
        }
    }

    /// `Inactive -> Active`: start a session for `website` and set the mode
    /// to training.
    ///
    /// Only one session exists system-wide. Enabling for the website that is
    /// already active returns the existing session unchanged; enabling for a
    /// different website fails with `AlreadyActive` instead of silently
    /// ending the first session.
    pub async fn enable_training_mode(
        &self,
        website: &str,
    ) -> Result<TrainingSession, TrainingError> {
        let mut state = self.state.lock().await;
        if let Some(active) = &state.active {
            if active.website == website {
                debug!(website, "Training already active for this website");
                return Ok(active.clone());
            }
            return Err(TrainingError::AlreadyActive {
                active_website: active.website.clone(),
                requested_website: website.to_string(),
            });
        }
        let session = TrainingSession::start(website);
        info!(website, session_id = %session.id, "Training mode enabled");
        state.mode = AutomationMode::Training;
        state.active = Some(session.clone());
        Ok(session)
    }

    /// `Active -> Inactive`: end the session, leaving the mode flag as it
    /// is. Returns the ended session for the audit log; `None` when no
    /// session was active (a no-op, not an error).
    pub async fn disable_training_mode(
        &self,
        reason: DeactivationReason,
    ) -> Option<TrainingSession> {
        let mut state = self.state.lock().await;
        let mut session = state.active.take()?;
        session.end(reason);
        info!(website = %session.website, session_id = %session.id, %reason, "Training session ended");
        Some(session)
    }

    /// Force `Active -> Inactive` and set the mode to automatic. Returns the
    /// ended session, if one was active.
    pub async fn switch_to_automatic_mode(&self) -> Option<TrainingSession> {
        let mut state = self.state.lock().await;
        state.mode = AutomationMode::Automatic;
        let mut session = state.active.take()?;
        session.end(DeactivationReason::ModeSwitch);
        info!(website = %session.website, session_id = %session.id, "Switched to automatic mode");
        Some(session)
    }

    /// The current mode.
    pub async fn current_mode(&self) -> AutomationMode {
        self.state.lock().await.mode
    }

    /// A copy of the active session, if any.
    pub async fn active_session(&self) -> Option<TrainingSession> {
        self.state.lock().await.active.clone()
    }

    /// True when the mode is training and the active session covers
    /// `website`. This is the one check request pipelines make at entry.
    pub async fn is_training_for(&self, website: &str) -> bool {
        let state = self.state.lock().await;
        state.mode == AutomationMode::Training
            && state
                .active
                .as_ref()
                .is_some_and(|session| session.website == website)
    }

    /// Credit a learned pattern to the active session, when it covers
    /// `website`.
    pub async fn record_pattern_learned(&self, website: &str) {
        let mut state = self.state.lock().await;
        if let Some(session) = &mut state.active {
            if session.website == website {
                session.record_learned();
            }
        }
    }
}

impl Default for TrainingTracker {
    fn default() -> Self {
        Self::new()
    }
}
