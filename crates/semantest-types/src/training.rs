//! Training sessions and the process-wide automation mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a training session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Process-wide dispatch mode. Starts automatic; only the training-mode
/// transitions flip it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationMode {
    /// Requests go through the matching engine; misses fall back to
    /// element selection.
    #[default]
    Automatic,
    /// Requests on the session's website prompt for element selection and
    /// learn patterns from the user's choices.
    Training,
}

impl fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationMode::Automatic => write!(f, "automatic"),
            AutomationMode::Training => write!(f, "training"),
        }
    }
}

impl FromStr for AutomationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "automatic" => Ok(AutomationMode::Automatic),
            "training" => Ok(AutomationMode::Training),
            other => Err(format!("invalid automation mode: '{other}'")),
        }
    }
}

/// Why a training session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationReason {
    /// The user turned training off.
    UserRequest,
    /// Ended as a side effect of switching to automatic mode.
    ModeSwitch,
    /// The process is shutting down.
    Shutdown,
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeactivationReason::UserRequest => write!(f, "user_request"),
            DeactivationReason::ModeSwitch => write!(f, "mode_switch"),
            DeactivationReason::Shutdown => write!(f, "shutdown"),
        }
    }
}

impl FromStr for DeactivationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user_request" => Ok(DeactivationReason::UserRequest),
            "mode_switch" => Ok(DeactivationReason::ModeSwitch),
            "shutdown" => Ok(DeactivationReason::Shutdown),
            other => Err(format!("invalid deactivation reason: '{other}'")),
        }
    }
}

/// One training session for one website.
///
/// Liveness is derived from `ended_at` rather than stored as a separate
/// flag, so a session can never claim to be active while carrying an end
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSession {
    pub id: SessionId,
    /// Hostname the session is scoped to.
    pub website: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub end_reason: Option<DeactivationReason>,
    /// Patterns demonstrated during this session.
    pub patterns_learned: u64,
}

impl TrainingSession {
    pub fn start(website: impl Into<String>) -> Self {
        Self {
            id: SessionId::new(),
            website: website.into(),
            started_at: Utc::now(),
            ended_at: None,
            end_reason: None,
            patterns_learned: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Close the session. Ending an already-ended session keeps the original
    /// end time and reason.
    pub fn end(&mut self, reason: DeactivationReason) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Utc::now());
            self.end_reason = Some(reason);
        }
    }

    pub fn record_learned(&mut self) {
        self.patterns_learned += 1;
    }
}
