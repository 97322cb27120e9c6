//! Learned automation patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfidenceSmoothing;
use crate::context::ExecutionContext;
use crate::request::{ActionPayload, MessageType};

/// Unique identifier for a learned pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(pub Uuid);

impl PatternId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Default for PatternId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PatternId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One learned automation: a payload template, the page context it was
/// demonstrated in, and the selector the user picked.
///
/// Confidence starts at 1.0 when the pattern is demonstrated and decays
/// toward observed reliability through an exponential moving average, so a
/// single stale failure dents but does not erase an otherwise solid pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationPattern {
    pub id: PatternId,
    /// Payload captured at demonstration time. The variant fixes the
    /// action kind for the pattern's lifetime.
    pub payload: ActionPayload,
    /// Page context captured at demonstration time.
    pub context: ExecutionContext,
    /// CSS selector for the element the user picked.
    pub selector: String,
    /// Smoothed reliability estimate in `[0.0, 1.0]`.
    pub confidence: f64,
    /// Times this pattern was executed (success or failure).
    pub usage_count: u64,
    /// Times execution succeeded.
    pub successful_executions: u64,
    pub learned_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AutomationPattern {
    /// Record a fresh demonstration. A just-taught pattern is trusted fully
    /// until execution evidence says otherwise.
    pub fn learned(payload: ActionPayload, context: ExecutionContext, selector: String) -> Self {
        let now = Utc::now();
        Self {
            id: PatternId::new(),
            payload,
            context,
            selector,
            confidence: 1.0,
            usage_count: 0,
            successful_executions: 0,
            learned_at: now,
            updated_at: now,
        }
    }

    /// The action kind this pattern automates.
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }

    /// The hostname this pattern was learned on.
    pub fn hostname(&self) -> &str {
        &self.context.hostname
    }

    /// Fraction of executions that succeeded. 0.0 when never executed.
    pub fn success_rate(&self) -> f64 {
        if self.usage_count == 0 {
            0.0
        } else {
            self.successful_executions as f64 / self.usage_count as f64
        }
    }

    /// Fold one execution outcome into the pattern's counters and
    /// confidence: `c' = max(floor, (1 - alpha) * c + alpha * outcome)`
    /// where outcome is 1.0 for success and 0.0 for failure.
    pub fn apply_outcome(&mut self, success: bool, smoothing: &ConfidenceSmoothing) {
        self.usage_count += 1;
        if success {
            self.successful_executions += 1;
        }
        let observed = if success { 1.0 } else { 0.0 };
        let smoothed = (1.0 - smoothing.alpha) * self.confidence + smoothing.alpha * observed;
        self.confidence = smoothed.max(smoothing.floor);
        self.updated_at = Utc::now();
    }
}
