//! Results flowing out of matching, execution, and request handling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pattern::{AutomationPattern, PatternId};

/// Per-candidate sub-scores plus the weighted combination.
///
/// All components are in `[0.0, 1.0]`. Kept alongside the match so callers
/// and logs can see why a candidate ranked where it did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    /// 1.0 when the action kinds match (mismatches are excluded outright).
    pub type_score: f64,
    /// Structural closeness of the live page to the learned one.
    pub context_score: f64,
    /// Key-set similarity of the live payload to the learned one.
    pub payload_score: f64,
    /// The pattern's current confidence.
    pub reliability_score: f64,
    /// Weighted combination of the four sub-scores.
    pub overall: f64,
}

/// One candidate pattern that passed the confidence threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub pattern: AutomationPattern,
    pub score: MatchScore,
}

/// Terminal state of one pattern execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// The executor performed the action.
    Executed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result_data: Option<serde_json::Value>,
    },
    /// The executor could not perform the action (element missing, action
    /// rejected). The pattern stays stored; only its confidence pays.
    Failed { reason: String },
}

/// What happened when a matched pattern was replayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub pattern_id: PatternId,
    pub status: ExecutionStatus,
}

impl ExecutionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, ExecutionStatus::Executed { .. })
    }
}

/// How a request was ultimately resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Disposition {
    /// A stored pattern matched and its replay succeeded.
    PatternExecuted {
        pattern_id: PatternId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result_data: Option<serde_json::Value>,
    },
    /// No usable pattern; the user was asked to pick an element. When the
    /// selection produced a new pattern, `learned` carries its id.
    ElementSelectionRequested {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        learned: Option<PatternId>,
    },
    /// A pattern matched but its replay failed. No automatic retry with
    /// another candidate; the caller decides what happens next.
    PatternExecutionFailed { pattern_id: PatternId, reason: String },
}

/// The engine's answer for one command, correlated back to the transport
/// layer by the id it arrived with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Echoed unchanged from the originating [`crate::request::CommandEnvelope`].
    pub correlation_id: Uuid,
    pub disposition: Disposition,
}

impl RequestOutcome {
    pub fn new(correlation_id: Uuid, disposition: Disposition) -> Self {
        Self {
            correlation_id,
            disposition,
        }
    }
}
