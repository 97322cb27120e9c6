//! Engine configuration types.
//!
//! `EngineConfig` represents the top-level `config.toml` that controls
//! match scoring, confidence smoothing, and pattern cleanup.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the automation engine.
///
/// Loaded from `~/.semantest/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Match scoring weights and acceptance threshold.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Confidence smoothing parameters.
    #[serde(default)]
    pub confidence: ConfidenceSmoothing,

    /// Retention policy for the cleanup operation.
    #[serde(default)]
    pub cleanup: CleanupPolicy,
}

/// Scoring policy for the matching engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Relative weights of the four sub-scores.
    #[serde(default)]
    pub weights: ScoreWeights,

    /// Minimum overall score a candidate needs to be returned.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

fn default_confidence_threshold() -> f64 {
    0.5
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

/// Relative weights of the match sub-scores.
///
/// Context and type together must dominate payload and reliability, so a
/// selector never fires against a page whose shape it was not learned on.
/// Reliability stays lowest so a never-used pattern remains eligible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_type_weight")]
    pub type_weight: f64,
    #[serde(default = "default_context_weight")]
    pub context_weight: f64,
    #[serde(default = "default_payload_weight")]
    pub payload_weight: f64,
    #[serde(default = "default_reliability_weight")]
    pub reliability_weight: f64,
}

fn default_type_weight() -> f64 {
    0.3
}

fn default_context_weight() -> f64 {
    0.4
}

fn default_payload_weight() -> f64 {
    0.2
}

fn default_reliability_weight() -> f64 {
    0.1
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            type_weight: default_type_weight(),
            context_weight: default_context_weight(),
            payload_weight: default_payload_weight(),
            reliability_weight: default_reliability_weight(),
        }
    }
}

/// Exponential-moving-average parameters for pattern confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceSmoothing {
    /// Weight given to the newest outcome.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Confidence never drops below this, so a pattern can recover.
    #[serde(default = "default_floor")]
    pub floor: f64,
}

fn default_alpha() -> f64 {
    0.2
}

fn default_floor() -> f64 {
    0.05
}

impl Default for ConfidenceSmoothing {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            floor: default_floor(),
        }
    }
}

/// Retention policy for `cleanup`: patterns older than the caller-supplied
/// age are deleted only when their usage is below this floor, so proven
/// patterns survive any age cutoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupPolicy {
    /// Patterns with at least this many executions are never age-expired.
    #[serde(default = "default_low_use_floor")]
    pub low_use_floor: u64,
}

fn default_low_use_floor() -> u64 {
    5
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            low_use_floor: default_low_use_floor(),
        }
    }
}
