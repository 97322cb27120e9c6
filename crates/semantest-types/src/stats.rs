//! Read-only aggregate statistics over the pattern store.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

/// Aggregates for dashboards and the CLI. Averages are 0.0 when the store
/// is empty rather than NaN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternStatistics {
    pub total_patterns: u64,
    /// Pattern counts keyed by hostname, sorted for stable display.
    pub patterns_by_website: BTreeMap<String, u64>,
    /// Mean confidence across all patterns.
    pub average_confidence: f64,
    /// Successful executions over total executions, across all patterns.
    pub success_rate: f64,
}
