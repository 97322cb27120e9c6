//! MatchingEngine: candidate loading, scoring, and ranking.

use semantest_types::config::MatchingConfig;
use semantest_types::error::RepositoryError;
use semantest_types::outcome::{MatchResult, MatchScore};
use semantest_types::pattern::AutomationPattern;
use semantest_types::request::AutomationRequest;
use tracing::debug;

use crate::matching::score;
use crate::repository::pattern::PatternRepository;

/// Ranks stored patterns against a live request.
///
/// Generic over `PatternRepository` to maintain clean architecture
/// (semantest-core never depends on semantest-infra). The engine only
/// reads; recording outcomes is the coordinator's job.
pub struct MatchingEngine<R: PatternRepository> {
    repository: R,
    config: MatchingConfig,
}

impl<R: PatternRepository> MatchingEngine<R> {
    /// Create a new engine over the given repository.
    pub fn new(repository: R, config: MatchingConfig) -> Self {
        Self { repository, config }
    }

    /// All acceptable matches for `request`, best first.
    ///
    /// Candidates with a different message type or hostname never appear.
    /// Survivors are filtered by the configured threshold and ordered by
    /// overall score, then usage count, then id, so identical inputs always
    /// produce the identical ranking.
    pub async fn find_matches(
        &self,
        request: &AutomationRequest,
    ) -> Result<Vec<MatchResult>, RepositoryError> {
        let candidates = self
            .repository
            .find_candidates(&request.context.hostname, request.message_type())
            .await?;
        let considered = candidates.len();

        let mut matches: Vec<MatchResult> = candidates
            .into_iter()
            .filter_map(|candidate| self.score_candidate(candidate, request))
            .filter(|result| result.score.overall >= self.config.confidence_threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .overall
                .total_cmp(&a.score.overall)
                .then_with(|| b.pattern.usage_count.cmp(&a.pattern.usage_count))
                .then_with(|| a.pattern.id.cmp(&b.pattern.id))
        });

        debug!(
            hostname = %request.context.hostname,
            message_type = %request.message_type(),
            considered,
            accepted = matches.len(),
            "Ranked pattern candidates"
        );
        Ok(matches)
    }

    /// The single best match, if any passes the threshold.
    pub async fn best_match(
        &self,
        request: &AutomationRequest,
    ) -> Result<Option<MatchResult>, RepositoryError> {
        Ok(self.find_matches(request).await?.into_iter().next())
    }

    /// Score one candidate. `None` means disqualified (wrong action kind or
    /// wrong hostname), regardless of how the other components score.
    fn score_candidate(
        &self,
        pattern: AutomationPattern,
        request: &AutomationRequest,
    ) -> Option<MatchResult> {
        if pattern.message_type() != request.message_type() {
            return None;
        }
        let type_score = 1.0;
        let context_score = score::context_score(&pattern.context, &request.context)?;
        let payload_score = score::payload_similarity(&pattern.payload, &request.payload);
        let reliability_score = pattern.confidence;

        let weights = &self.config.weights;
        let overall = weights.type_weight * type_score
            + weights.context_weight * context_score
            + weights.payload_weight * payload_score
            + weights.reliability_weight * reliability_score;

        Some(MatchResult {
            pattern,
            score: MatchScore {
                type_score,
                context_score,
                payload_score,
                reliability_score,
                overall,
            },
        })
    }
}
