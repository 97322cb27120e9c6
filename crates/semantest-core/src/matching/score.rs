//! Match sub-score computations.
//!
//! Scores are in `[0.0, 1.0]`. Disqualification is expressed as `None`, not
//! as a zero score, so a hard mismatch can never be outweighed by the other
//! components.

use semantest_types::context::ExecutionContext;
use semantest_types::request::ActionPayload;

use std::collections::BTreeSet;

/// Structural closeness of the live page to the one the pattern was
/// learned on.
///
/// - different hostname: disqualified (`None`)
/// - identical structure hash: 1.0
/// - same hostname and pathname, different hash: 0.5
/// - same hostname only: 0.25
pub fn context_score(learned: &ExecutionContext, live: &ExecutionContext) -> Option<f64> {
    if !learned.same_hostname(live) {
        return None;
    }
    if learned.same_structure(live) {
        Some(1.0)
    } else if learned.same_page(live) {
        Some(0.5)
    } else {
        Some(0.25)
    }
}

/// Jaccard similarity of the populated parameter key sets.
///
/// Compares shape, not values: the text being typed differs between
/// requests, but which parameters are supplied is a stable signal. Two
/// payloads with no optional parameters at all are identical in shape.
pub fn payload_similarity(learned: &ActionPayload, live: &ActionPayload) -> f64 {
    let learned_keys: BTreeSet<&str> = learned.keys().into_iter().collect();
    let live_keys: BTreeSet<&str> = live.keys().into_iter().collect();
    if learned_keys.is_empty() && live_keys.is_empty() {
        return 1.0;
    }
    let intersection = learned_keys.intersection(&live_keys).count();
    let union = learned_keys.union(&live_keys).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    fn context(hostname: &str, pathname: &str, hash: &str) -> ExecutionContext {
        ExecutionContext {
            url: format!("https://{hostname}{pathname}"),
            hostname: hostname.to_string(),
            pathname: pathname.to_string(),
            title: String::new(),
            captured_at: Utc::now(),
            page_structure_hash: hash.to_string(),
        }
    }

    #[test]
    fn identical_structure_scores_full() {
        let learned = context("chatgpt.com", "/c/abc", "h1");
        let live = context("chatgpt.com", "/c/xyz", "h1");
        assert_eq!(context_score(&learned, &live), Some(1.0));
    }

    #[test]
    fn same_page_different_structure_scores_half() {
        let learned = context("chatgpt.com", "/c/abc", "h1");
        let live = context("chatgpt.com", "/c/abc", "h2");
        assert_eq!(context_score(&learned, &live), Some(0.5));
    }

    #[test]
    fn same_host_different_page_scores_quarter() {
        let learned = context("chatgpt.com", "/c/abc", "h1");
        let live = context("chatgpt.com", "/settings", "h2");
        assert_eq!(context_score(&learned, &live), Some(0.25));
    }

    #[test]
    fn different_hostname_disqualifies() {
        let learned = context("chatgpt.com", "/c/abc", "h1");
        let live = context("github.com", "/c/abc", "h1");
        assert_eq!(context_score(&learned, &live), None);
    }

    #[test]
    fn identical_key_sets_score_full() {
        let learned = ActionPayload::FillText {
            value: "old text".to_string(),
            clear_first: None,
            press_enter: Some(true),
        };
        let live = ActionPayload::FillText {
            value: "new text".to_string(),
            clear_first: None,
            press_enter: Some(false),
        };
        assert_eq!(payload_similarity(&learned, &live), 1.0);
    }

    #[test]
    fn partial_key_overlap_scores_proportionally() {
        let learned = ActionPayload::FillText {
            value: "x".to_string(),
            clear_first: Some(true),
            press_enter: Some(true),
        };
        let live = ActionPayload::FillText {
            value: "y".to_string(),
            clear_first: None,
            press_enter: Some(true),
        };
        // intersection {value, press_enter}, union {value, clear_first, press_enter}
        assert!((payload_similarity(&learned, &live) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_key_sets_are_identical_in_shape() {
        let learned = ActionPayload::ClickElement { description: None };
        let live = ActionPayload::ClickElement { description: None };
        assert_eq!(payload_similarity(&learned, &live), 1.0);
    }
}
