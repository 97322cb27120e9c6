//! Pattern matching against live requests.
//!
//! - `score`: the four sub-score computations
//! - `engine`: `MatchingEngine`, candidate loading + ranking

pub mod engine;
pub mod score;
