//! Shared domain types for the Semantest pattern engine.
//!
//! This crate contains the core domain types used across the engine:
//! ExecutionContext, AutomationRequest, AutomationPattern, TrainingSession,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod context;
pub mod error;
pub mod outcome;
pub mod pattern;
pub mod request;
pub mod stats;
pub mod training;
