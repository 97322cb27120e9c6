//! Pattern learning, matching, and execution logic for Semantest.
//!
//! This crate defines the "ports" (repository and collaborator traits) that
//! the infrastructure layer implements. It depends only on `semantest-types`
//! -- never on `semantest-infra` or any database/IO crate.

pub mod bus;
pub mod dispatch;
pub mod execution;
pub mod fingerprint;
pub mod matching;
pub mod repository;
pub mod selection;
pub mod service;
pub mod training;
