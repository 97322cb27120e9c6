//! Execution context fingerprinting.
//!
//! This module turns a raw page snapshot into the compact `ExecutionContext`
//! the matcher compares against:
//! - `StructureHasher`: hashing seam implemented in semantest-infra
//! - `build_outline`: normalized DOM outline, stable across content changes
//! - `ContextFingerprinter`: capture pipeline (URL split + outline + hash)

pub mod fingerprinter;
pub mod hasher;
pub mod outline;
