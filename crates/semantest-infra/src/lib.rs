//! Infrastructure layer for Semantest.
//!
//! Contains implementations of the ports defined in `semantest-core`:
//! SQLite storage with WAL mode and split read/write pools, the SHA-256
//! structure hasher, an in-memory pattern store, and the configuration
//! loader.

pub mod config;
pub mod hash;
pub mod memory;
pub mod sqlite;
