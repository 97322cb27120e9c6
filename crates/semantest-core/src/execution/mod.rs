//! Pattern replay against the browser DOM layer.
//!
//! - `executor`: `ElementExecutor` RPITIT trait and the in-band response shape
//! - `box_executor`: object-safe wrapper for dynamic dispatch
//! - `coordinator`: `ExecutionCoordinator`, replay + outcome recording

pub mod box_executor;
pub mod coordinator;
pub mod executor;
