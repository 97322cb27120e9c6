//! Business logic services (use cases).
//!
//! Services orchestrate the tracker, matching engine, coordinator, and
//! repositories. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod automation;
pub mod handlers;
