//! Observability setup for Semantest binaries.

pub mod tracing_setup;
