//! Event dispatch for the request pipeline.
//!
//! Dispatch is an explicit table plus an explicit queue, nothing reflective:
//! - `event`: tagged `DomainEvent` variants and their `EventKind` tags
//! - `registry`: `EventKind -> handler` mapping, populated at startup
//! - `pump`: FIFO work queue drained until a terminal outcome

pub mod event;
pub mod pump;
pub mod registry;
