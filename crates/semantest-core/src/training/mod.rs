//! Training mode state machine.

pub mod tracker;
