//! User element-selection boundary.
//!
//! During training the engine asks the UI layer to let the user pick an
//! element. The core neither renders nor manages that UI; it only consumes
//! the answer.

pub mod box_selector;
pub mod selector;
