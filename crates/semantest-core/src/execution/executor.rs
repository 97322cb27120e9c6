//! ElementExecutor trait definition.
//!
//! The browser DOM layer implements this; the core treats it as a black
//! box and does not know how clicks or typing happen.

use serde::{Deserialize, Serialize};
use semantest_types::request::{ActionPayload, MessageType};

/// What the DOM layer reports back for one action.
///
/// Failure is in-band (`success: false` plus `error_message`), never a Rust
/// error: the executor answering "element not found" is a normal outcome the
/// engine must score, not a fault in the call itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ExecutorResponse {
    pub fn ok(result_data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            result_data,
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result_data: None,
            error_message: Some(message.into()),
        }
    }

    /// The failure message, or a generic one when the executor reported
    /// failure without saying why.
    pub fn failure_reason(&self) -> String {
        self.error_message
            .clone()
            .unwrap_or_else(|| "executor reported failure without a message".to_string())
    }
}

/// Performs one DOM action against the live page.
///
/// Implementations live outside this crate (browser extension bridge, test
/// doubles). Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Timeouts are the implementation's concern; the core awaits the answer.
pub trait ElementExecutor: Send + Sync {
    /// Perform `message_type` on the element at `selector` with the live
    /// request's parameters.
    fn execute(
        &self,
        selector: &str,
        message_type: MessageType,
        payload: &ActionPayload,
    ) -> impl std::future::Future<Output = ExecutorResponse> + Send;
}
