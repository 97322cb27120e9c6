//! BoxElementExecutor -- object-safe dynamic dispatch wrapper for
//! ElementExecutor.
//!
//! 1. Define an object-safe `ElementExecutorDyn` trait with boxed futures
//! 2. Blanket-impl `ElementExecutorDyn` for all `T: ElementExecutor`
//! 3. `BoxElementExecutor` wraps `Box<dyn ElementExecutorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use semantest_types::request::{ActionPayload, MessageType};

use super::executor::{ElementExecutor, ExecutorResponse};

/// Object-safe version of [`ElementExecutor`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch
/// (`dyn ElementExecutorDyn`). A blanket implementation is provided for all
/// types implementing `ElementExecutor`.
pub trait ElementExecutorDyn: Send + Sync {
    fn execute_boxed<'a>(
        &'a self,
        selector: &'a str,
        message_type: MessageType,
        payload: &'a ActionPayload,
    ) -> Pin<Box<dyn Future<Output = ExecutorResponse> + Send + 'a>>;
}

/// Blanket implementation: any `ElementExecutor` automatically implements
/// `ElementExecutorDyn`.
impl<T: ElementExecutor> ElementExecutorDyn for T {
    fn execute_boxed<'a>(
        &'a self,
        selector: &'a str,
        message_type: MessageType,
        payload: &'a ActionPayload,
    ) -> Pin<Box<dyn Future<Output = ExecutorResponse> + Send + 'a>> {
        Box::pin(self.execute(selector, message_type, payload))
    }
}

/// Type-erased element executor for runtime wiring.
///
/// Since `ElementExecutor` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxElementExecutor` provides an equivalent method that
/// delegates to the inner `ElementExecutorDyn` trait object.
pub struct BoxElementExecutor {
    inner: Box<dyn ElementExecutorDyn + Send + Sync>,
}

impl BoxElementExecutor {
    /// Wrap a concrete `ElementExecutor` in a type-erased box.
    pub fn new<T: ElementExecutor + 'static>(executor: T) -> Self {
        Self {
            inner: Box::new(executor),
        }
    }

    /// Perform one DOM action. See [`ElementExecutor::execute`].
    pub async fn execute(
        &self,
        selector: &str,
        message_type: MessageType,
        payload: &ActionPayload,
    ) -> ExecutorResponse {
        self.inner
            .execute_boxed(selector, message_type, payload)
            .await
    }
}

impl ElementExecutor for BoxElementExecutor {
    async fn execute(
        &self,
        selector: &str,
        message_type: MessageType,
        payload: &ActionPayload,
    ) -> ExecutorResponse {
        self.inner
            .execute_boxed(selector, message_type, payload)
            .await
    }
}
