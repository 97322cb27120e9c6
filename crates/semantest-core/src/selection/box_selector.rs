//! BoxElementSelector -- object-safe dynamic dispatch wrapper for
//! ElementSelector. Same blanket-impl pattern as BoxElementExecutor.

use std::future::Future;
use std::pin::Pin;

use semantest_types::error::SelectionError;
use semantest_types::request::AutomationRequest;

use super::selector::{ElementSelection, ElementSelector};

/// Object-safe version of [`ElementSelector`] with boxed futures.
pub trait ElementSelectorDyn: Send + Sync {
    fn request_selection_boxed<'a>(
        &'a self,
        request: &'a AutomationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ElementSelection, SelectionError>> + Send + 'a>>;
}

/// Blanket implementation: any `ElementSelector` automatically implements
/// `ElementSelectorDyn`.
impl<T: ElementSelector> ElementSelectorDyn for T {
    fn request_selection_boxed<'a>(
        &'a self,
        request: &'a AutomationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ElementSelection, SelectionError>> + Send + 'a>> {
        Box::pin(self.request_selection(request))
    }
}

/// Type-erased element selector for runtime wiring.
pub struct BoxElementSelector {
    inner: Box<dyn ElementSelectorDyn + Send + Sync>,
}

impl BoxElementSelector {
    /// Wrap a concrete `ElementSelector` in a type-erased box.
    pub fn new<T: ElementSelector + 'static>(selector: T) -> Self {
        Self {
            inner: Box::new(selector),
        }
    }

    /// Ask the user to pick an element. See
    /// [`ElementSelector::request_selection`].
    pub async fn request_selection(
        &self,
        request: &AutomationRequest,
    ) -> Result<ElementSelection, SelectionError> {
        self.inner.request_selection_boxed(request).await
    }
}

impl ElementSelector for BoxElementSelector {
    async fn request_selection(
        &self,
        request: &AutomationRequest,
    ) -> Result<ElementSelection, SelectionError> {
        self.inner.request_selection_boxed(request).await
    }
}
