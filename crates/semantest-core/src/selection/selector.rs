//! ElementSelector trait definition.

use serde::{Deserialize, Serialize};
use semantest_types::context::DomNode;
use semantest_types::error::SelectionError;
use semantest_types::request::AutomationRequest;

/// What the user picked: a selector for replay plus the element it resolved
/// to at pick time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSelection {
    /// CSS selector addressing the chosen element.
    pub selector: String,
    /// Snapshot of the chosen element, for logs and pattern inspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_descriptor: Option<DomNode>,
}

/// Asks the user to pick an element for a request.
///
/// Implementations live outside this crate (extension UI bridge, test
/// doubles). Cancellation is an error (`SelectionError::Cancelled`), since
/// a cancelled pick leaves nothing to learn.
pub trait ElementSelector: Send + Sync {
    fn request_selection(
        &self,
        request: &AutomationRequest,
    ) -> impl std::future::Future<Output = Result<ElementSelection, SelectionError>> + Send;
}
