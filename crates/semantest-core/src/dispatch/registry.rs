//! Handler registry: an explicit mapping from event kind to handler.

use dashmap::DashMap;
use semantest_types::error::RepositoryError;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::dispatch::event::{DomainEvent, EventKind};

/// Handles one event and returns the follow-up events it produces.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). An empty
/// return vector means the chain ends without further work.
pub trait EventHandler: Send + Sync {
    fn handle(
        &self,
        event: DomainEvent,
    ) -> impl Future<Output = Result<Vec<DomainEvent>, RepositoryError>> + Send;
}

/// Object-safe version of [`EventHandler`] with boxed futures, so
/// heterogeneous handlers can share one registry.
pub trait EventHandlerDyn: Send + Sync {
    fn handle_boxed(
        &self,
        event: DomainEvent,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainEvent>, RepositoryError>> + Send + '_>>;
}

/// Blanket implementation: any `EventHandler` automatically implements
/// `EventHandlerDyn`.
impl<T: EventHandler> EventHandlerDyn for T {
    fn handle_boxed(
        &self,
        event: DomainEvent,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainEvent>, RepositoryError>> + Send + '_>> {
        Box::pin(self.handle(event))
    }
}

/// `EventKind -> handler` dispatch table.
///
/// Populated at startup by ordinary `register` calls; no runtime metadata
/// or reflection is involved. Registering a kind twice replaces the earlier
/// handler.
pub struct HandlerRegistry {
    handlers: DashMap<EventKind, Arc<dyn EventHandlerDyn>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Route `kind` to `handler`.
    pub fn register<H: EventHandler + 'static>(&self, kind: EventKind, handler: H) {
        self.handlers.insert(kind, Arc::new(handler));
    }

    /// The handler for `kind`, if one is registered.
    pub fn get(&self, kind: EventKind) -> Option<Arc<dyn EventHandlerDyn>> {
        self.handlers.get(&kind).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
