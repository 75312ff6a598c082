//! Collaborator interfaces.
//!
//! This module defines traits for the external dependencies this crate
//! consumes. Providers are **interfaces**, not implementations: the context
//! depends on these traits, and the embedding application supplies concrete
//! implementations (HTTP transport, persistence, localization resources).
//!
//! The async traits return `Pin<Box<dyn Future>>` instead of `async fn` so
//! they stay dyn-compatible and can be held as `Arc<dyn Trait>` inside the
//! execution context.

pub mod context_store;
pub mod device_gateway;
pub mod localization;

pub use context_store::{ContextStore, StoredContext};
pub use device_gateway::DeviceGateway;
pub use localization::LocaleInitializer;
