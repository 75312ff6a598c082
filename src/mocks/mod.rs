//! Mock collaborators for testing.
//!
//! In-memory implementations of the provider traits, shipped behind the
//! default `test-utils` feature so embedding applications can test their
//! handlers without a live API or store.

pub mod context_store;
pub mod device_gateway;
pub mod localization;

pub use context_store::InMemoryContextStore;
pub use device_gateway::MockDeviceGateway;
pub use localization::RecordingLocaleInitializer;
