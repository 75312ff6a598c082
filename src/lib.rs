//! # SmartApp Context
//!
//! Normalizes heterogeneous inbound lifecycle-event payloads into one
//! uniform execution context, manages the per-context authentication-token
//! lifecycle, exposes typed configuration accessors, and performs
//! concurrent enrichment lookups for associated device state.
//!
//! ## Architecture
//!
//! External concerns (HTTP transport, credential persistence, localization
//! resources) are consumed through narrow trait interfaces in
//! [`providers`]; the embedding application supplies implementations.
//! Exactly one inbound event is handled per call:
//!
//! ```text
//! raw payload → normalize → ExecutionContext → accessors / enrichment
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use smartapp_context::SmartApp;
//! use std::sync::Arc;
//!
//! let app = SmartApp::new(Arc::new(gateway))
//!     .with_client_credentials("client-id", "client-secret")
//!     .with_context_store(Arc::new(store));
//!
//! let ctx = app.context_from_json(raw_event)?;
//! if ctx.is_authenticated() {
//!     let devices = ctx.config_devices("switches").await?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod app;
pub mod config;
pub mod context;
pub mod devices;
pub mod error;
pub mod lifecycle;
pub mod providers;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use app::{DEFAULT_API_BASE_URL, DEFAULT_REFRESH_BASE_URL, SmartApp};
pub use config::{ConfigDate, ConfigEntry, ConfigMap, TimeFormatOptions};
pub use context::{AuthState, ExecutionContext, RemoteClient};
pub use devices::{DeviceRecord, DeviceRecordWithState, DeviceStatus};
pub use error::{ContextError, Result};
pub use lifecycle::{Lifecycle, LifecyclePayload, NormalizedEvent, normalize, parse_payload};
pub use providers::{ContextStore, DeviceGateway, LocaleInitializer, StoredContext};
