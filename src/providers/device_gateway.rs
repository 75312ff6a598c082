//! Device API transport interface.

use crate::devices::{DeviceRecord, DeviceStatus};
use crate::error::Result;
use std::future::Future;
use std::pin::Pin;

/// Transport for device metadata and state lookups.
///
/// Implementations own the HTTP mechanics, including any retry or token
/// refresh they perform internally. This crate issues lookups and
/// propagates rejections opaquely; it never retries here.
pub trait DeviceGateway: Send + Sync {
    /// Fetch device metadata by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContextError::Device`] when the lookup fails.
    fn get_device<'a>(
        &'a self,
        auth_token: &'a str,
        device_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceRecord>> + Send + 'a>>;

    /// Fetch the full component status of a device by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContextError::Device`] when the lookup fails.
    fn get_device_status<'a>(
        &'a self,
        auth_token: &'a str,
        device_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceStatus>> + Send + 'a>>;
}
