//! Mock device gateway.

use crate::devices::{DeviceRecord, DeviceStatus};
use crate::error::{ContextError, Result};
use crate::providers::DeviceGateway;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory device gateway with latency and failure injection.
///
/// Records the start order of metadata lookups and every auth token it was
/// handed, so tests can assert fan-out concurrency and which credentials a
/// rebuilt client used.
#[derive(Clone, Default)]
pub struct MockDeviceGateway {
    devices: Arc<Mutex<HashMap<String, DeviceRecord>>>,
    statuses: Arc<Mutex<HashMap<String, DeviceStatus>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    failing_devices: Arc<Mutex<HashSet<String>>>,
    failing_statuses: Arc<Mutex<HashSet<String>>>,
    started: Arc<Mutex<Vec<String>>>,
    seen_tokens: Arc<Mutex<Vec<String>>>,
}

impl MockDeviceGateway {
    /// Create an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device and its status.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn add_device(&self, record: DeviceRecord, status: DeviceStatus) {
        let device_id = record.device_id.clone();
        self.devices.lock().unwrap().insert(device_id.clone(), record);
        self.statuses.lock().unwrap().insert(device_id, status);
    }

    /// Delay the metadata lookup for one device.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn delay_device(&self, device_id: impl Into<String>, delay: Duration) {
        self.delays.lock().unwrap().insert(device_id.into(), delay);
    }

    /// Make the metadata lookup for one device fail.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn fail_device(&self, device_id: impl Into<String>) {
        self.failing_devices.lock().unwrap().insert(device_id.into());
    }

    /// Make the status lookup for one device fail.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn fail_status(&self, device_id: impl Into<String>) {
        self.failing_statuses.lock().unwrap().insert(device_id.into());
    }

    /// Device ids in metadata-lookup start order.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    /// Auth tokens handed to the gateway, in call order.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn delay_for(&self, device_id: &str) -> Option<Duration> {
        self.delays.lock().unwrap().get(device_id).copied()
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn record_start(&self, auth_token: &str, device_id: &str) {
        self.started.lock().unwrap().push(device_id.to_owned());
        self.seen_tokens.lock().unwrap().push(auth_token.to_owned());
    }
}

impl DeviceGateway for MockDeviceGateway {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn get_device<'a>(
        &'a self,
        auth_token: &'a str,
        device_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceRecord>> + Send + 'a>> {
        Box::pin(async move {
            self.record_start(auth_token, device_id);
            if let Some(delay) = self.delay_for(device_id) {
                tokio::time::sleep(delay).await;
            }
            if self.failing_devices.lock().unwrap().contains(device_id) {
                return Err(ContextError::Device {
                    device_id: device_id.to_owned(),
                    message: "injected metadata failure".to_owned(),
                });
            }
            self.devices
                .lock()
                .unwrap()
                .get(device_id)
                .cloned()
                .ok_or_else(|| ContextError::Device {
                    device_id: device_id.to_owned(),
                    message: "unknown device".to_owned(),
                })
        })
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn get_device_status<'a>(
        &'a self,
        _auth_token: &'a str,
        device_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<DeviceStatus>> + Send + 'a>> {
        Box::pin(async move {
            if self.failing_statuses.lock().unwrap().contains(device_id) {
                return Err(ContextError::Device {
                    device_id: device_id.to_owned(),
                    message: "injected status failure".to_owned(),
                });
            }
            self.statuses
                .lock()
                .unwrap()
                .get(device_id)
                .cloned()
                .ok_or_else(|| ContextError::Device {
                    device_id: device_id.to_owned(),
                    message: "no status for device".to_owned(),
                })
        })
    }
}
