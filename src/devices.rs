//! Device enrichment: concurrent metadata and state lookups.
//!
//! For each device entry under a config key, one metadata lookup is issued;
//! the with-state variant chains one dependent status lookup per device.
//! All per-entry pipelines for a single call start together and the call
//! resolves only once every one of them completes. Result order matches
//! config entry order, not completion order, and any single failure fails
//! the whole call.

use crate::config::ConfigEntry;
use crate::context::RemoteClient;
use crate::error::{ContextError, Result};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Device metadata projection.
///
/// Read-only, derived per call; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceRecord {
    /// Device identifier.
    pub device_id: String,

    /// Internal device name.
    pub name: String,

    /// User-visible label.
    pub label: String,

    /// Component the originating config entry selected. Tagged by the
    /// aggregator after fetch; transports leave it unset.
    pub component_id: Option<String>,
}

/// Full component status of a device, keyed by component id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatus {
    /// Capability state per component.
    pub components: HashMap<String, Value>,
}

/// Device metadata plus the state of its selected component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecordWithState {
    /// Device metadata, tagged with the selected component.
    #[serde(flatten)]
    pub device: DeviceRecord,

    /// State of the selected component, if the status reported it.
    pub state: Option<Value>,
}

pub(crate) async fn fetch_devices(
    client: &RemoteClient,
    entries: &[ConfigEntry],
) -> Result<Vec<DeviceRecord>> {
    let lookups = entries
        .iter()
        .filter_map(ConfigEntry::device_config)
        .map(|selection| async move {
            let mut device = client
                .gateway()
                .get_device(client.auth_token(), &selection.device_id)
                .await?;
            device.component_id = Some(selection.component_id.clone());
            Ok::<_, ContextError>(device)
        });
    try_join_all(lookups).await
}

pub(crate) async fn fetch_devices_with_state(
    client: &RemoteClient,
    entries: &[ConfigEntry],
) -> Result<Vec<DeviceRecordWithState>> {
    let lookups = entries
        .iter()
        .filter_map(ConfigEntry::device_config)
        .map(|selection| async move {
            // State lookup starts only after this device's metadata resolves;
            // pipelines for different devices still run concurrently.
            let mut device = client
                .gateway()
                .get_device(client.auth_token(), &selection.device_id)
                .await?;
            device.component_id = Some(selection.component_id.clone());
            let status = client
                .gateway()
                .get_device_status(client.auth_token(), &selection.device_id)
                .await?;
            let state = status.components.get(&selection.component_id).cloned();
            Ok::<_, ContextError>(DeviceRecordWithState { device, state })
        });
    try_join_all(lookups).await
}
