//! Device enrichment aggregation: fan-out concurrency, config-order
//! results, and all-or-nothing failure.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use smartapp_context::mocks::MockDeviceGateway;
use smartapp_context::{
    ContextError, DeviceRecord, DeviceStatus, ExecutionContext, SmartApp,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn record(device_id: &str, label: &str) -> DeviceRecord {
    DeviceRecord {
        device_id: device_id.to_owned(),
        name: format!("{label}-name"),
        label: label.to_owned(),
        component_id: None,
    }
}

fn status(components: &[(&str, serde_json::Value)]) -> DeviceStatus {
    DeviceStatus {
        components: components
            .iter()
            .map(|(id, state)| ((*id).to_owned(), state.clone()))
            .collect::<HashMap<_, _>>(),
    }
}

fn gateway_with_two_devices() -> MockDeviceGateway {
    let gateway = MockDeviceGateway::new();
    gateway.add_device(
        record("dev-1", "lamp"),
        status(&[("main", json!({ "switch": "on" }))]),
    );
    gateway.add_device(
        record("dev-2", "plug"),
        status(&[("outlet", json!({ "switch": "off" }))]),
    );
    gateway
}

fn two_switch_context(gateway: &MockDeviceGateway) -> ExecutionContext {
    let app = SmartApp::new(Arc::new(gateway.clone()));
    let payload = serde_json::from_value(json!({
        "lifecycle": "INSTALL",
        "installData": {
            "authToken": "tok",
            "installedApp": {
                "installedAppId": "app-1",
                "locationId": "loc-1",
                "config": {
                    "switches": [
                        { "deviceConfig": { "deviceId": "dev-1", "componentId": "main" } },
                        { "deviceConfig": { "deviceId": "dev-2", "componentId": "outlet" } }
                    ]
                }
            }
        }
    }))
    .unwrap();
    app.build_context(payload)
}

#[tokio::test(start_paused = true)]
async fn lookups_fan_out_instead_of_serializing() {
    let gateway = gateway_with_two_devices();
    // A slow first lookup must not delay the start of the second
    gateway.delay_device("dev-1", Duration::from_millis(50));
    gateway.delay_device("dev-2", Duration::from_millis(10));
    let ctx = two_switch_context(&gateway);

    let begin = Instant::now();
    let devices = ctx.config_devices("switches").await.unwrap().unwrap();
    let elapsed = begin.elapsed();

    // Concurrent: max(50, 10), not 50 + 10
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(60), "lookups ran serially");
    assert_eq!(devices.len(), 2);
    assert_eq!(gateway.started(), vec!["dev-1".to_owned(), "dev-2".to_owned()]);
}

#[tokio::test(start_paused = true)]
async fn results_keep_config_order_even_when_completion_order_differs() {
    let gateway = gateway_with_two_devices();
    // First entry resolves last
    gateway.delay_device("dev-1", Duration::from_millis(80));
    let ctx = two_switch_context(&gateway);

    let devices = ctx.config_devices("switches").await.unwrap().unwrap();

    assert_eq!(devices[0].device_id, "dev-1");
    assert_eq!(devices[0].component_id.as_deref(), Some("main"));
    assert_eq!(devices[1].device_id, "dev-2");
    assert_eq!(devices[1].component_id.as_deref(), Some("outlet"));
}

#[tokio::test]
async fn absent_key_is_none_not_an_error() {
    let gateway = gateway_with_two_devices();
    let ctx = two_switch_context(&gateway);

    assert_eq!(ctx.config_devices("unknown").await.unwrap(), None);
    assert_eq!(ctx.config_devices_with_state("unknown").await.unwrap(), None);
}

#[tokio::test]
async fn unauthenticated_context_cannot_enrich() {
    let gateway = gateway_with_two_devices();
    let app = SmartApp::new(Arc::new(gateway));
    let payload = serde_json::from_value(json!({
        "lifecycle": "CONFIGURATION",
        "configurationData": {
            "installedAppId": "app-1",
            "config": {
                "switches": [ { "deviceConfig": { "deviceId": "dev-1" } } ]
            }
        }
    }))
    .unwrap();
    let ctx = app.build_context(payload);

    let err = ctx.config_devices("switches").await.unwrap_err();
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn one_failed_metadata_lookup_fails_the_whole_call() {
    let gateway = gateway_with_two_devices();
    gateway.fail_device("dev-2");
    let ctx = two_switch_context(&gateway);

    let err = ctx.config_devices("switches").await.unwrap_err();
    assert!(matches!(err, ContextError::Device { device_id, .. } if device_id == "dev-2"));
}

#[tokio::test]
async fn with_state_extracts_the_selected_component() {
    let gateway = gateway_with_two_devices();
    let ctx = two_switch_context(&gateway);

    let devices = ctx
        .config_devices_with_state("switches")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].device.device_id, "dev-1");
    assert_eq!(devices[0].state, Some(json!({ "switch": "on" })));
    assert_eq!(devices[1].device.device_id, "dev-2");
    assert_eq!(devices[1].state, Some(json!({ "switch": "off" })));
}

#[tokio::test]
async fn with_state_is_none_for_unreported_components() {
    let gateway = MockDeviceGateway::new();
    gateway.add_device(record("dev-1", "lamp"), status(&[]));
    let app = SmartApp::new(Arc::new(gateway));
    let payload = serde_json::from_value(json!({
        "lifecycle": "INSTALL",
        "installData": {
            "authToken": "tok",
            "installedApp": {
                "installedAppId": "app-1",
                "config": {
                    "switches": [ { "deviceConfig": { "deviceId": "dev-1" } } ]
                }
            }
        }
    }))
    .unwrap();
    let ctx = app.build_context(payload);

    let devices = ctx
        .config_devices_with_state("switches")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(devices[0].state, None);
}

#[tokio::test]
async fn one_failed_state_lookup_fails_the_whole_call() {
    let gateway = gateway_with_two_devices();
    gateway.fail_status("dev-2");
    let ctx = two_switch_context(&gateway);

    let err = ctx.config_devices_with_state("switches").await.unwrap_err();
    assert!(matches!(err, ContextError::Device { device_id, .. } if device_id == "dev-2"));
    // Metadata for both devices still resolved before the failure surfaced
    assert_eq!(gateway.started().len(), 2);
}

#[tokio::test]
async fn non_device_entries_are_skipped() {
    let gateway = gateway_with_two_devices();
    let app = SmartApp::new(Arc::new(gateway));
    let payload = serde_json::from_value(json!({
        "lifecycle": "INSTALL",
        "installData": {
            "authToken": "tok",
            "installedApp": {
                "installedAppId": "app-1",
                "config": {
                    "modes": [ { "modeConfig": { "modeId": "home" } } ]
                }
            }
        }
    }))
    .unwrap();
    let ctx = app.build_context(payload);

    let devices = ctx.config_devices("modes").await.unwrap().unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn enrichment_uses_the_current_client_token() {
    let gateway = gateway_with_two_devices();
    let ctx = two_switch_context(&gateway);

    ctx.config_devices("switches").await.unwrap();

    assert!(gateway.seen_tokens().iter().all(|token| token == "tok"));
}
