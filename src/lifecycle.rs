//! Raw lifecycle payload model and shape dispatch.
//!
//! Six inbound payload shapes share no common structure: each lifecycle
//! variant nests the installed-app fields differently and some carry no
//! credentials at all. This module models the raw wire shape with serde,
//! classifies it into an explicit [`Lifecycle`] variant, and flattens it
//! into a [`NormalizedEvent`] with one uniform field set.

use crate::config::ConfigMap;
use crate::error::{ContextError, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle discriminator.
///
/// Classified from the payload's `lifecycle` field, falling back to
/// `messageType`. Anything unrecognized maps to [`Lifecycle::Proactive`]:
/// a permissive default for payloads assembled directly by the caller,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    /// A subscribed event fired for the installed app.
    Event,
    /// The app was installed into a location.
    Install,
    /// The app's settings were updated.
    Update,
    /// The configuration flow is running (no credentials yet).
    Configuration,
    /// The app was removed (no credentials).
    Uninstall,
    /// A scheduled or on-demand execution.
    Execute,
    /// No recognized discriminator; fields are read from the payload root.
    Proactive,
}

impl Lifecycle {
    /// Classify a raw payload by its discriminator.
    #[must_use]
    pub fn classify(payload: &LifecyclePayload) -> Self {
        let discriminator = payload
            .lifecycle
            .as_deref()
            .or(payload.message_type.as_deref());
        match discriminator {
            Some("EVENT") => Self::Event,
            Some("INSTALL") => Self::Install,
            Some("UPDATE") => Self::Update,
            Some("CONFIGURATION") => Self::Configuration,
            Some("UNINSTALL") => Self::Uninstall,
            Some("EXECUTE") => Self::Execute,
            _ => Self::Proactive,
        }
    }
}

/// Raw inbound lifecycle payload.
///
/// Every field is optional; which ones are populated depends on the
/// lifecycle variant. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LifecyclePayload {
    /// Primary discriminator.
    pub lifecycle: Option<String>,

    /// Fallback discriminator.
    pub message_type: Option<String>,

    /// Correlation id for this handling.
    pub execution_id: Option<String>,

    /// Root-level locale hint.
    pub locale: Option<String>,

    /// Root-level credentials (proactive payloads only).
    pub auth_token: Option<String>,

    /// Root-level refresh token (proactive payloads only).
    pub refresh_token: Option<String>,

    /// Root-level installed-app id (proactive payloads only).
    pub installed_app_id: Option<String>,

    /// Root-level location id (proactive payloads only).
    pub location_id: Option<String>,

    /// Root-level config (proactive payloads only).
    pub config: Option<ConfigMap>,

    /// Calling-client details (INSTALL, UPDATE, CONFIGURATION).
    pub client: Option<ClientDetails>,

    /// EVENT variant body.
    pub event_data: Option<EventData>,

    /// INSTALL variant body.
    pub install_data: Option<InstallData>,

    /// UPDATE variant body (same shape as INSTALL).
    pub update_data: Option<InstallData>,

    /// CONFIGURATION variant body.
    pub configuration_data: Option<ConfigurationData>,

    /// UNINSTALL variant body.
    pub uninstall_data: Option<UninstallData>,

    /// EXECUTE variant body.
    pub execute_data: Option<ExecuteData>,
}

/// Details about the client that originated the lifecycle call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientDetails {
    /// Preferred language of the calling client.
    pub language: Option<String>,
}

/// Installed-app instance fields nested inside lifecycle bodies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstalledApp {
    /// Identifier of the installed-app instance.
    pub installed_app_id: String,

    /// Location the instance is bound to.
    pub location_id: String,

    /// Instance configuration.
    pub config: ConfigMap,
}

/// Body of an EVENT payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventData {
    /// Short-lived event token (no refresh token accompanies it).
    pub auth_token: Option<String>,

    /// Installed-app fields.
    pub installed_app: InstalledApp,
}

/// Body of an INSTALL or UPDATE payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstallData {
    /// Access token for the instance.
    pub auth_token: Option<String>,

    /// Refresh token for the instance.
    pub refresh_token: Option<String>,

    /// Installed-app fields.
    pub installed_app: InstalledApp,
}

/// Body of a CONFIGURATION payload.
///
/// Unlike the other variants, the installed-app fields sit directly on the
/// body rather than under an `installedApp` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationData {
    /// Identifier of the installed-app instance.
    pub installed_app_id: String,

    /// Location the instance is bound to.
    pub location_id: String,

    /// Configuration collected so far.
    pub config: ConfigMap,
}

/// Body of an UNINSTALL payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UninstallData {
    /// Installed-app fields.
    pub installed_app: InstalledApp,
}

/// Body of an EXECUTE payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteData {
    /// Short-lived execution token (no refresh token accompanies it).
    pub auth_token: Option<String>,

    /// Installed-app fields.
    pub installed_app: InstalledApp,

    /// Execution parameters.
    pub parameters: ExecuteParameters,
}

/// Parameters of an EXECUTE payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteParameters {
    /// Locale requested for this execution.
    pub locale: Option<String>,
}

/// Credential pair extracted during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Access token. May be empty; an empty token builds no client.
    pub auth_token: String,

    /// Refresh token, when the variant carries one.
    pub refresh_token: Option<String>,
}

/// Uniform field set flattened out of one raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    /// Classified lifecycle variant.
    pub lifecycle: Lifecycle,

    /// Correlation id, empty when absent.
    pub execution_id: String,

    /// Installed-app instance id, empty when absent.
    pub installed_app_id: String,

    /// Location id, empty when absent.
    pub location_id: String,

    /// Resolved locale, per-variant source rules.
    pub locale: Option<String>,

    /// Instance configuration, empty when absent.
    pub config: ConfigMap,

    /// Extracted credentials, absent for credential-less variants.
    pub credentials: Option<Credentials>,
}

/// Decode a raw JSON lifecycle payload.
///
/// # Errors
///
/// Returns [`ContextError::Payload`] when the input is not a JSON object
/// of the expected shape.
pub fn parse_payload(raw: &str) -> Result<LifecyclePayload> {
    serde_json::from_str(raw).map_err(|err| ContextError::Payload {
        message: err.to_string(),
    })
}

fn credentials(auth_token: Option<String>, refresh_token: Option<String>) -> Option<Credentials> {
    auth_token.map(|auth_token| Credentials {
        auth_token,
        refresh_token,
    })
}

/// Flatten a raw payload into its uniform field set.
///
/// Source fields per variant:
///
/// | Variant       | installed-app fields        | locale                              |
/// |---------------|-----------------------------|-------------------------------------|
/// | EVENT         | `eventData.installedApp`    | root `locale`                       |
/// | INSTALL       | `installData.installedApp`  | `client.language`, else root        |
/// | UPDATE        | `updateData.installedApp`   | `client.language`, else root        |
/// | CONFIGURATION | `configurationData.*`       | `client.language`, else root        |
/// | UNINSTALL     | `uninstallData.installedApp`| none                                |
/// | EXECUTE       | `executeData.installedApp`  | `executeData.parameters.locale`     |
/// | proactive     | payload root                | root `locale`                       |
///
/// The `client` block is consumed here and does not survive into the
/// normalized event.
#[must_use]
pub fn normalize(mut payload: LifecyclePayload) -> NormalizedEvent {
    let lifecycle = Lifecycle::classify(&payload);
    let execution_id = payload.execution_id.take().unwrap_or_default();
    let client_language = payload.client.take().and_then(|client| client.language);

    let (app, locale, creds) = match lifecycle {
        Lifecycle::Event => {
            let data = payload.event_data.take().unwrap_or_default();
            let creds = credentials(data.auth_token, None);
            (data.installed_app, payload.locale.take(), creds)
        }
        Lifecycle::Install => {
            let data = payload.install_data.take().unwrap_or_default();
            let creds = credentials(data.auth_token, data.refresh_token);
            let locale = client_language.or_else(|| payload.locale.take());
            (data.installed_app, locale, creds)
        }
        Lifecycle::Update => {
            let data = payload.update_data.take().unwrap_or_default();
            let creds = credentials(data.auth_token, data.refresh_token);
            let locale = client_language.or_else(|| payload.locale.take());
            (data.installed_app, locale, creds)
        }
        Lifecycle::Configuration => {
            let data = payload.configuration_data.take().unwrap_or_default();
            let app = InstalledApp {
                installed_app_id: data.installed_app_id,
                location_id: data.location_id,
                config: data.config,
            };
            let locale = client_language.or_else(|| payload.locale.take());
            (app, locale, None)
        }
        Lifecycle::Uninstall => {
            let data = payload.uninstall_data.take().unwrap_or_default();
            (data.installed_app, None, None)
        }
        Lifecycle::Execute => {
            let data = payload.execute_data.take().unwrap_or_default();
            let creds = credentials(data.auth_token, None);
            (data.installed_app, data.parameters.locale, creds)
        }
        Lifecycle::Proactive => {
            let app = InstalledApp {
                installed_app_id: payload.installed_app_id.take().unwrap_or_default(),
                location_id: payload.location_id.take().unwrap_or_default(),
                config: payload.config.take().unwrap_or_default(),
            };
            let creds = credentials(payload.auth_token.take(), payload.refresh_token.take());
            (app, payload.locale.take(), creds)
        }
    };

    NormalizedEvent {
        lifecycle,
        execution_id,
        installed_app_id: app.installed_app_id,
        location_id: app.location_id,
        locale,
        config: app.config,
        credentials: creds,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classify_falls_back_to_message_type() {
        let payload = LifecyclePayload {
            message_type: Some("EVENT".to_owned()),
            ..LifecyclePayload::default()
        };
        assert_eq!(Lifecycle::classify(&payload), Lifecycle::Event);
    }

    #[test]
    fn lifecycle_field_wins_over_message_type() {
        let payload = LifecyclePayload {
            lifecycle: Some("INSTALL".to_owned()),
            message_type: Some("EVENT".to_owned()),
            ..LifecyclePayload::default()
        };
        assert_eq!(Lifecycle::classify(&payload), Lifecycle::Install);
    }

    #[test]
    fn unknown_discriminator_is_proactive() {
        let payload = LifecyclePayload {
            lifecycle: Some("PING".to_owned()),
            ..LifecyclePayload::default()
        };
        assert_eq!(Lifecycle::classify(&payload), Lifecycle::Proactive);

        assert_eq!(
            Lifecycle::classify(&LifecyclePayload::default()),
            Lifecycle::Proactive
        );
    }

    #[test]
    fn parse_payload_rejects_non_object_json() {
        let err = parse_payload("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, ContextError::Payload { .. }));
    }

    #[test]
    fn parse_payload_ignores_unknown_fields() {
        let payload = parse_payload(r#"{"lifecycle":"UNINSTALL","appId":"x"}"#).unwrap();
        assert_eq!(Lifecycle::classify(&payload), Lifecycle::Uninstall);
    }

    #[test]
    fn normalize_defaults_absent_fields_to_empty() {
        let normalized = normalize(LifecyclePayload {
            lifecycle: Some("INSTALL".to_owned()),
            ..LifecyclePayload::default()
        });
        assert_eq!(normalized.lifecycle, Lifecycle::Install);
        assert_eq!(normalized.installed_app_id, "");
        assert_eq!(normalized.location_id, "");
        assert!(normalized.config.is_empty());
        assert_eq!(normalized.credentials, None);
    }

    #[test]
    fn event_token_has_no_refresh_token() {
        let normalized = normalize(LifecyclePayload {
            lifecycle: Some("EVENT".to_owned()),
            event_data: Some(EventData {
                auth_token: Some("tok".to_owned()),
                installed_app: InstalledApp::default(),
            }),
            ..LifecyclePayload::default()
        });
        let creds = normalized.credentials.unwrap();
        assert_eq!(creds.auth_token, "tok");
        assert_eq!(creds.refresh_token, None);
    }
}
