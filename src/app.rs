//! App settings and the context entry point.
//!
//! A [`SmartApp`] holds the static settings shared by every inbound event:
//! OAuth client credentials, base URLs, the localization flag, and the
//! collaborator handles. [`SmartApp::build_context`] is the single entry
//! point: one raw lifecycle payload in, one ready-to-use
//! [`ExecutionContext`] out.

use crate::context::{ClientSettings, ExecutionContext, RemoteClient};
use crate::error::Result;
use crate::lifecycle::{self, LifecyclePayload};
use crate::providers::{ContextStore, DeviceGateway, LocaleInitializer};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Default base URL for API calls.
pub const DEFAULT_API_BASE_URL: &str = "https://api.smartthings.com";

/// Default base URL for token refresh.
pub const DEFAULT_REFRESH_BASE_URL: &str = "https://auth-global.api.smartthings.com/oauth/token";

/// Static settings for one application, shared across all inbound events.
pub struct SmartApp {
    settings: ClientSettings,
    localization_enabled: bool,
    context_store: Option<Arc<dyn ContextStore>>,
    locale_initializer: Option<Arc<dyn LocaleInitializer>>,
    mutex: Arc<Mutex<()>>,
}

impl SmartApp {
    /// Create an app with default base URLs and no optional collaborators.
    #[must_use]
    pub fn new(gateway: Arc<dyn DeviceGateway>) -> Self {
        Self {
            settings: ClientSettings {
                client_id: None,
                client_secret: None,
                api_base_url: DEFAULT_API_BASE_URL.to_owned(),
                refresh_base_url: DEFAULT_REFRESH_BASE_URL.to_owned(),
                gateway,
            },
            localization_enabled: false,
            context_store: None,
            locale_initializer: None,
            mutex: Arc::new(Mutex::new(())),
        }
    }

    /// Set the OAuth client credentials used by rebuilt clients.
    #[must_use]
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.settings.client_id = Some(client_id.into());
        self.settings.client_secret = Some(client_secret.into());
        self
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.api_base_url = url.into();
        self
    }

    /// Override the token-refresh base URL.
    #[must_use]
    pub fn with_refresh_base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.refresh_base_url = url.into();
        self
    }

    /// Configure credential persistence.
    #[must_use]
    pub fn with_context_store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.context_store = Some(store);
        self
    }

    /// Enable localization, activating `initializer` whenever a lifecycle
    /// resolves a locale.
    #[must_use]
    pub fn with_localization(mut self, initializer: Arc<dyn LocaleInitializer>) -> Self {
        self.localization_enabled = true;
        self.locale_initializer = Some(initializer);
        self
    }

    /// Build the execution context for one raw lifecycle payload.
    ///
    /// Normalizes the payload shape, constructs the remote client when the
    /// extracted token is non-empty, and applies the localization side
    /// effect when enabled and a locale resolved.
    #[must_use]
    pub fn build_context(&self, payload: LifecyclePayload) -> ExecutionContext {
        let normalized = lifecycle::normalize(payload);
        debug!(
            lifecycle = ?normalized.lifecycle,
            installed_app_id = %normalized.installed_app_id,
            "normalized lifecycle payload"
        );

        let client = normalized
            .credentials
            .filter(|creds| !creds.auth_token.is_empty())
            .map(|creds| {
                RemoteClient::new(
                    &self.settings,
                    creds,
                    normalized.installed_app_id.clone(),
                    normalized.location_id.clone(),
                    Arc::clone(&self.mutex),
                )
            });

        let accept_language = if self.localization_enabled {
            normalized.locale.clone()
        } else {
            None
        };
        if let (Some(locale), Some(initializer)) =
            (accept_language.as_deref(), self.locale_initializer.as_ref())
        {
            initializer.activate(locale);
        }

        ExecutionContext::new(
            normalized.lifecycle,
            normalized.execution_id,
            normalized.installed_app_id,
            normalized.location_id,
            normalized.locale,
            accept_language,
            normalized.config,
            client,
            self.context_store.clone(),
            self.settings.clone(),
        )
    }

    /// Decode a raw JSON payload and build its execution context.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContextError::Payload`] when the JSON does not
    /// decode as a lifecycle payload.
    pub fn context_from_json(&self, raw: &str) -> Result<ExecutionContext> {
        let payload = lifecycle::parse_payload(raw)?;
        Ok(self.build_context(payload))
    }
}
