//! Execution context and remote-client/token lifecycle.
//!
//! One [`ExecutionContext`] exists per inbound event. Identity fields are
//! set once at normalization; `location_id` and the remote client are the
//! only mutable parts. The client is lazily constructed when credentials
//! are known, and replaced (not mutated) when credentials become known
//! later; replacement reuses the prior client's mutex handle so refresh
//! attempts stay serialized across the swap.

use crate::config::ConfigMap;
use crate::devices::{self, DeviceRecord, DeviceRecordWithState};
use crate::error::{ContextError, Result};
use crate::lifecycle::{Credentials, Lifecycle};
use crate::providers::{ContextStore, DeviceGateway};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Static client-construction settings shared by all contexts of one app.
#[derive(Clone)]
pub(crate) struct ClientSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub refresh_base_url: String,
    pub gateway: Arc<dyn DeviceGateway>,
}

/// Credential material plus the handle to the refresh-serializing mutex.
#[derive(Clone)]
pub struct AuthState {
    auth_token: String,
    refresh_token: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    mutex: Arc<Mutex<()>>,
}

impl AuthState {
    /// Current access token.
    #[must_use]
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Refresh token, when one was issued.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// OAuth client id reference, when configured.
    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// OAuth client secret reference, when configured.
    #[must_use]
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }
}

/// Remote API client scoped to one installed-app instance's credentials.
///
/// At most one exists per context at a time. Rebuilding (after token
/// retrieval) replaces the whole instance; the mutex is shared, not
/// recreated, across the replacement.
#[derive(Clone)]
pub struct RemoteClient {
    auth: AuthState,
    installed_app_id: String,
    location_id: String,
    api_base_url: String,
    refresh_base_url: String,
    gateway: Arc<dyn DeviceGateway>,
}

impl RemoteClient {
    pub(crate) fn new(
        settings: &ClientSettings,
        credentials: Credentials,
        installed_app_id: String,
        location_id: String,
        mutex: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            auth: AuthState {
                auth_token: credentials.auth_token,
                refresh_token: credentials.refresh_token,
                client_id: settings.client_id.clone(),
                client_secret: settings.client_secret.clone(),
                mutex,
            },
            installed_app_id,
            location_id,
            api_base_url: settings.api_base_url.clone(),
            refresh_base_url: settings.refresh_base_url.clone(),
            gateway: Arc::clone(&settings.gateway),
        }
    }

    /// Current access token. Inspectable so callers can detect refreshes.
    #[must_use]
    pub fn auth_token(&self) -> &str {
        self.auth.auth_token()
    }

    /// Full auth state.
    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Installed-app instance the client is scoped to.
    #[must_use]
    pub fn installed_app_id(&self) -> &str {
        &self.installed_app_id
    }

    /// Location id carried by the client. Kept equal to the owning
    /// context's `location_id` at all times.
    #[must_use]
    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    /// Base URL for API calls.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Base URL for token refresh.
    #[must_use]
    pub fn refresh_base_url(&self) -> &str {
        &self.refresh_base_url
    }

    /// Handle to the mutex serializing refresh and rebuild. Shared across
    /// client replacement.
    #[must_use]
    pub fn mutex_handle(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.auth.mutex)
    }

    pub(crate) fn gateway(&self) -> &dyn DeviceGateway {
        self.gateway.as_ref()
    }
}

/// Uniform execution context for one inbound lifecycle event.
pub struct ExecutionContext {
    /// Lifecycle variant that produced this context.
    pub lifecycle: Lifecycle,

    /// Correlation id of the inbound event, empty when absent.
    pub execution_id: String,

    /// Installed-app instance id, empty when absent.
    pub installed_app_id: String,

    /// Resolved locale, per-variant source rules.
    pub locale: Option<String>,

    /// `accept-language` value recorded when localization applied.
    pub accept_language: Option<String>,

    /// Instance configuration.
    pub config: ConfigMap,

    location_id: String,
    client: Option<RemoteClient>,
    store: Option<Arc<dyn ContextStore>>,
    settings: ClientSettings,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("lifecycle", &self.lifecycle)
            .field("execution_id", &self.execution_id)
            .field("installed_app_id", &self.installed_app_id)
            .field("locale", &self.locale)
            .field("accept_language", &self.accept_language)
            .field("config", &self.config)
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

impl ExecutionContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        lifecycle: Lifecycle,
        execution_id: String,
        installed_app_id: String,
        location_id: String,
        locale: Option<String>,
        accept_language: Option<String>,
        config: ConfigMap,
        client: Option<RemoteClient>,
        store: Option<Arc<dyn ContextStore>>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            lifecycle,
            execution_id,
            installed_app_id,
            locale,
            accept_language,
            config,
            location_id,
            client,
            store,
            settings,
        }
    }

    /// Location the installed-app instance is bound to.
    #[must_use]
    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    /// The remote client, when credentials were known at build time or
    /// retrieved since.
    #[must_use]
    pub const fn client(&self) -> Option<&RemoteClient> {
        self.client.as_ref()
    }

    /// `true` iff a remote client exists with a non-empty token.
    ///
    /// An unauthenticated context is a normal state (UNINSTALL and
    /// CONFIGURATION lifecycles carry no credentials), not an error.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.client
            .as_ref()
            .is_some_and(|client| !client.auth_token().is_empty())
    }

    /// Update the context's location id and, when a remote client exists,
    /// propagate the same value into it. The two copies never diverge.
    pub fn set_location_id(&mut self, location_id: impl Into<String>) {
        let location_id = location_id.into();
        if let Some(client) = self.client.as_mut() {
            client.location_id.clone_from(&location_id);
        }
        self.location_id = location_id;
    }

    /// Fetch persisted credentials for this installed-app instance and
    /// rebuild the remote client from them.
    ///
    /// No configured store, or a store miss, leaves the context unchanged;
    /// the call is idempotent. On a hit the persisted `location_id`
    /// overwrites the context's, and the rebuilt client reuses the
    /// existing mutex handle when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Store`] when the store collaborator fails.
    pub async fn retrieve_tokens(&mut self) -> Result<()> {
        let Some(store) = self.store.clone() else {
            return Ok(());
        };
        let Some(stored) = store.get(&self.installed_app_id).await? else {
            trace!(
                installed_app_id = %self.installed_app_id,
                "no persisted credentials"
            );
            return Ok(());
        };

        let mutex = self
            .client
            .as_ref()
            .map_or_else(|| Arc::new(Mutex::new(())), RemoteClient::mutex_handle);
        {
            // Token swap is serialized with any in-flight refresh.
            let _guard = mutex.lock().await;
            self.location_id.clone_from(&stored.location_id);
            self.client = Some(RemoteClient::new(
                &self.settings,
                Credentials {
                    auth_token: stored.auth_token,
                    refresh_token: stored.refresh_token,
                },
                self.installed_app_id.clone(),
                stored.location_id,
                Arc::clone(&mutex),
            ));
        }
        debug!(
            installed_app_id = %self.installed_app_id,
            "restored persisted credentials"
        );
        Ok(())
    }

    /// Remove the persisted credential record for this installed-app
    /// instance. No-op when no store is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Store`] when the store collaborator fails.
    pub async fn delete_context(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.delete(&self.installed_app_id).await,
            None => Ok(()),
        }
    }

    /// Device metadata for every device entry under `name`.
    ///
    /// `Ok(None)` when the key is absent. Lookups fan out concurrently and
    /// results come back in config entry order; one failure fails the
    /// whole call.
    ///
    /// # Errors
    ///
    /// [`ContextError::Unauthenticated`] when no remote client exists;
    /// [`ContextError::Device`] when any lookup fails.
    pub async fn config_devices(&self, name: &str) -> Result<Option<Vec<DeviceRecord>>> {
        let Some(entries) = self.config.entries(name) else {
            return Ok(None);
        };
        let client = self.client.as_ref().ok_or(ContextError::Unauthenticated)?;
        devices::fetch_devices(client, entries).await.map(Some)
    }

    /// Device metadata plus selected-component state for every device
    /// entry under `name`.
    ///
    /// Same aggregation contract as [`Self::config_devices`]; each
    /// device's state lookup starts only after its metadata resolves.
    ///
    /// # Errors
    ///
    /// [`ContextError::Unauthenticated`] when no remote client exists;
    /// [`ContextError::Device`] when any lookup fails.
    pub async fn config_devices_with_state(
        &self,
        name: &str,
    ) -> Result<Option<Vec<DeviceRecordWithState>>> {
        let Some(entries) = self.config.entries(name) else {
            return Ok(None);
        };
        let client = self.client.as_ref().ok_or(ContextError::Unauthenticated)?;
        devices::fetch_devices_with_state(client, entries)
            .await
            .map(Some)
    }
}
