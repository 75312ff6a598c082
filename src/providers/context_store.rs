//! Persisted-credential store interface.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Credential record persisted per installed-app instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContext {
    /// Installed-app instance the record belongs to.
    pub installed_app_id: String,

    /// Location the instance was bound to when stored.
    pub location_id: String,

    /// Persisted access token.
    pub auth_token: String,

    /// Persisted refresh token, if one was issued.
    pub refresh_token: Option<String>,
}

/// External persistence of credentials keyed by installed-app instance.
///
/// Optional collaborator: a context configured without a store degrades to
/// no-ops for retrieval and deletion, never errors.
pub trait ContextStore: Send + Sync {
    /// Fetch the persisted record for an installed-app instance.
    ///
    /// Returns `Ok(None)` when nothing is stored; that is a miss, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContextError::Store`] when the backing store fails.
    fn get<'a>(
        &'a self,
        installed_app_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredContext>>> + Send + 'a>>;

    /// Remove the persisted record for an installed-app instance.
    ///
    /// Removing an absent record is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ContextError::Store`] when the backing store fails.
    fn delete<'a>(
        &'a self,
        installed_app_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
