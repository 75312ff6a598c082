//! Mock context store.

use crate::error::Result;
use crate::providers::{ContextStore, StoredContext};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// In-memory context store.
///
/// Stores credential records in plain text. Testing only.
#[derive(Clone, Default)]
pub struct InMemoryContextStore {
    records: Arc<Mutex<HashMap<String, StoredContext>>>,
    deleted: Arc<Mutex<Vec<String>>>,
}

impl InMemoryContextStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, keyed by its `installed_app_id`.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    pub fn put(&self, record: StoredContext) {
        let mut records = self.records.lock().unwrap();
        records.insert(record.installed_app_id.clone(), record);
    }

    /// Installed-app ids passed to `delete`, in call order.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl ContextStore for InMemoryContextStore {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn get<'a>(
        &'a self,
        installed_app_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<StoredContext>>> + Send + 'a>> {
        Box::pin(async move {
            let records = self.records.lock().unwrap();
            Ok(records.get(installed_app_id).cloned())
        })
    }

    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn delete<'a>(
        &'a self,
        installed_app_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.records.lock().unwrap().remove(installed_app_id);
            self.deleted
                .lock()
                .unwrap()
                .push(installed_app_id.to_owned());
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = InMemoryContextStore::new();
        store.put(StoredContext {
            installed_app_id: "app-1".to_owned(),
            location_id: "loc-1".to_owned(),
            auth_token: "tok".to_owned(),
            refresh_token: None,
        });

        let hit = store.get("app-1").await.unwrap();
        assert_eq!(hit.unwrap().auth_token, "tok");
        assert_eq!(store.get("app-2").await.unwrap(), None);

        store.delete("app-1").await.unwrap();
        assert_eq!(store.get("app-1").await.unwrap(), None);
        assert_eq!(store.deleted(), vec!["app-1".to_owned()]);
    }
}
