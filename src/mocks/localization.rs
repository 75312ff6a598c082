//! Mock locale initializer.

use crate::providers::LocaleInitializer;
use std::sync::{Arc, Mutex};

/// Locale initializer that records its activations.
#[derive(Clone, Default)]
pub struct RecordingLocaleInitializer {
    activated: Arc<Mutex<Vec<String>>>,
}

impl RecordingLocaleInitializer {
    /// Create a recorder with no activations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locales activated so far, in call order.
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    #[must_use]
    pub fn activations(&self) -> Vec<String> {
        self.activated.lock().unwrap().clone()
    }
}

impl LocaleInitializer for RecordingLocaleInitializer {
    #[allow(clippy::unwrap_used)] // Test mock: mutex poisoning is a test failure
    fn activate(&self, locale: &str) {
        self.activated.lock().unwrap().push(locale.to_owned());
    }
}
