//! Localization resource initializer interface.

/// Activates locale-based string and formatting resources for the current
/// context.
///
/// Invoked at most once per normalization, and only when the owning app
/// enables localization and the lifecycle resolved a locale.
pub trait LocaleInitializer: Send + Sync {
    /// Activate resources for `locale`.
    fn activate(&self, locale: &str);
}
