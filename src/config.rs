//! Typed configuration entries and accessors.
//!
//! Installed-app configuration arrives as a map from config key to an
//! ordered sequence of entries. Each entry is one of a closed set of value
//! kinds, discriminated at the type level. The scalar accessors read the
//! first entry only (single-valued config UI semantics); [`ConfigMap::mode_ids`]
//! is explicitly multi-valued because mode selection supports multiple
//! choices.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Map from config key to the ordered entries bound to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(HashMap<String, Vec<ConfigEntry>>);

/// One typed value bound to a configuration key.
///
/// Within one config key, all entries share the same variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigEntry {
    /// A device selection with its target component.
    #[serde(rename_all = "camelCase")]
    Device {
        /// The selected device and component.
        device_config: DeviceConfig,
    },

    /// A location-mode selection.
    #[serde(rename_all = "camelCase")]
    Mode {
        /// The selected mode.
        mode_config: ModeConfig,
    },

    /// A scalar string value (also carries booleans, numbers, and dates
    /// as strings).
    #[serde(rename_all = "camelCase")]
    String {
        /// The scalar payload.
        string_config: StringConfig,
    },
}

/// Device selection payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    /// Identifier of the selected device.
    pub device_id: String,

    /// Component of the device the entry targets.
    #[serde(default = "default_component")]
    pub component_id: String,
}

fn default_component() -> String {
    "main".to_owned()
}

/// Mode selection payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    /// Identifier of the selected mode.
    pub mode_id: String,
}

/// Scalar string payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringConfig {
    /// The raw string value.
    pub value: String,
}

impl ConfigEntry {
    /// Build a scalar string entry.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String {
            string_config: StringConfig {
                value: value.into(),
            },
        }
    }

    /// Build a mode entry.
    #[must_use]
    pub fn mode(mode_id: impl Into<String>) -> Self {
        Self::Mode {
            mode_config: ModeConfig {
                mode_id: mode_id.into(),
            },
        }
    }

    /// Build a device entry.
    #[must_use]
    pub fn device(device_id: impl Into<String>, component_id: impl Into<String>) -> Self {
        Self::Device {
            device_config: DeviceConfig {
                device_id: device_id.into(),
                component_id: component_id.into(),
            },
        }
    }

    /// The scalar value, if this is a string entry.
    #[must_use]
    pub fn scalar(&self) -> Option<&str> {
        match self {
            Self::String { string_config } => Some(&string_config.value),
            _ => None,
        }
    }

    /// The device payload, if this is a device entry.
    #[must_use]
    pub const fn device_config(&self) -> Option<&DeviceConfig> {
        match self {
            Self::Device { device_config } => Some(device_config),
            _ => None,
        }
    }
}

/// A config date parsed from its scalar entry.
///
/// Unparseable input yields [`ConfigDate::Invalid`] rather than an error;
/// callers must check validity before use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigDate {
    /// Successfully parsed date.
    Valid(DateTime<FixedOffset>),

    /// The stored string did not parse as a date.
    Invalid,
}

impl ConfigDate {
    /// Returns `true` if the date parsed successfully.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The parsed date, if valid.
    #[must_use]
    pub const fn datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Valid(dt) => Some(*dt),
            Self::Invalid => None,
        }
    }

    fn parse(raw: &str) -> Self {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc().fixed_offset())
            })
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc().fixed_offset())
            })
            .map_or(Self::Invalid, Self::Valid)
    }
}

/// Formatting options for [`ConfigMap::time_string`].
///
/// The default renders hour and minute, two-digit, 24-hour clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFormatOptions {
    /// Append seconds to the formatted time.
    pub include_seconds: bool,

    /// Use a 12-hour clock with an AM/PM marker.
    pub twelve_hour: bool,
}

impl TimeFormatOptions {
    const fn pattern(self) -> &'static str {
        match (self.twelve_hour, self.include_seconds) {
            (false, false) => "%H:%M",
            (false, true) => "%H:%M:%S",
            (true, false) => "%I:%M %p",
            (true, true) => "%I:%M:%S %p",
        }
    }
}

impl ConfigMap {
    /// The ordered entries bound to `name`, if the key exists.
    #[must_use]
    pub fn entries(&self, name: &str) -> Option<&[ConfigEntry]> {
        self.0.get(name).map(Vec::as_slice)
    }

    /// Bind `entries` to `name`, replacing any prior binding.
    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<ConfigEntry>) {
        self.0.insert(name.into(), entries);
    }

    /// Number of config keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no keys are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn first_scalar(&self, name: &str) -> Option<&str> {
        self.entries(name)?.first()?.scalar()
    }

    /// First entry's scalar value, or `None` if the key is absent.
    #[must_use]
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.first_scalar(name)
    }

    /// `true` only when the first entry's scalar is exactly `"true"`.
    ///
    /// An absent key is `false`, as is any other stored string.
    #[must_use]
    pub fn boolean_value(&self, name: &str) -> bool {
        self.first_scalar(name) == Some("true")
    }

    /// Numeric coercion of the first entry's scalar.
    ///
    /// `None` if the key is absent; a non-numeric string yields
    /// `Some(f64::NAN)` rather than an error.
    #[must_use]
    pub fn number_value(&self, name: &str) -> Option<f64> {
        self.first_scalar(name)
            .map(|raw| raw.trim().parse().unwrap_or(f64::NAN))
    }

    /// Date parsed from the first entry's scalar.
    ///
    /// `None` if the key is absent; an unparseable string yields
    /// `Some(ConfigDate::Invalid)` rather than an error. Accepts RFC 3339,
    /// `%Y-%m-%dT%H:%M:%S`, and `%Y-%m-%d` (midnight UTC).
    #[must_use]
    pub fn date_value(&self, name: &str) -> Option<ConfigDate> {
        self.first_scalar(name).map(ConfigDate::parse)
    }

    /// Formatted time of the config date under `name`.
    ///
    /// `None` when the key is absent or the stored date is invalid.
    /// `options` defaults to two-digit hour and minute.
    #[must_use]
    pub fn time_string(&self, name: &str, options: Option<TimeFormatOptions>) -> Option<String> {
        let date = self.date_value(name)?.datetime()?;
        let options = options.unwrap_or_default();
        Some(date.format(options.pattern()).to_string())
    }

    /// All mode identifiers under `name`, in original entry order.
    ///
    /// `None` if the key is absent. Multi-valued: every entry contributes,
    /// not just the first.
    #[must_use]
    pub fn mode_ids(&self, name: &str) -> Option<Vec<&str>> {
        let entries = self.entries(name)?;
        Some(
            entries
                .iter()
                .filter_map(|entry| match entry {
                    ConfigEntry::Mode { mode_config } => Some(mode_config.mode_id.as_str()),
                    _ => None,
                })
                .collect(),
        )
    }
}
