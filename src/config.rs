// In: src/config.rs

//! Library-wide configuration.
//!
//! `TabulaConfig` is loaded once at the application boundary (usually from a
//! JSON document) and installed on the current thread. Installing applies the
//! numeric error policy as the thread's ambient `errstate` and makes the
//! display and memory settings visible to the containers.

use crate::error::Result;
use crate::ops::{seterr, ErrState};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;

//==================================================================================
// I. The Unified TabulaConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TabulaConfig {
    /// The floating-point error policy outside of arithmetic dispatch.
    #[serde(default)]
    pub numeric_errors: ErrState,

    /// Whether `DataFrame::memory_usage` counts per-object bytes when the
    /// caller does not say.
    #[serde(default)]
    pub memory_usage_deep: bool,

    /// Rows shown by `Display` before a series is truncated.
    #[serde(default = "default_display_max_items")]
    pub display_max_items: usize,
}

impl Default for TabulaConfig {
    fn default() -> Self {
        Self {
            numeric_errors: ErrState::default(),
            memory_usage_deep: false,
            display_max_items: default_display_max_items(),
        }
    }
}

/// Helper for `serde` to provide a default for `display_max_items`.
fn default_display_max_items() -> usize {
    60
}

//==================================================================================
// II. Loading and Installation
//==================================================================================

thread_local! {
    static ACTIVE: RefCell<TabulaConfig> = RefCell::new(TabulaConfig::default());
}

impl TabulaConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Makes this configuration the active one on the current thread and
    /// returns the configuration it replaces.
    pub fn install(self) -> TabulaConfig {
        seterr(self.numeric_errors);
        log::info!(
            "installing config: numeric_errors={:?}, memory_usage_deep={}, display_max_items={}",
            self.numeric_errors,
            self.memory_usage_deep,
            self.display_max_items
        );
        ACTIVE.with(|active| active.replace(self))
    }

    /// The configuration active on the current thread.
    pub fn current() -> TabulaConfig {
        ACTIVE.with(|active| active.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{geterr, ErrAction};
    use std::io::Write;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"numeric_errors": {"divide": "raise"}}"#;
        let config = TabulaConfig::from_json_str(json).unwrap();
        assert_eq!(config.numeric_errors.divide, ErrAction::Raise);
        assert_eq!(config.numeric_errors.under, ErrAction::Ignore);
        assert_eq!(config.display_max_items, 60);
        assert!(!config.memory_usage_deep);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            TabulaConfig::from_json_str("{not json"),
            Err(crate::error::TabulaError::SerdeJson(_))
        ));
    }

    #[test]
    fn test_install_sets_ambient_policy() {
        let config = TabulaConfig {
            numeric_errors: ErrState::all(ErrAction::Raise),
            memory_usage_deep: true,
            display_max_items: 4,
        };
        let previous = config.clone().install();
        assert_eq!(geterr(), ErrState::all(ErrAction::Raise));
        assert_eq!(TabulaConfig::current(), config);

        previous.install();
        assert_eq!(TabulaConfig::current().display_max_items, 60);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("tabula-config-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{"memory_usage_deep": true}}"#).unwrap();
        let config = TabulaConfig::from_json_file(&path).unwrap();
        assert!(config.memory_usage_deep);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            TabulaConfig::from_json_file(&path),
            Err(crate::error::TabulaError::Io(_))
        ));
    }
}
