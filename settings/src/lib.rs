#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persisted user preferences for Scream In Space.
//!
//! [`SettingsStore`] owns the live [`Settings`] and mirrors every change into
//! a [`SettingsStorage`] backend. Storage failures never interrupt play: they
//! are logged and the in-memory values stay authoritative.

mod storage;

use scream_in_space_core::{Setting, Settings, Signal};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use storage::{FileStorage, MemoryStorage, SettingsStorage};

/// Key the settings document is stored under.
pub const SETTINGS_KEY: &str = "screaminspace-settings";

/// Errors raised while reading or writing persisted settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The backend could not be read.
    #[error("failed to read stored settings")]
    Read(#[source] std::io::Error),
    /// The backend could not be written.
    #[error("failed to write stored settings")]
    Write(#[source] std::io::Error),
    /// The stored document is not valid JSON.
    #[error("stored settings are not valid JSON")]
    Parse(#[source] serde_json::Error),
    /// The settings could not be encoded.
    #[error("failed to encode settings")]
    Serialize(#[source] serde_json::Error),
}

/// Live settings backed by a persistent storage collaborator.
#[derive(Debug)]
pub struct SettingsStore<S> {
    storage: S,
    settings: Settings,
}

impl<S: SettingsStorage> SettingsStore<S> {
    /// Creates a store holding default settings. Call [`SettingsStore::load`]
    /// to pick up persisted values.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            settings: Settings::default(),
        }
    }

    /// Replaces the live settings with the persisted document merged over
    /// the defaults.
    ///
    /// Missing documents yield the defaults silently; unreadable or corrupt
    /// ones yield the defaults with a warning.
    pub fn load(&mut self) -> &Settings {
        self.settings = match self.read_persisted() {
            Ok(settings) => settings,
            Err(error) => {
                log::warn!("Could not load settings: {error}");
                Settings::default()
            }
        };
        &self.settings
    }

    /// Writes the live settings to storage, reporting whether it succeeded.
    pub fn save(&mut self) -> bool {
        match self.write_persisted() {
            Ok(()) => true,
            Err(error) => {
                log::warn!("Could not save settings: {error}");
                false
            }
        }
    }

    /// Applies a single setting and persists the result immediately.
    ///
    /// Returns [`Signal::QualityChanged`] when the quality tier changed; the
    /// runtime must apply it before the next tick.
    pub fn set(&mut self, setting: Setting) -> Option<Signal> {
        let changed = self.settings.apply(setting);
        let _ = self.save();
        match setting {
            Setting::Quality(tier) if changed => Some(Signal::QualityChanged(tier)),
            _ => None,
        }
    }

    /// Live settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Storage backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_persisted(&self) -> Result<Settings, SettingsError> {
        let Some(raw) = self.storage.read(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };
        let persisted: Value = serde_json::from_str(&raw).map_err(SettingsError::Parse)?;
        Ok(merge(&Settings::default(), &persisted))
    }

    fn write_persisted(&mut self) -> Result<(), SettingsError> {
        let encoded = serde_json::to_string(&self.settings).map_err(SettingsError::Serialize)?;
        self.storage.write(SETTINGS_KEY, &encoded)
    }
}

/// Overlays a persisted document onto `defaults`.
///
/// Only top-level keys are considered. Unknown keys are ignored, and a known
/// key holding a value of the wrong type keeps its default.
#[must_use]
pub fn merge(defaults: &Settings, persisted: &Value) -> Settings {
    let mut merged = *defaults;
    let Some(document) = persisted.as_object() else {
        log::debug!("ignoring settings document that is not an object");
        return merged;
    };

    overlay(document, "sound", &mut merged.sound);
    overlay(document, "crtEffects", &mut merged.crt_effects);
    overlay(document, "reducedMotion", &mut merged.reduced_motion);
    overlay(document, "quality", &mut merged.quality);
    merged
}

fn overlay<T: DeserializeOwned>(document: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = document.get(key) else {
        return;
    };
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => *slot = parsed,
        Err(error) => log::debug!("keeping default for {key}: {error}"),
    }
}
