//! Durable visitor preferences.
//!
//! The store always writes the complete preference object under a single
//! namespaced key. Reads never fail outward: a missing or corrupt value
//! yields defaults and a log line.

use crate::modality::{LanguageSelection, ModalitySet};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use ts_rs::TS;

/// Caption/text size step, 1 through 4.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum TextSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl TextSize {
    pub fn from_step(step: u8) -> Option<Self> {
        match step {
            1 => Some(TextSize::Small),
            2 => Some(TextSize::Medium),
            3 => Some(TextSize::Large),
            4 => Some(TextSize::ExtraLarge),
            _ => None,
        }
    }

    pub fn step(self) -> u8 {
        match self {
            TextSize::Small => 1,
            TextSize::Medium => 2,
            TextSize::Large => 3,
            TextSize::ExtraLarge => 4,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            TextSize::Small => "text-sm",
            TextSize::Medium => "text-lg",
            TextSize::Large => "text-xl",
            TextSize::ExtraLarge => "text-2xl",
        }
    }

    /// Next step, wrapping from the largest back to the smallest.
    pub fn cycled(self) -> Self {
        match self {
            TextSize::Small => TextSize::Medium,
            TextSize::Medium => TextSize::Large,
            TextSize::Large => TextSize::ExtraLarge,
            TextSize::ExtraLarge => TextSize::Small,
        }
    }
}

impl TryFrom<u8> for TextSize {
    type Error = String;

    fn try_from(step: u8) -> std::result::Result<Self, Self::Error> {
        TextSize::from_step(step).ok_or_else(|| format!("text size must be 1-4, got {step}"))
    }
}

impl From<TextSize> for u8 {
    fn from(size: TextSize) -> Self {
        size.step()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(default)]
#[ts(export)]
pub struct Preferences {
    pub enabled_modalities: ModalitySet,
    pub selected_languages: LanguageSelection,
    #[ts(type = "number")]
    pub text_size: TextSize,
    pub dark_mode: bool,
    pub high_contrast: bool,
}

/// Browser-local key-value storage, or an in-memory stand-in.
pub trait PreferenceStorage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub struct PreferenceStore<S> {
    storage: S,
    key: String,
}

impl<S: PreferenceStorage> PreferenceStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> Preferences {
        self.load_or(Preferences::default())
    }

    /// Load stored preferences, or return `fallback` when nothing usable is
    /// stored.
    pub fn load_or(&self, fallback: Preferences) -> Preferences {
        match self.try_load() {
            Ok(Some(prefs)) => {
                debug!(key = %self.key, "Loaded stored preferences");
                prefs
            }
            Ok(None) => {
                debug!(key = %self.key, "No stored preferences; using defaults");
                fallback
            }
            Err(err) => {
                warn!(key = %self.key, "Falling back to default preferences: {err:#}");
                fallback
            }
        }
    }

    fn try_load(&self) -> Result<Option<Preferences>> {
        let Some(raw) = self.storage.read(&self.key)? else {
            return Ok(None);
        };
        let prefs = serde_json::from_str(&raw).context("Stored preferences are malformed")?;
        Ok(Some(prefs))
    }

    /// Overwrite the stored object. Failures are logged and otherwise
    /// ignored so a full or blocked storage never breaks the widget.
    pub fn save(&mut self, prefs: &Preferences) {
        let result = serde_json::to_string(prefs)
            .context("Failed to serialize preferences")
            .and_then(|json| self.storage.write(&self.key, &json));
        if let Err(err) = result {
            warn!(key = %self.key, "Failed to save preferences: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modality::Modality;

    const KEY: &str = "pivot-widget.preferences.v1";

    struct FailingStorage;

    impl PreferenceStorage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            anyhow::bail!("storage disabled")
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }
    }

    fn customized() -> Preferences {
        let mut prefs = Preferences::default();
        prefs.enabled_modalities.set(Modality::Video, true);
        prefs.enabled_modalities.set(Modality::Text, true);
        prefs.selected_languages.set(Modality::Video, "BSL");
        prefs.selected_languages.set(Modality::Text, "FR");
        prefs.text_size = TextSize::ExtraLarge;
        prefs.dark_mode = true;
        prefs.high_contrast = true;
        prefs
    }

    #[test]
    fn empty_storage_loads_defaults() {
        let store = PreferenceStore::new(MemoryStorage::new(), KEY);
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn saved_preferences_load_back_unchanged() {
        let mut store = PreferenceStore::new(MemoryStorage::new(), KEY);
        for prefs in [Preferences::default(), customized()] {
            store.save(&prefs);
            assert_eq!(store.load(), prefs);
        }
    }

    #[test]
    fn save_overwrites_the_whole_object() {
        let mut store = PreferenceStore::new(MemoryStorage::new(), KEY);
        store.save(&customized());
        store.save(&Preferences::default());

        assert_eq!(store.load(), Preferences::default());
        let raw = store.storage().raw(KEY).expect("stored");
        assert!(raw.contains("\"dark_mode\":false"));
    }

    #[test]
    fn corrupt_storage_falls_back_silently() {
        let mut storage = MemoryStorage::new();
        storage.write(KEY, "{not json").expect("write");
        let store = PreferenceStore::new(storage, KEY);
        assert_eq!(store.load(), Preferences::default());

        let mut storage = MemoryStorage::new();
        storage.write(KEY, r#"{"text_size": 9}"#).expect("write");
        let store = PreferenceStore::new(storage, KEY);
        let fallback = Preferences {
            dark_mode: true,
            ..Preferences::default()
        };
        assert_eq!(store.load_or(fallback.clone()), fallback);
    }

    #[test]
    fn partial_objects_fill_missing_fields() {
        let mut storage = MemoryStorage::new();
        storage
            .write(KEY, r#"{"dark_mode": true, "enabled_modalities": {"audio": true}}"#)
            .expect("write");
        let prefs = PreferenceStore::new(storage, KEY).load();

        assert!(prefs.dark_mode);
        assert!(prefs.enabled_modalities.audio);
        assert!(!prefs.enabled_modalities.video);
        assert_eq!(prefs.text_size, TextSize::Medium);
    }

    #[test]
    fn failing_backend_never_escapes() {
        let mut store = PreferenceStore::new(FailingStorage, KEY);
        store.save(&customized());
        assert_eq!(store.load(), Preferences::default());
    }

    #[test]
    fn text_size_cycles_and_maps_to_classes() {
        assert_eq!(TextSize::ExtraLarge.cycled(), TextSize::Small);
        assert_eq!(TextSize::default().css_class(), "text-lg");
        assert_eq!(TextSize::from_step(0), None);
        assert_eq!(TextSize::from_step(3).map(TextSize::step), Some(3));
    }
}
