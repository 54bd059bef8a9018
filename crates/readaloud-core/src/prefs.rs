//! Persisted reader preferences (voice choice, playback parameters,
//! auto-advance) shared by every chapter page.
//!
//! The file-backed store keeps a flat TOML table under the cache directory.
//! Write errors are logged and otherwise ignored to keep playback responsive.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const VOICE_LANGUAGE_KEY: &str = "voice_language";
pub const VOICE_ID_KEY: &str = "voice_id";
pub const RATE_KEY: &str = "rate";
pub const PITCH_KEY: &str = "pitch";
pub const VOLUME_KEY: &str = "volume";
pub const AUTO_NEXT_KEY: &str = "auto_next";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str);

    fn remove(&mut self, key: &str);

    fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key)?.trim().parse().ok()
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.trim().parse().ok()
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Preferences persisted to `<cache_dir>/preferences.toml`.
#[derive(Debug, Clone)]
pub struct TomlPreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl TomlPreferences {
    pub fn open(cache_dir: &Path) -> Self {
        let path = cache_dir.join("preferences.toml");
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|data| match toml::from_str::<BTreeMap<String, String>>(&data) {
                Ok(values) => Some(values),
                Err(err) => {
                    warn!(path = %path.display(), "Ignoring unreadable preferences: {err}");
                    None
                }
            })
            .unwrap_or_default();
        debug!(path = %path.display(), count = values.len(), "Loaded preferences");
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), "Failed to create preferences dir: {err}");
                return;
            }
        }
        match toml::to_string(&self.values) {
            Ok(contents) => {
                if let Err(err) = fs::write(&self.path, contents) {
                    warn!(path = %self.path.display(), "Failed to save preferences: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize preferences: {err}"),
        }
    }
}

impl PreferenceStore for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return;
        }
        self.values.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }
}
