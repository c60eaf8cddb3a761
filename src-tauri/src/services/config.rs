//! Pet settings and their JSON persistence.
//!
//! The file is a flat JSON object. Reading never fails: a missing or broken
//! file behaves like an empty object and the defaults fill the gaps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::PetError;

/// Flat key-value view of the settings file.
pub type SettingsMap = Map<String, Value>;

pub const KEY_PET_NAME: &str = "pet_name";
pub const KEY_PET_IMAGE: &str = "pet_image";
pub const KEY_MODEL: &str = "model";
pub const KEY_API_URL: &str = "api_url";
pub const KEY_API_KEY: &str = "api_key";

pub const DEFAULT_PET_NAME: &str = "gmds";
pub const DEFAULT_PET_IMAGE: &str = "assets/images/idle/default.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub pet_name: String,
    pub pet_image: String,
    pub model: String,
    pub api_url: String,
    pub api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pet_name: DEFAULT_PET_NAME.to_string(),
            pet_image: DEFAULT_PET_IMAGE.to_string(),
            model: String::new(),
            api_url: String::new(),
            api_key: String::new(),
        }
    }
}

impl Settings {
    pub fn to_map(&self) -> SettingsMap {
        let mut map = SettingsMap::new();
        map.insert(KEY_PET_NAME.into(), Value::String(self.pet_name.clone()));
        map.insert(KEY_PET_IMAGE.into(), Value::String(self.pet_image.clone()));
        map.insert(KEY_MODEL.into(), Value::String(self.model.clone()));
        map.insert(KEY_API_URL.into(), Value::String(self.api_url.clone()));
        map.insert(KEY_API_KEY.into(), Value::String(self.api_key.clone()));
        map
    }

    /// Build settings from a map, falling back to the defaults for missing or
    /// non-string entries.
    pub fn from_map(map: &SettingsMap) -> Self {
        let defaults = Self::default();
        let text = |key: &str, fallback: String| {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        Self {
            pet_name: text(KEY_PET_NAME, defaults.pet_name),
            pet_image: text(KEY_PET_IMAGE, defaults.pet_image),
            model: text(KEY_MODEL, defaults.model),
            api_url: text(KEY_API_URL, defaults.api_url),
            api_key: text(KEY_API_KEY, defaults.api_key),
        }
    }
}

/// Apply `defaults`, then override with every key present in `loaded`.
pub fn merge(defaults: &SettingsMap, loaded: &SettingsMap) -> SettingsMap {
    let mut merged = defaults.clone();
    for (key, value) in loaded {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Reads and writes the settings file at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> SettingsMap {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return SettingsMap::new();
        };
        match serde_json::from_str::<SettingsMap>(&contents) {
            Ok(map) => map,
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable settings file {}: {}",
                    self.path.display(),
                    err
                );
                SettingsMap::new()
            }
        }
    }

    /// Overwrite the file with `settings`, creating the parent directory.
    ///
    /// Not atomic: a crash mid-write can leave a truncated file, which the next
    /// `load` treats as empty.
    pub fn save(&self, settings: &SettingsMap) -> Result<(), PetError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// Defaults merged with whatever the file provides.
    pub fn load_settings(&self) -> Settings {
        let merged = merge(&Settings::default().to_map(), &self.load());
        Settings::from_map(&merged)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), PetError> {
        self.save(&settings.to_map())
    }
}

/// Managed settings: the store plus the values currently in effect.
pub struct SettingsState {
    store: ConfigStore,
    current: Mutex<Settings>,
}

impl SettingsState {
    pub fn load(store: ConfigStore) -> Self {
        let current = store.load_settings();
        log::info!(
            "Settings loaded from {} (pet_name={}, model={})",
            store.path().display(),
            current.pet_name,
            current.model
        );
        Self {
            store,
            current: Mutex::new(current),
        }
    }

    pub fn snapshot(&self) -> Result<Settings, PetError> {
        self.current
            .lock()
            .map(|s| s.clone())
            .map_err(|_| PetError::internal("Settings lock poisoned"))
    }

    /// Persist `next`, then make it current. On a write failure the previous
    /// values stay in effect.
    pub fn replace(&self, next: Settings) -> Result<(), PetError> {
        self.store.save_settings(&next)?;
        let mut current = self
            .current
            .lock()
            .map_err(|_| PetError::internal("Settings lock poisoned"))?;
        *current = next;
        Ok(())
    }
}
