use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Settings;
use crate::error::{Result, SettingsError};

pub const SETTINGS_FILE: &str = "settings.toml";

/// Read-through key-value store for [`Settings`].
///
/// Every `load` reads the backing store again; there is no cache, so
/// rapid edits resolve last-write-wins.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<Settings>;

    fn save(&self, settings: &Settings) -> Result<()>;

    /// Load, falling back to defaults (and logging) on any error.
    fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        })
    }
}

/// Returns the config directory.
///
/// `WORKOUT_POWER_CONFIG_DIR` wins when set. Otherwise
/// `~/.config/workout-power[-dev]/`, with the `-dev` suffix when
/// `WORKOUT_POWER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn config_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("WORKOUT_POWER_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("WORKOUT_POWER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("workout-power-dev")
            } else {
                base_dir.join("workout-power")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| SettingsError::NoConfigDir(e.to_string()))?;
    Ok(dir)
}

/// TOML file on disk.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.toml` inside [`config_dir`].
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(config_dir()?.join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    /// A missing file yields defaults; an unreadable or malformed file is
    /// an error.
    fn load(&self) -> Result<Settings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => {
                return Err(SettingsError::LoadFailed {
                    path: self.path.clone(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        toml::from_str(&content).map_err(|e| {
            SettingsError::LoadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let save_failed = |message: String| SettingsError::SaveFailed {
            path: self.path.clone(),
            message,
        };
        let content = toml::to_string_pretty(settings).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(&self.path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }
}

/// In-memory store, for tests and hosts without a filesystem.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: Mutex<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings> {
        let guard = self
            .inner
            .lock()
            .map_err(|e| crate::error::CoreError::Custom(e.to_string()))?;
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| crate::error::CoreError::Custom(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join(SETTINGS_FILE));
        assert_eq!(store.load().unwrap(), Settings::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_load_reads_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join(SETTINGS_FILE));
        let mut settings = Settings::default();
        settings.rest_duration = 0;
        settings.beep_volume = 40;
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);

        // Edits made behind the store's back are visible on the next load.
        std::fs::write(store.path(), "rest_duration = 45\n").unwrap();
        assert_eq!(store.load().unwrap().rest_duration, 45);
    }

    #[test]
    fn malformed_file_is_an_error_but_load_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "rest_duration = \"ten\"").unwrap();
        let store = FileSettingsStore::new(&path);
        assert!(store.load().is_err());
        assert_eq!(store.load_or_default(), Settings::default());
    }

    #[test]
    fn memory_store_last_write_wins() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.load().unwrap(), Settings::default());
        let mut a = Settings::default();
        a.voice_volume = 10;
        let mut b = Settings::default();
        b.voice_volume = 90;
        store.save(&a).unwrap();
        store.save(&b).unwrap();
        assert_eq!(store.load().unwrap().voice_volume, 90);
    }
}
