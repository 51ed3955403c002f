use clap::Subcommand;
use workout_power_core::{FileSettingsStore, Settings, SettingsError, SettingsStore};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "rest_duration", "voice_volume")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

/// The settings file the CLI reads and writes.
pub fn open_store() -> workout_power_core::Result<FileSettingsStore> {
    FileSettingsStore::open_default()
}

/// Settings for a run; a broken store falls back to defaults.
pub fn load_for_run() -> Settings {
    match open_store() {
        Ok(store) => store.load_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        }
    }
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    match action {
        SettingsAction::Get { key } => {
            let settings = store.load()?;
            let value = settings
                .get(&key)
                .ok_or(SettingsError::UnknownKey(key))?;
            println!("{value}");
        }
        SettingsAction::Set { key, value } => {
            let mut settings = store.load()?;
            settings.set(&key, &value)?;
            store.save(&settings)?;
            println!("ok");
        }
        SettingsAction::List => {
            let settings = store.load()?;
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{json}");
        }
        SettingsAction::Reset => {
            store.save(&Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
