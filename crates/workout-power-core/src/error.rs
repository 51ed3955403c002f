//! Core error types for workout-power-core.
//!
//! Errors that make a timer run impossible (`NoWorkoutLoaded`, data load
//! failures) surface to the caller. Capability failures are a separate
//! type that never leaves the cue and wake-lock layer.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for workout-power-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A timer start was attempted without a non-empty exercise list.
    #[error("No workout loaded.")]
    NoWorkoutLoaded,

    /// Workout data could not be read or parsed
    #[error("Error loading workout: {0}")]
    DataLoad(#[from] DataLoadError),

    /// Settings-related errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Workout catalog and descriptor errors.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Failed to read a descriptor from disk
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor is not valid JSON for the expected shape
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Filename escapes the data directory or is otherwise unusable
    #[error("invalid workout filename: {0}")]
    InvalidFilename(String),
}

/// Settings store errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to load settings
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save settings
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key is not part of the settings record
    #[error("unknown settings key: {0}")]
    UnknownKey(String),

    /// Value cannot be parsed for the key's type
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// No usable config directory
    #[error("config directory unavailable: {0}")]
    NoConfigDir(String),
}

/// Device capabilities the core talks to through ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Tone,
    Speech,
    Vibration,
    WakeLock,
    Animation,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Tone => "tone",
            Capability::Speech => "speech",
            Capability::Vibration => "vibration",
            Capability::WakeLock => "wake lock",
            Capability::Animation => "animation",
        };
        f.write_str(name)
    }
}

/// Failure reported by a capability port.
///
/// Ports return this; the cue dispatcher and wake-lock controller log it
/// and carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("{0} is not supported on this device")]
    Unsupported(Capability),

    #[error("{capability} failed: {message}")]
    Failed {
        capability: Capability,
        message: String,
    },
}

impl CapabilityError {
    pub fn failed(capability: Capability, message: impl Into<String>) -> Self {
        CapabilityError::Failed {
            capability,
            message: message.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, CapabilityError::Unsupported(_))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_workout_message_matches_ui_text() {
        assert_eq!(CoreError::NoWorkoutLoaded.to_string(), "No workout loaded.");
    }

    #[test]
    fn capability_error_display() {
        let err = CapabilityError::Unsupported(Capability::WakeLock);
        assert_eq!(err.to_string(), "wake lock is not supported on this device");
        assert!(err.is_unsupported());

        let err = CapabilityError::failed(Capability::Speech, "no voices");
        assert_eq!(err.to_string(), "speech failed: no voices");
        assert!(!err.is_unsupported());
    }

    #[test]
    fn settings_error_converts_into_core_error() {
        let err: CoreError = SettingsError::UnknownKey("volume".into()).into();
        assert!(matches!(err, CoreError::Settings(_)));
        assert_eq!(err.to_string(), "Settings error: unknown settings key: volume");
    }
}
