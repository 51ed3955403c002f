//! User preferences.
//!
//! [`Settings`] is the persisted flat record edited from the options
//! screen. Values are stored as entered; [`TimerSettings::resolve`] clamps
//! them once when a run starts, and the active run never sees later edits.

mod store;

use serde::{Deserialize, Serialize};

pub use store::{config_dir, FileSettingsStore, MemorySettingsStore, SettingsStore};

use crate::error::SettingsError;

pub const REST_SECONDS_RANGE: (i64, i64) = (0, 60);
pub const PRE_WORKOUT_SECONDS_RANGE: (i64, i64) = (3, 10);
pub const VOLUME_RANGE: (i64, i64) = (0, 100);

/// Accent used when `light_color` is missing or malformed.
pub const DEFAULT_LIGHT_COLOR: &str = "#16A34A";
const DEFAULT_LIGHT_RGB: (u8, u8, u8) = (22, 163, 74);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    /// Whether the dark palette applies, given the host's own preference.
    pub fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::System => system_prefers_dark,
        }
    }
}

/// Persisted preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_rest_duration")]
    pub rest_duration: i64,
    #[serde(default = "default_pre_workout_seconds")]
    pub pre_workout_seconds: i64,
    #[serde(default = "default_100")]
    pub voice_volume: i64,
    #[serde(default = "default_100")]
    pub beep_volume: i64,
    #[serde(default = "default_true")]
    pub sounds: bool,
    #[serde(default)]
    pub vibration: bool,
    #[serde(default = "default_true")]
    pub wake_lock: bool,
    #[serde(default = "default_true")]
    pub celebrations: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_light_color")]
    pub light_color: String,
}

fn default_rest_duration() -> i64 {
    10
}
fn default_pre_workout_seconds() -> i64 {
    5
}
fn default_100() -> i64 {
    100
}
fn default_true() -> bool {
    true
}
fn default_light_color() -> String {
    DEFAULT_LIGHT_COLOR.into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rest_duration: default_rest_duration(),
            pre_workout_seconds: default_pre_workout_seconds(),
            voice_volume: 100,
            beep_volume: 100,
            sounds: true,
            vibration: false,
            wake_lock: true,
            celebrations: true,
            theme: Theme::System,
            light_color: default_light_color(),
        }
    }
}

impl Settings {
    /// Get a value as string by field name.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by field name, parsing it as the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| SettingsError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let obj = json
            .as_object_mut()
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        let existing = obj
            .get(key)
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;

        let invalid = |message: String| SettingsError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?
                    .into(),
            ),
            _ => serde_json::Value::String(value.trim().to_string()),
        };
        obj.insert(key.to_string(), new_value);

        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// The accent color as RGB, falling back to the default green.
    pub fn light_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.light_color).unwrap_or(DEFAULT_LIGHT_RGB)
    }
}

/// Parse `#RGB` or `#RRGGBB`.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut it = digits.chars().map(|c| {
                let pair: String = [c, c].iter().collect();
                channel(&pair)
            });
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
        )),
        _ => None,
    }
}

fn clamp(value: i64, (lo, hi): (i64, i64)) -> i64 {
    value.clamp(lo, hi)
}

/// Clamped snapshot taken when a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub rest_seconds: u64,
    pub pre_workout_seconds: u64,
    pub voice_volume: u8,
    pub beep_volume: u8,
    pub sounds_enabled: bool,
    pub vibration_enabled: bool,
    pub wake_lock_enabled: bool,
    pub celebrations_enabled: bool,
}

impl TimerSettings {
    pub fn resolve(settings: &Settings) -> Self {
        Self {
            rest_seconds: clamp(settings.rest_duration, REST_SECONDS_RANGE) as u64,
            pre_workout_seconds: clamp(settings.pre_workout_seconds, PRE_WORKOUT_SECONDS_RANGE)
                as u64,
            voice_volume: clamp(settings.voice_volume, VOLUME_RANGE) as u8,
            beep_volume: clamp(settings.beep_volume, VOLUME_RANGE) as u8,
            sounds_enabled: settings.sounds,
            vibration_enabled: settings.vibration,
            wake_lock_enabled: settings.wake_lock,
            celebrations_enabled: settings.celebrations,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::resolve(&Settings::default())
    }
}

impl From<&Settings> for TimerSettings {
    fn from(settings: &Settings) -> Self {
        Self::resolve(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_options_screen() {
        let s = Settings::default();
        assert_eq!(s.rest_duration, 10);
        assert_eq!(s.pre_workout_seconds, 5);
        assert_eq!(s.voice_volume, 100);
        assert!(s.sounds);
        assert!(!s.vibration);
        assert!(s.wake_lock);
        assert!(s.celebrations);
        assert_eq!(s.theme, Theme::System);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let s: Settings = toml::from_str("rest_duration = 0\nvibration = true\n").unwrap();
        assert_eq!(s.rest_duration, 0);
        assert!(s.vibration);
        assert_eq!(s.pre_workout_seconds, 5);
        assert_eq!(s.light_color, DEFAULT_LIGHT_COLOR);
    }

    #[test]
    fn resolve_clamps_every_range() {
        let s = Settings {
            rest_duration: 300,
            pre_workout_seconds: 1,
            voice_volume: -5,
            beep_volume: 250,
            ..Settings::default()
        };
        let t = TimerSettings::resolve(&s);
        assert_eq!(t.rest_seconds, 60);
        assert_eq!(t.pre_workout_seconds, 3);
        assert_eq!(t.voice_volume, 0);
        assert_eq!(t.beep_volume, 100);

        let s = Settings {
            rest_duration: -1,
            pre_workout_seconds: 99,
            ..Settings::default()
        };
        let t = TimerSettings::resolve(&s);
        assert_eq!(t.rest_seconds, 0);
        assert_eq!(t.pre_workout_seconds, 10);
    }

    #[test]
    fn get_and_set_by_key() {
        let mut s = Settings::default();
        assert_eq!(s.get("rest_duration").as_deref(), Some("10"));
        assert_eq!(s.get("theme").as_deref(), Some("system"));

        s.set("rest_duration", "25").unwrap();
        s.set("sounds", "false").unwrap();
        s.set("theme", "dark").unwrap();
        assert_eq!(s.rest_duration, 25);
        assert!(!s.sounds);
        assert_eq!(s.theme, Theme::Dark);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut s = Settings::default();
        assert!(matches!(
            s.set("volume", "3"),
            Err(SettingsError::UnknownKey(_))
        ));
        assert!(matches!(
            s.set("sounds", "loud"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(matches!(
            s.set("theme", "sepia"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#16A34A"), Some((22, 163, 74)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("nope"), None);
        let s = Settings {
            light_color: "#12".into(),
            ..Settings::default()
        };
        assert_eq!(s.light_rgb(), (22, 163, 74));
    }

    #[test]
    fn theme_resolution() {
        assert!(Theme::Dark.is_dark(false));
        assert!(!Theme::Light.is_dark(true));
        assert!(Theme::System.is_dark(true));
    }
}
