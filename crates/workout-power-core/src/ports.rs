//! Device capability ports.
//!
//! Every side effect the timer has on the outside world goes through one
//! of these traits. A host implements the ones it supports and leaves the
//! rest as [`Unsupported`]; callers never need to know which is which.
//! Port methods may fail, but the failure stops at the dispatcher.

use std::sync::Arc;

use crate::error::{Capability, CapabilityError};

/// A short sine beep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

/// Played when a work phase begins.
pub const WORK_TONE: Tone = Tone {
    frequency_hz: 1320.0,
    duration_ms: 120,
};

/// Played when a rest phase begins. Lower than the work tone.
pub const REST_TONE: Tone = Tone {
    frequency_hz: 660.0,
    duration_ms: 140,
};

/// Played once per second for the last three seconds of every phase.
pub const COUNTDOWN_TONE: Tone = Tone {
    frequency_hz: 880.0,
    duration_ms: 80,
};

/// Vibration pattern (on/off milliseconds) for the start of work.
pub const WORK_VIBRATION: &[u32] = &[40, 30, 40];

/// Vibration pattern for the start of rest.
pub const REST_VIBRATION: &[u32] = &[80];

pub trait TonePort: Send {
    /// `volume` is 1..=100; the dispatcher never calls with 0.
    fn play_tone(&mut self, volume: u8, tone: Tone) -> Result<(), CapabilityError>;
}

pub trait SpeechPort: Send {
    fn speak(&mut self, text: &str, volume: u8) -> Result<(), CapabilityError>;

    /// Drop any queued or in-flight utterance.
    fn cancel(&mut self) -> Result<(), CapabilityError>;
}

pub trait VibrationPort: Send {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), CapabilityError>;
}

/// Opaque token for a held wake lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WakeLockHandle(pub u64);

pub trait WakeLockPort: Send {
    fn request(&mut self) -> Result<WakeLockHandle, CapabilityError>;

    fn release(&mut self, handle: WakeLockHandle) -> Result<(), CapabilityError>;
}

pub trait MotionPreference: Send + Sync {
    fn prefers_reduced_motion(&self) -> bool;
}

/// Stand-in for any capability the host lacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl TonePort for Unsupported {
    fn play_tone(&mut self, _volume: u8, _tone: Tone) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::Tone))
    }
}

impl SpeechPort for Unsupported {
    fn speak(&mut self, _text: &str, _volume: u8) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::Speech))
    }

    fn cancel(&mut self) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::Speech))
    }
}

impl VibrationPort for Unsupported {
    fn vibrate(&mut self, _pattern: &[u32]) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::Vibration))
    }
}

impl WakeLockPort for Unsupported {
    fn request(&mut self) -> Result<WakeLockHandle, CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::WakeLock))
    }

    fn release(&mut self, _handle: WakeLockHandle) -> Result<(), CapabilityError> {
        Err(CapabilityError::Unsupported(Capability::WakeLock))
    }
}

/// Fixed reduced-motion answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMotion(pub bool);

impl MotionPreference for StaticMotion {
    fn prefers_reduced_motion(&self) -> bool {
        self.0
    }
}

/// The full set of ports a controller runs against.
pub struct Capabilities {
    pub tone: Box<dyn TonePort>,
    pub speech: Box<dyn SpeechPort>,
    pub vibration: Box<dyn VibrationPort>,
    pub wake_lock: Box<dyn WakeLockPort>,
    pub motion: Arc<dyn MotionPreference>,
}

impl Capabilities {
    /// Nothing supported, motion allowed.
    pub fn unsupported() -> Self {
        Self {
            tone: Box::new(Unsupported),
            speech: Box::new(Unsupported),
            vibration: Box::new(Unsupported),
            wake_lock: Box::new(Unsupported),
            motion: Arc::new(StaticMotion(false)),
        }
    }

    pub fn with_tone(mut self, tone: impl TonePort + 'static) -> Self {
        self.tone = Box::new(tone);
        self
    }

    pub fn with_speech(mut self, speech: impl SpeechPort + 'static) -> Self {
        self.speech = Box::new(speech);
        self
    }

    pub fn with_vibration(mut self, vibration: impl VibrationPort + 'static) -> Self {
        self.vibration = Box::new(vibration);
        self
    }

    pub fn with_wake_lock(mut self, wake_lock: impl WakeLockPort + 'static) -> Self {
        self.wake_lock = Box::new(wake_lock);
        self
    }

    pub fn with_motion(mut self, motion: impl MotionPreference + 'static) -> Self {
        self.motion = Arc::new(motion);
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::unsupported()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_reports_each_capability() {
        let mut u = Unsupported;
        assert_eq!(
            u.play_tone(50, WORK_TONE),
            Err(CapabilityError::Unsupported(Capability::Tone))
        );
        assert_eq!(
            u.speak("Squats", 50),
            Err(CapabilityError::Unsupported(Capability::Speech))
        );
        assert_eq!(
            u.vibrate(REST_VIBRATION),
            Err(CapabilityError::Unsupported(Capability::Vibration))
        );
        assert!(WakeLockPort::request(&mut u).unwrap_err().is_unsupported());
    }

    #[test]
    fn rest_tone_is_lower_than_work_tone() {
        assert!(REST_TONE.frequency_hz < WORK_TONE.frequency_hz);
        assert_ne!(WORK_VIBRATION, REST_VIBRATION);
        assert!(REST_VIBRATION.len() < WORK_VIBRATION.len());
    }
}
