//! Capability ports backed by the terminal and the host OS.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use workout_power_core::ports::{MotionPreference, SpeechPort, Tone, TonePort};
use workout_power_core::{Capabilities, Capability, CapabilityError};

pub const REDUCED_MOTION_ENV: &str = "WORKOUT_POWER_REDUCED_MOTION";

/// Every cue tone is the terminal bell.
#[derive(Debug, Default)]
pub struct Bell;

impl TonePort for Bell {
    fn play_tone(&mut self, _volume: u8, _tone: Tone) -> Result<(), CapabilityError> {
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| CapabilityError::failed(Capability::Tone, e.to_string()))
    }
}

/// Speech through a text-to-speech program on `PATH`.
#[derive(Debug)]
pub struct ProcessSpeech {
    program: PathBuf,
    child: Option<Child>,
}

impl ProcessSpeech {
    /// `espeak`, then `say`; `None` when neither is installed.
    pub fn detect() -> Option<Self> {
        let path = std::env::var_os("PATH")?;
        ["espeak", "say"].iter().find_map(|name| {
            std::env::split_paths(&path)
                .map(|dir| dir.join(name))
                .find(|candidate| candidate.is_file())
                .map(|program| Self {
                    program,
                    child: None,
                })
        })
    }

    fn is_espeak(&self) -> bool {
        self.program
            .file_name()
            .is_some_and(|name| name == "espeak")
    }

    fn reap(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                self.child = Some(child);
            }
        }
    }
}

impl SpeechPort for ProcessSpeech {
    fn speak(&mut self, text: &str, volume: u8) -> Result<(), CapabilityError> {
        self.reap();
        let mut cmd = Command::new(&self.program);
        if self.is_espeak() {
            // espeak amplitude runs 0..=200.
            cmd.arg("-a").arg((u32::from(volume) * 2).to_string());
        }
        let child = cmd
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CapabilityError::failed(Capability::Speech, e.to_string()))?;
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), CapabilityError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if let Ok(Some(_)) = child.try_wait() {
            return Ok(());
        }
        child
            .kill()
            .and_then(|()| child.wait().map(|_| ()))
            .map_err(|e| CapabilityError::failed(Capability::Speech, e.to_string()))
    }
}

impl Drop for ProcessSpeech {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

/// Reduced motion from `WORKOUT_POWER_REDUCED_MOTION=1`, read on every query.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvMotion;

impl MotionPreference for EnvMotion {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(REDUCED_MOTION_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

/// Terminal capabilities. Vibration and wake lock stay unsupported.
pub fn capabilities() -> Capabilities {
    let caps = Capabilities::unsupported()
        .with_tone(Bell)
        .with_motion(EnvMotion);
    match ProcessSpeech::detect() {
        Some(speech) => {
            tracing::debug!(program = %speech.program.display(), "speech available");
            caps.with_speech(speech)
        }
        None => caps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_without_utterance_is_a_no_op() {
        let mut speech = ProcessSpeech {
            program: PathBuf::from("espeak"),
            child: None,
        };
        assert!(speech.cancel().is_ok());
        assert!(speech.is_espeak());
    }

    #[test]
    fn missing_program_fails_softly() {
        let mut speech = ProcessSpeech {
            program: PathBuf::from("/nonexistent/workout-power-tts"),
            child: None,
        };
        let err = speech.speak("Work", 50).unwrap_err();
        assert!(!err.is_unsupported());
    }
}
