//! Cue dispatch: turns phase boundaries and countdown seconds into tone,
//! speech and vibration calls, gated by the run's settings.
//!
//! Every port call is best-effort. A failure is logged at debug level and
//! dropped; it never reaches the timer.

use crate::error::CapabilityError;
use crate::ports::{
    SpeechPort, Tone, TonePort, VibrationPort, COUNTDOWN_TONE, REST_TONE, REST_VIBRATION,
    WORK_TONE, WORK_VIBRATION,
};
use crate::settings::TimerSettings;

pub struct CueDispatcher {
    tone: Box<dyn TonePort>,
    speech: Box<dyn SpeechPort>,
    vibration: Box<dyn VibrationPort>,
}

impl CueDispatcher {
    pub fn new(
        tone: Box<dyn TonePort>,
        speech: Box<dyn SpeechPort>,
        vibration: Box<dyn VibrationPort>,
    ) -> Self {
        Self {
            tone,
            speech,
            vibration,
        }
    }

    /// Work begins: announce the exercise, high beep, double buzz.
    pub fn work_started(&mut self, settings: &TimerSettings, exercise_name: &str) {
        if settings.sounds_enabled && settings.voice_volume > 0 {
            // At most one utterance queued at a time.
            self.cancel_speech();
            let volume = settings.voice_volume;
            best_effort(self.speech.speak(exercise_name, volume));
        }
        self.beep(settings, WORK_TONE);
        if settings.vibration_enabled {
            best_effort(self.vibration.vibrate(WORK_VIBRATION));
        }
    }

    /// Rest begins: low beep, single short buzz.
    pub fn rest_started(&mut self, settings: &TimerSettings) {
        self.beep(settings, REST_TONE);
        if settings.vibration_enabled {
            best_effort(self.vibration.vibrate(REST_VIBRATION));
        }
    }

    /// One short tick for a countdown second.
    pub fn countdown(&mut self, settings: &TimerSettings) {
        self.beep(settings, COUNTDOWN_TONE);
    }

    pub fn cancel_speech(&mut self) {
        best_effort(self.speech.cancel());
    }

    fn beep(&mut self, settings: &TimerSettings, tone: Tone) {
        if settings.sounds_enabled && settings.beep_volume > 0 {
            best_effort(self.tone.play_tone(settings.beep_volume, tone));
        }
    }
}

fn best_effort(result: Result<(), CapabilityError>) {
    if let Err(e) = result {
        tracing::debug!(error = %e, "cue skipped");
    }
}
