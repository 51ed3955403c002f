use serde::Serialize;

use super::engine::WorkoutTimer;
use super::phase::Phase;
use crate::clock::Millis;
use crate::wake_lock::WakeLockStatus;

/// `M:SS`, minutes unpadded.
pub fn format_clock(total_secs: u64) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Everything the timer screen shows for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub phase: Phase,
    pub phase_label: String,
    pub title: String,
    pub remaining_ms: u64,
    pub remaining_text: String,
    pub progress: f64,
    pub progress_percent: u8,
    pub progress_text: String,
    pub next_up: Vec<String>,
    pub estimated_total_text: String,
    pub paused: bool,
    pub wake_lock: String,
}

impl TimerView {
    pub fn new(timer: &WorkoutTimer, now: Millis, wake_lock: WakeLockStatus) -> Self {
        let workout = timer.workout();
        let total = workout.exercise_count();
        let index = timer.exercise_index();
        let phase = timer.phase();

        let title = match phase {
            Phase::Prepare => workout.display_name().to_string(),
            Phase::Work => workout.exercise_name(index),
            Phase::Rest => "Rest".to_string(),
            Phase::Completed => "Workout complete".to_string(),
        };
        let progress_text = match phase {
            Phase::Prepare => format!("0 / {total}"),
            Phase::Work => format!("{} / {total}", index + 1),
            Phase::Rest => format!("{index} / {total}"),
            Phase::Completed => format!("{total} / {total}"),
        };
        let progress = timer.progress(now);
        let remaining_ms = timer.remaining_ms(now);

        Self {
            phase,
            phase_label: phase.label().to_string(),
            title,
            remaining_ms,
            remaining_text: format_clock(remaining_ms.div_ceil(1000)),
            progress,
            progress_percent: (progress * 100.0).round() as u8,
            progress_text,
            next_up: next_up(timer),
            estimated_total_text: format!("Est. {}", format_clock(timer.estimated_total_secs())),
            paused: timer.is_paused(),
            wake_lock: wake_lock.to_string(),
        }
    }
}

fn next_up(timer: &WorkoutTimer) -> Vec<String> {
    let workout = timer.workout();
    let index = timer.exercise_index();
    let exercise_line = |i: usize| format!("{} {}s", workout.exercise_name(i), workout.work_seconds(i));

    match timer.phase() {
        Phase::Prepare | Phase::Rest => vec![exercise_line(index)],
        Phase::Work => {
            let next = index + 1;
            if next >= workout.exercise_count() {
                return Vec::new();
            }
            let rest = timer.settings().rest_seconds;
            let mut lines = Vec::with_capacity(2);
            if rest > 0 {
                lines.push(format!("Rest {rest}s"));
            }
            lines.push(exercise_line(next));
            lines
        }
        Phase::Completed => Vec::new(),
    }
}
