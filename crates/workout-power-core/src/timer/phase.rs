use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Prepare,
    Work,
    Rest,
    /// Terminal.
    Completed,
}

impl Phase {
    /// Heading shown above the clock.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Prepare => "Get ready",
            Phase::Work => "Work",
            Phase::Rest => "Rest",
            Phase::Completed => "Done",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Completed
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
