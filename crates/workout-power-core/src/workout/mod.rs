mod catalog;
mod definition;

pub use catalog::{DirWorkoutSource, WorkoutListing, WorkoutSource, INDEX_FILE};
pub use definition::{Exercise, PreviewCard, WorkoutDefinition, FALLBACK_WORK_SECONDS};
