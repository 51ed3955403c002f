pub mod celebrate;
pub mod run;
pub mod settings;
pub mod workouts;
