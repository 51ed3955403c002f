use std::path::Path;

use clap::Subcommand;
use workout_power_core::workout::PreviewCard;
use workout_power_core::{format_clock, DirWorkoutSource, TimerSettings, WorkoutSource};

use super::settings;

#[derive(Subcommand)]
pub enum WorkoutsAction {
    /// List the workout menu
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a workout's exercises and estimated length
    Preview {
        /// Descriptor filename from the workout list
        file: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: WorkoutsAction, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = DirWorkoutSource::new(data_dir);
    match action {
        WorkoutsAction::List { json } => {
            let listing = source.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else if listing.is_empty() {
                println!("No workouts found.");
            } else {
                for entry in &listing {
                    if entry.description.is_empty() {
                        println!("{:<24} {}", entry.filename, entry.name);
                    } else {
                        println!("{:<24} {} - {}", entry.filename, entry.name, entry.description);
                    }
                }
            }
        }
        WorkoutsAction::Preview { file, json } => {
            let workout = source.load(&file)?;
            let timer = TimerSettings::resolve(&settings::load_for_run());
            let cards = workout.preview(timer.rest_seconds);
            let total = workout.estimated_total_seconds(timer.rest_seconds, timer.pre_workout_seconds);

            if json {
                let out = serde_json::json!({
                    "name": workout.display_name(),
                    "description": workout.description,
                    "estimated_total_secs": total,
                    "cards": cards,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            println!("{}", workout.display_name());
            if !workout.description.is_empty() {
                println!("{}", workout.description);
            }
            println!("Est. {}", format_clock(total));
            println!();
            for card in &cards {
                match card {
                    PreviewCard::Exercise {
                        number,
                        name,
                        seconds,
                        form_tips,
                        ..
                    } => {
                        println!("{number:>3}. {name} ({seconds}s)");
                        if let Some(tips) = form_tips {
                            println!("     {tips}");
                        }
                    }
                    PreviewCard::Rest { seconds } => println!("     Rest {seconds}s"),
                }
            }
        }
    }
    Ok(())
}
