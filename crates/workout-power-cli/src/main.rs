use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod device;
mod terminal;

#[derive(Parser)]
#[command(name = "workout-power", version, about = "Workout Power interval timer")]
struct Cli {
    /// Directory holding index.json and the workout descriptors
    #[arg(long, global = true, default_value = "data/workouts")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and preview workouts
    Workouts {
        #[command(subcommand)]
        action: commands::workouts::WorkoutsAction,
    },
    /// Run a workout in the terminal
    Run {
        /// Descriptor filename from the workout list (e.g. "quick.json")
        file: String,
        /// Print lifecycle events as JSON lines
        #[arg(long)]
        events: bool,
    },
    /// Play test celebrations
    Celebrate {
        /// Seed the particle generator
        #[arg(long)]
        seed: Option<u64>,
        /// Number of celebrations to play back to back
        #[arg(long, default_value = "1")]
        count: u32,
    },
    /// Manage settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("WORKOUT_POWER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Workouts { action } => commands::workouts::run(action, &cli.data_dir),
        Commands::Run { file, events } => commands::run::run(&file, events, &cli.data_dir),
        Commands::Celebrate { seed, count } => commands::celebrate::run(seed, count),
        Commands::Settings { action } => commands::settings::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
