use std::sync::Arc;

use tokio::sync::mpsc;
use workout_power_core::driver::run_celebration;
use workout_power_core::{CelebrationEngine, CelebrationKind, DriverConfig, MonotonicClock};

use super::settings;
use crate::device::EnvMotion;
use crate::terminal::{self, InputReader, PlainPresenter, Screen};

pub fn run(seed: Option<u64>, count: u32) -> Result<(), Box<dyn std::error::Error>> {
    let motion = Arc::new(EnvMotion);
    let mut engine = match seed {
        Some(seed) => CelebrationEngine::with_seed(motion, seed),
        None => CelebrationEngine::new(motion),
    };
    let accent = settings::load_for_run().light_rgb();

    let runtime = tokio::runtime::Runtime::new()?;
    let played = runtime.block_on(play(&mut engine, count, accent))?;

    if played.is_empty() {
        println!("Celebrations are off (reduced motion).");
    }
    for kind in played {
        println!("{kind}");
    }
    Ok(())
}

async fn play(
    engine: &mut CelebrationEngine,
    count: u32,
    accent: (u8, u8, u8),
) -> Result<Vec<CelebrationKind>, Box<dyn std::error::Error>> {
    let clock = MonotonicClock::new();
    let config = DriverConfig::default();
    let (tx, mut rx) = mpsc::channel(32);
    let mut played = Vec::new();

    if !terminal::is_interactive() {
        drop(tx);
        let mut presenter = PlainPresenter::new(false);
        for _ in 0..count {
            let anchor = engine.viewport().center();
            match run_celebration(engine, anchor, &clock, &mut presenter, &mut rx, config).await {
                Some(kind) => played.push(kind),
                None => break,
            }
        }
        return Ok(played);
    }

    let mut screen = Screen::enter(accent, false)?;
    engine.set_viewport(screen.viewport());
    screen.set_banner(&["Test Celebrations", "", "q stop"]);
    let reader = InputReader::spawn(tx);
    for _ in 0..count {
        let anchor = engine.viewport().center();
        let Some(kind) = run_celebration(engine, anchor, &clock, &mut screen, &mut rx, config).await
        else {
            break;
        };
        played.push(kind);
        // A run cut short by Back leaves its fading particles behind.
        if engine.has_surface() {
            break;
        }
    }
    reader.shutdown().await;
    Ok(played)
}
