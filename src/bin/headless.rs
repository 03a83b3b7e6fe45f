//! Run one seeded session without a window and record the score.
//!
//! Usage: `headless [config.json] [ticks]`

use std::time::Instant;

use bullet_purgatory::game::run_session_with;
use bullet_purgatory::persistence::MAX_HIGH_SCORES;
use bullet_purgatory::prelude::*;

const DEFAULT_TICKS: u64 = 600;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let ticks = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let headless = HeadlessSurface::new().close_after(ticks).into_shared();
    let surface: SurfaceRef = headless.clone();
    let start = starting_state(&config);
    tracing::info!("Starting at score {} with {} lives", start.score, start.lives);

    let began = Instant::now();
    let outcome = run_session_with(&config, &surface, start, &mut FixedClock::new(60))?;
    let scores = record_outcome(&config, &outcome)?;

    println!(
        "{} scored {} in {} ticks ({:?})",
        outcome.name,
        outcome.score,
        headless.borrow().ticks(),
        began.elapsed()
    );
    for (rank, (name, score)) in scores.top(MAX_HIGH_SCORES).iter().enumerate() {
        println!("{:>2}. {name:<20} {score}", rank + 1);
    }
    Ok(())
}
