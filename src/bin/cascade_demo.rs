use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tilecascade::*;

// ---------- Constants ----------
const GRID_WIDTH: i32 = 6;
const GRID_HEIGHT: i32 = 8;
const MIN_RUN: usize = 3;
const RNG_SEED: u64 = 42;
const CLICKS: usize = 8;
const MOVE_MS: u64 = 20;

// ---------- Entry ----------
#[tokio::main]
async fn main() -> Result<(), GridError> {
	let verbose = std::env::args().any(|a| a == "--verbose");
	let log: Arc<dyn LogSink> = if verbose { Arc::new(StderrLog::new("Grid")) } else { Arc::new(SilentLog) };

	let config = GridConfig {
		seed: Some(RNG_SEED),
		move_duration_ms: MOVE_MS,
		verbose,
		..GridConfig::new(
			GRID_WIDTH,
			GRID_HEIGHT,
			MIN_RUN,
			vec![TileType::Red, TileType::Green, TileType::Blue, TileType::Yellow],
		)
	};
	let animator = TimedAnimator::new(config.move_duration())
		.with_duration(TileType::Yellow, config.move_duration() * 2);
	let cascade = Cascade::new(Arc::new(animator), log);
	cascade.setup(&config)?;

	// Stand-in for a camera shake.
	let shakes = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&shakes);
	cascade.subscribe(move || {
		counter.fetch_add(1, Ordering::Relaxed);
	});

	print_board(&cascade);
	let mut rng = StdRng::seed_from_u64(RNG_SEED);
	for _ in 0..CLICKS {
		let Some(at) = pick_occupied(&cascade, &mut rng) else {
			println!("Board is empty");
			break;
		};
		println!("\nClick {at}");
		match cascade.trigger(at).await {
			TriggerOutcome::Settled(report) => println!(
				"Removed {} tiles in {} rounds ({} slides)",
				report.removed, report.match_rounds, report.moved
			),
			TriggerOutcome::Aborted { reason, .. } => println!("Aborted: {reason}"),
			TriggerOutcome::Missed(e) => println!("Missed: {e}"),
			TriggerOutcome::Ignored => println!("Busy, click ignored"),
		}
		print_board(&cascade);
		tokio::time::sleep(Duration::from_millis(MOVE_MS)).await;
	}
	println!("\nShakes: {}", shakes.load(Ordering::Relaxed));
	Ok(())
}

// ---------- Utilities ----------
fn pick_occupied(cascade: &Cascade, rng: &mut StdRng) -> Option<TileCoord> {
	let occupied: Vec<TileCoord> = cascade.with_board(|b| b.occupied().map(|(c, _)| c).collect());
	if occupied.is_empty() {
		return None;
	}
	Some(occupied[rng.gen_range(0..occupied.len())])
}

fn print_board(cascade: &Cascade) {
	let state = cascade.state();
	let (rows, status) = cascade.with_board(|b| (format_board(b), format_status(state, b)));
	for row in rows {
		println!("  {row}");
	}
	println!("{status}");
}
