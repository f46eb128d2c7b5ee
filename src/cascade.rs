use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};

use crate::animation::Animator;
use crate::board::Board;
use crate::config::{GridConfig, Rules, ScanMode};
use crate::console::LogSink;
use crate::coords::TileCoord;
use crate::error::GridError;
use crate::events::{RemovalListeners, SubscriptionId};
use crate::gravity;
use crate::hud::format_board;
use crate::matcher::{MatchSet, RunMatcher};
use crate::tile::{RandomSampler, Tile, TypeSampler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeState {
	Idle,
	Resolving,
}

/// Why a cascade stopped before settling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CascadeAbort {
	#[error(transparent)]
	Board(#[from] GridError),
	#[error("board was set up again while the cascade was running")]
	Reset,
	#[error("compaction task failed: {0}")]
	Task(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
	pub origin: TileCoord,
	/// Tiles taken off the board, the clicked one included.
	pub removed: usize,
	/// Single-row slides committed.
	pub moved: usize,
	/// Non-empty matching passes.
	pub match_rounds: usize,
	/// `on_tiles_removed` notifications fired.
	pub notifications: usize,
}

impl CascadeReport {
	fn new(origin: TileCoord) -> Self {
		Self { origin, removed: 0, moved: 0, match_rounds: 0, notifications: 0 }
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
	/// A cascade was already in flight.
	Ignored,
	/// Nothing to remove at the coordinate; no cascade started.
	Missed(GridError),
	Settled(CascadeReport),
	Aborted { report: CascadeReport, reason: CascadeAbort },
}

pub(crate) struct Session {
	pub(crate) board: Board,
	busy: bool,
	generation: u64,
	rules: Rules,
	matcher: RunMatcher,
}

impl Session {
	/// Fails once `setup` has replaced the board this cascade started on.
	pub(crate) fn check(&self, generation: u64) -> Result<(), CascadeAbort> {
		if self.generation == generation { Ok(()) } else { Err(CascadeAbort::Reset) }
	}
}

pub(crate) struct Shared {
	session: Mutex<Session>,
	listeners: Mutex<RemovalListeners>,
	pub(crate) animator: Arc<dyn Animator>,
	log: Arc<dyn LogSink>,
}

impl Shared {
	pub(crate) fn session(&self) -> MutexGuard<'_, Session> {
		self.session.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn listeners(&self) -> MutexGuard<'_, RemovalListeners> {
		self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
	}

	pub(crate) fn debug(&self, message: impl FnOnce() -> String) {
		if self.log.enabled() {
			self.log.log(&message());
		}
	}
}

/// Holds the busy flag for one cascade. Dropping it releases the flag, so a
/// cancelled or panicking cascade does not lock out later triggers.
struct BusyGuard {
	shared: Arc<Shared>,
	generation: u64,
}

impl Drop for BusyGuard {
	fn drop(&mut self) {
		let mut session = self.shared.session();
		// After a reset the busy flag belongs to the new board.
		if session.generation == self.generation {
			session.busy = false;
		}
	}
}

/// Owner of the board and driver of removal cascades.
///
/// Cloning yields another handle to the same board. At most one cascade runs
/// at a time; triggers arriving meanwhile are dropped.
#[derive(Clone)]
pub struct Cascade {
	shared: Arc<Shared>,
}

impl Cascade {
	pub fn new(animator: Arc<dyn Animator>, log: Arc<dyn LogSink>) -> Self {
		let shared = Shared {
			session: Mutex::new(Session {
				board: Board::default(),
				busy: false,
				generation: 0,
				rules: Rules::default(),
				matcher: RunMatcher::default(),
			}),
			listeners: Mutex::new(RemovalListeners::new()),
			animator,
			log,
		};
		Self { shared: Arc::new(shared) }
	}

	/// Validates `config` and rebuilds the board, seeded when `config.seed` is set.
	pub fn setup(&self, config: &GridConfig) -> Result<(), GridError> {
		let mut sampler = match config.seed {
			Some(seed) => RandomSampler::seeded(seed),
			None => RandomSampler::from_entropy(),
		};
		self.setup_with(config, &mut sampler)
	}

	pub fn setup_with(&self, config: &GridConfig, sampler: &mut dyn TypeSampler) -> Result<(), GridError> {
		config.validate()?;
		let mut board = Board::default();
		board.setup(config.width, config.height, &config.palette, sampler)?;
		self.install(board, config.rules())
	}

	/// Replaces the board wholesale. Any cascade in flight is abandoned and
	/// the busy flag is cleared.
	pub fn install(&self, board: Board, rules: Rules) -> Result<(), GridError> {
		let matcher = RunMatcher::new(rules.min_run)?;
		let abandoned = {
			let mut session = self.shared.session();
			let abandoned = session.busy;
			session.board = board;
			session.rules = rules;
			session.matcher = matcher;
			session.generation += 1;
			session.busy = false;
			abandoned
		};
		if abandoned {
			self.shared.debug(|| "Setup during a cascade; abandoning it".to_string());
		}
		Ok(())
	}

	pub fn state(&self) -> CascadeState {
		if self.shared.session().busy { CascadeState::Resolving } else { CascadeState::Idle }
	}

	pub fn is_busy(&self) -> bool {
		self.state() == CascadeState::Resolving
	}

	pub fn rules(&self) -> Rules {
		self.shared.session().rules
	}

	/// Copy of the current board.
	pub fn board(&self) -> Board {
		self.shared.session().board.clone()
	}

	pub fn with_board<R>(&self, f: impl FnOnce(&Board) -> R) -> R {
		f(&self.shared.session().board)
	}

	/// Registers an `on_tiles_removed` listener.
	pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
		self.shared.listeners().subscribe(listener)
	}

	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.shared.listeners().unsubscribe(id)
	}

	/// Runs [`Cascade::trigger`] on the tokio runtime.
	pub fn spawn_trigger(&self, at: TileCoord) -> JoinHandle<TriggerOutcome> {
		let this = self.clone();
		tokio::spawn(async move { this.trigger(at).await })
	}

	/// Removes the tile at `at` and resolves the resulting cascade.
	pub async fn trigger(&self, at: TileCoord) -> TriggerOutcome {
		let (tile, guard) = match self.begin(at) {
			Ok(started) => started,
			Err(outcome) => return outcome,
		};
		let generation = guard.generation;
		self.shared.debug(|| format!("Clicked {at}"));
		self.shared.animator.animate_removal(tile);

		let mut report = CascadeReport::new(at);
		report.removed = 1;
		self.notify(&mut report);

		let result = self.resolve(at, generation, &mut report).await;
		if let Err(CascadeAbort::Board(e)) = &result {
			debug_assert!(!e.is_invariant_violation(), "cascade from {at} broke the board: {e}");
		}
		self.finish(guard, report, result)
	}

	fn begin(&self, at: TileCoord) -> Result<(Tile, BusyGuard), TriggerOutcome> {
		let mut session = self.shared.session();
		if session.busy {
			return Err(TriggerOutcome::Ignored);
		}
		if !session.board.bounds().contains(at) {
			return Err(TriggerOutcome::Missed(GridError::OutOfBounds(at)));
		}
		let tile = session.board.remove(at).map_err(TriggerOutcome::Missed)?;
		session.busy = true;
		let guard = BusyGuard { shared: Arc::clone(&self.shared), generation: session.generation };
		Ok((tile, guard))
	}

	async fn resolve(
		&self,
		at: TileCoord,
		generation: u64,
		report: &mut CascadeReport,
	) -> Result<(), CascadeAbort> {
		let started = Instant::now();
		report.moved += gravity::compact_column(Arc::clone(&self.shared), at.x, at.y, generation).await?;
		self.shared.debug(|| format!("Move took {} ms", started.elapsed().as_millis()));

		let (rows, matcher) = {
			let session = self.shared.session();
			session.check(generation)?;
			let top = match session.rules.scan {
				ScanMode::RowsAbove => session.board.height() - 1,
				ScanMode::OriginRow => at.y,
			};
			(at.y..=top, session.matcher)
		};

		for y in rows {
			// A compaction can form a new run on the row just cleared, so settle it before moving up.
			loop {
				let started = Instant::now();
				let matches = {
					let session = self.shared.session();
					session.check(generation)?;
					matcher.scan_row(&session.board, y)
				};
				self.shared.debug(|| {
					format!(
						"Matches on row {y} took {} ms -> {} in total",
						started.elapsed().as_millis(),
						matches.len()
					)
				});
				if matches.is_empty() {
					break;
				}
				report.match_rounds += 1;
				self.notify(report);
				self.clear(&matches, generation, report)?;

				let started = Instant::now();
				report.moved += self.settle_columns(&matches, y, generation).await?;
				self.shared.debug(|| format!("Move ALL took {} ms", started.elapsed().as_millis()));
			}
		}
		Ok(())
	}

	fn clear(&self, matches: &MatchSet, generation: u64, report: &mut CascadeReport) -> Result<(), CascadeAbort> {
		let removed = {
			let mut session = self.shared.session();
			session.check(generation)?;
			let mut removed = Vec::with_capacity(matches.len());
			for c in matches.iter() {
				match session.board.remove(c) {
					Ok(tile) => removed.push(tile),
					Err(GridError::NotFound(_)) => {
						self.shared.debug(|| format!("{c} was already empty"));
					}
					Err(e) => return Err(e.into()),
				}
			}
			removed
		};
		report.removed += removed.len();
		for tile in removed {
			self.shared.animator.animate_removal(tile);
		}
		Ok(())
	}

	/// Compacts every matched column concurrently and waits for all of them.
	async fn settle_columns(&self, matches: &MatchSet, y: i32, generation: u64) -> Result<usize, CascadeAbort> {
		let mut tasks = JoinSet::new();
		for x in matches.columns() {
			tasks.spawn(gravity::compact_column(Arc::clone(&self.shared), x, y, generation));
		}

		let mut moved = 0;
		let mut failure = None;
		while let Some(joined) = tasks.join_next().await {
			match joined {
				Ok(Ok(n)) => moved += n,
				Ok(Err(abort)) => {
					failure.get_or_insert(abort);
				}
				Err(e) => {
					failure.get_or_insert(CascadeAbort::Task(e.to_string()));
				}
			}
		}
		match failure {
			Some(abort) => Err(abort),
			None => Ok(moved),
		}
	}

	fn notify(&self, report: &mut CascadeReport) {
		report.notifications += 1;
		let listeners = self.shared.listeners().snapshot();
		for listener in listeners {
			listener();
		}
	}

	fn finish(&self, guard: BusyGuard, report: CascadeReport, result: Result<(), CascadeAbort>) -> TriggerOutcome {
		let dump = self.shared.log.enabled().then(|| format_board(&self.shared.session().board));
		drop(guard);

		match result {
			Ok(()) => {
				self.shared.debug(|| {
					format!(
						"Cascade from {} settled: {} removed, {} moved, {} rounds",
						report.origin, report.removed, report.moved, report.match_rounds
					)
				});
				for line in dump.into_iter().flatten() {
					self.shared.log.log(&line);
				}
				TriggerOutcome::Settled(report)
			}
			Err(reason) => {
				self.shared.debug(|| format!("Cascade from {} aborted: {reason}", report.origin));
				TriggerOutcome::Aborted { report, reason }
			}
		}
	}
}
