use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::coords::TileCoord;
use crate::tile::{Tile, TileType};

/// Completion signal handed back by [`Animator::animate_move`].
#[derive(Debug)]
pub struct MoveSignal(Option<oneshot::Receiver<()>>);

/// Sender half of a pending [`MoveSignal`].
#[derive(Debug)]
pub struct MoveDone(oneshot::Sender<()>);

impl MoveSignal {
	/// A move that is already finished.
	pub fn done() -> Self {
		Self(None)
	}

	pub fn pending() -> (MoveDone, Self) {
		let (tx, rx) = oneshot::channel();
		(MoveDone(tx), Self(Some(rx)))
	}

	/// Waits for the move. Returns false when the animator dropped the signal
	/// without finishing it; the move counts as over either way.
	pub async fn wait(self) -> bool {
		match self.0 {
			None => true,
			Some(rx) => rx.await.is_ok(),
		}
	}
}

impl MoveDone {
	pub fn finish(self) {
		let _ = self.0.send(());
	}
}

/// Presentation-side effects requested by the cascade.
pub trait Animator: Send + Sync {
	/// Slide `tile` to `target`. The cascade waits on the returned signal
	/// before committing the tile's new coordinate.
	fn animate_move(&self, tile: Tile, target: TileCoord) -> MoveSignal;

	/// Visual removal. Fire and forget.
	fn animate_removal(&self, _tile: Tile) {}
}

/// Completes every move immediately and counts requests.
#[derive(Debug, Default)]
pub struct InstantAnimator {
	moves: AtomicUsize,
	removals: AtomicUsize,
}

impl InstantAnimator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn moves(&self) -> usize {
		self.moves.load(Ordering::Relaxed)
	}

	pub fn removals(&self) -> usize {
		self.removals.load(Ordering::Relaxed)
	}
}

impl Animator for InstantAnimator {
	fn animate_move(&self, _tile: Tile, _target: TileCoord) -> MoveSignal {
		self.moves.fetch_add(1, Ordering::Relaxed);
		MoveSignal::done()
	}

	fn animate_removal(&self, _tile: Tile) {
		self.removals.fetch_add(1, Ordering::Relaxed);
	}
}

/// Finishes each move once its duration has elapsed on the tokio clock.
/// Must be used from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct TimedAnimator {
	default: Duration,
	per_type: HashMap<TileType, Duration>,
}

impl TimedAnimator {
	pub fn new(default: Duration) -> Self {
		Self { default, per_type: HashMap::new() }
	}

	pub fn with_duration(mut self, kind: TileType, duration: Duration) -> Self {
		self.per_type.insert(kind, duration);
		self
	}

	pub fn duration_for(&self, kind: TileType) -> Duration {
		self.per_type.get(&kind).copied().unwrap_or(self.default)
	}
}

impl Animator for TimedAnimator {
	fn animate_move(&self, tile: Tile, _target: TileCoord) -> MoveSignal {
		let duration = self.duration_for(tile.kind);
		if duration.is_zero() {
			return MoveSignal::done();
		}
		let (done, signal) = MoveSignal::pending();
		tokio::spawn(async move {
			tokio::time::sleep(duration).await;
			done.finish();
		});
		signal
	}
}
