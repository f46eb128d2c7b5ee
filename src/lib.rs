pub mod animation;
pub mod board;
pub mod cascade;
pub mod config;
pub mod console;
pub mod coords;
pub mod error;
pub mod events;
pub mod gravity;
pub mod hud;
pub mod matcher;
pub mod tile;

// Re-exports for convenience in tests and integration users.
pub use animation::{Animator, InstantAnimator, MoveDone, MoveSignal, TimedAnimator};
pub use board::{Board, BoardSnapshot};
pub use cascade::{Cascade, CascadeAbort, CascadeReport, CascadeState, TriggerOutcome};
pub use config::{GridConfig, Rules, ScanMode};
pub use console::{ConsoleLog, LogSink, SilentLog, StderrLog};
pub use coords::{GridBounds, TileCoord};
pub use error::GridError;
pub use events::{RemovalListeners, SubscriptionId};
pub use gravity::{Fall, compact_column_now, plan_column};
pub use hud::{format_board, format_status};
pub use matcher::{MatchSet, RunMatcher};
pub use tile::{RandomSampler, ScriptedSampler, Tile, TileId, TileType, TypeSampler};
