use thiserror::Error;

use crate::coords::TileCoord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
	#[error("Invalid grid configuration: {0}")]
	Configuration(String),
	#[error("No tile at {0}")]
	NotFound(TileCoord),
	#[error("Coordinate {0} is outside the grid")]
	OutOfBounds(TileCoord),
	#[error("Cannot move tile from {from} to {to}: target is occupied")]
	Conflict { from: TileCoord, to: TileCoord },
}

impl GridError {
	/// Errors that indicate a defect in move planning rather than bad input.
	pub fn is_invariant_violation(&self) -> bool {
		matches!(self, GridError::OutOfBounds(_) | GridError::Conflict { .. })
	}
}
