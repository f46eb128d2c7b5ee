use crate::board::Board;
use crate::cascade::CascadeState;
use crate::coords::TileCoord;

/// Text rows of the board, top row first; empty cells print as `.`.
pub fn format_board(board: &Board) -> Vec<String> {
	(0..board.height())
		.rev()
		.map(|y| {
			(0..board.width())
				.map(|x| board.kind_at(TileCoord { x, y }).map(|k| k.symbol()).unwrap_or('.'))
				.map(String::from)
				.collect::<Vec<_>>()
				.join(" ")
		})
		.collect()
}

pub fn format_status(state: CascadeState, board: &Board) -> String {
	let state = match state {
		CascadeState::Idle => "Idle",
		CascadeState::Resolving => "Resolving...",
	};
	format!(
		"{} | Tiles: {}/{} | Grid {}x{}",
		state,
		board.occupied_count(),
		board.bounds().area(),
		board.width(),
		board.height()
	)
}
