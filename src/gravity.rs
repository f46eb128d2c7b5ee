use std::sync::Arc;

use crate::board::Board;
use crate::cascade::{CascadeAbort, Shared};
use crate::coords::TileCoord;
use crate::error::GridError;
use crate::tile::Tile;

/// One tile dropping a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub tile: Tile,
    pub from: TileCoord,
    pub to: TileCoord,
}

/// Moves that close the cell at (`x`, `from_row`): every tile above it drops
/// one row, lowest first. Nothing is mutated, so a rejected plan leaves the
/// column as it was.
pub fn plan_column(board: &Board, x: i32, from_row: i32) -> Result<Vec<Fall>, GridError> {
    let falls: Vec<Fall> = board
        .column_above(x, from_row)
        .into_iter()
        .map(|(from, tile)| Fall {
            tile,
            from,
            to: from.below(),
        })
        .collect();

    let mut vacated: Option<TileCoord> = None;
    for fall in &falls {
        if !board.bounds().contains(fall.to) {
            return Err(GridError::OutOfBounds(fall.to));
        }
        // Bottom-up order: each target is empty or was just left by the tile below.
        if board.is_occupied(fall.to) && vacated != Some(fall.to) {
            return Err(GridError::Conflict {
                from: fall.from,
                to: fall.to,
            });
        }
        vacated = Some(fall.from);
    }
    Ok(falls)
}

/// Compacts a column without animation. Returns the number of tiles moved.
pub fn compact_column_now(board: &mut Board, x: i32, from_row: i32) -> Result<usize, GridError> {
    let falls = plan_column(board, x, from_row)?;
    for fall in &falls {
        board.rebind(fall.from, fall.to)?;
    }
    Ok(falls.len())
}

/// Animated compaction: each tile's slide is awaited before its new
/// coordinate is committed, strictly bottom to top.
pub(crate) async fn compact_column(
    shared: Arc<Shared>,
    x: i32,
    from_row: i32,
    generation: u64,
) -> Result<usize, CascadeAbort> {
    let falls = {
        let session = shared.session();
        session.check(generation)?;
        plan_column(&session.board, x, from_row)?
    };

    for fall in &falls {
        if !shared.animator.animate_move(fall.tile, fall.to).wait().await {
            shared.debug(|| format!("{} slide to {} was dropped", fall.tile, fall.to));
        }
        let mut session = shared.session();
        session.check(generation)?;
        session.board.rebind(fall.from, fall.to)?;
    }
    Ok(falls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileType::{Blue as B, Green as G, Red as R};

    fn c(x: i32, y: i32) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn falls_are_ordered_bottom_up() {
        let mut board = Board::from_rows(&[vec![R], vec![G], vec![B]]).unwrap();
        board.remove(c(0, 0)).unwrap();
        let plan = plan_column(&board, 0, 0).unwrap();
        let moves: Vec<_> = plan.iter().map(|f| (f.from.y, f.to.y)).collect();
        assert_eq!(moves, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn compaction_preserves_order_and_vacates_top() {
        let mut board = Board::from_rows(&[vec![R], vec![G], vec![B]]).unwrap();
        board.remove(c(0, 0)).unwrap();
        assert_eq!(compact_column_now(&mut board, 0, 0).unwrap(), 2);
        assert_eq!(board.kind_at(c(0, 0)), Some(G));
        assert_eq!(board.kind_at(c(0, 1)), Some(B));
        assert!(!board.is_occupied(c(0, 2)));
        assert!(board.is_settled());
    }

    #[test]
    fn middle_removal_only_moves_tiles_above() {
        let mut board = Board::from_rows(&[vec![R], vec![G], vec![B], vec![R]]).unwrap();
        board.remove(c(0, 1)).unwrap();
        assert_eq!(compact_column_now(&mut board, 0, 1).unwrap(), 2);
        let kinds: Vec<_> = board.column_from(0, 0).into_iter().map(|(_, t)| t.kind).collect();
        assert_eq!(kinds, vec![R, B, R]);
    }

    #[test]
    fn nothing_above_is_a_noop() {
        let mut board = Board::from_rows(&[vec![R, G], vec![B, G]]).unwrap();
        board.remove(c(1, 1)).unwrap();
        assert!(plan_column(&board, 1, 1).unwrap().is_empty());
        assert_eq!(compact_column_now(&mut board, 1, 1).unwrap(), 0);
        assert_eq!(board.occupied_count(), 3);
        assert!(!board.is_occupied(c(1, 1)));
    }

    #[test]
    fn pushing_below_the_floor_is_rejected() {
        let mut board = Board::from_rows(&[vec![R], vec![G]]).unwrap();
        let before = board.snapshot();
        assert_eq!(
            compact_column_now(&mut board, 0, -1),
            Err(GridError::OutOfBounds(c(0, -1)))
        );
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn occupied_target_is_a_conflict() {
        let board = Board::from_rows(&[vec![R], vec![G]]).unwrap();
        assert_eq!(
            plan_column(&board, 0, 0),
            Err(GridError::Conflict { from: c(0, 1), to: c(0, 0) })
        );
    }
}
