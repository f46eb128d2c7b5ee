use serde::{Deserialize, Serialize};

use crate::config::validate_palette;
use crate::coords::{GridBounds, TileCoord};
use crate::error::GridError;
use crate::tile::{Tile, TileId, TileType, TypeSampler};

/// Tile occupancy of the grid.
///
/// Tiles live in an arena indexed by [`TileId`]; `cells` maps every grid
/// point to the tile resting there, and `positions` is the reverse index.
/// The board is the single source of truth for what occupies a coordinate.
#[derive(Debug, Clone, Default)]
pub struct Board {
    bounds: GridBounds,
    cells: Vec<Option<TileId>>,
    tiles: Vec<Tile>,
    positions: Vec<Option<TileCoord>>,
}

/// Plain copy of the board contents. `cells` is row-major, row 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Option<TileType>>,
}

impl Board {
    fn empty_grid(width: i32, height: i32) -> Result<Self, GridError> {
        if width < 1 || height < 1 {
            return Err(GridError::Configuration(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let bounds = GridBounds::new(width, height);
        Ok(Self {
            bounds,
            cells: vec![None; bounds.area()],
            tiles: Vec::with_capacity(bounds.area()),
            positions: Vec::with_capacity(bounds.area()),
        })
    }

    /// Clears the board and fills every cell with a tile drawn from `palette`.
    /// Cells are filled column by column, bottom to top.
    pub fn setup(
        &mut self,
        width: i32,
        height: i32,
        palette: &[TileType],
        sampler: &mut dyn TypeSampler,
    ) -> Result<(), GridError> {
        validate_palette(palette)?;
        let mut fresh = Self::empty_grid(width, height)?;
        for c in fresh.bounds.iter_points() {
            let kind = sampler.pick(palette);
            fresh.place(c, kind);
        }
        *self = fresh;
        Ok(())
    }

    /// Builds a fully occupied board; `rows[0]` is the bottom row.
    pub fn from_rows(rows: &[Vec<TileType>]) -> Result<Self, GridError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as i32;
        let cells = rows
            .iter()
            .map(|r| {
                if r.len() as i32 != width {
                    return Err(GridError::Configuration("rows have different lengths".into()));
                }
                Ok(r.iter().copied().map(Some).collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        Self::from_snapshot(&BoardSnapshot {
            width,
            height: rows.len() as i32,
            cells,
        })
    }

    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, GridError> {
        let mut board = Self::empty_grid(snapshot.width, snapshot.height)?;
        if snapshot.cells.len() != board.bounds.area() {
            return Err(GridError::Configuration(format!(
                "snapshot has {} cells for a {}x{} grid",
                snapshot.cells.len(),
                snapshot.width,
                snapshot.height
            )));
        }
        // Allocate ids in the same column-major order as `setup`.
        for c in board.bounds.iter_points() {
            let idx = (c.y * snapshot.width + c.x) as usize;
            if let Some(kind) = snapshot.cells[idx] {
                board.place(c, kind);
            }
        }
        Ok(board)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut cells = Vec::with_capacity(self.bounds.area());
        for y in 0..self.bounds.height {
            for x in 0..self.bounds.width {
                cells.push(self.get(TileCoord { x, y }).map(|t| t.kind));
            }
        }
        BoardSnapshot {
            width: self.bounds.width,
            height: self.bounds.height,
            cells,
        }
    }

    fn place(&mut self, c: TileCoord, kind: TileType) {
        let id = TileId(self.tiles.len() as u32);
        self.tiles.push(Tile { id, kind });
        self.positions.push(Some(c));
        if let Some(i) = self.index(c) {
            self.cells[i] = Some(id);
        }
    }

    pub fn width(&self) -> i32 {
        self.bounds.width
    }
    pub fn height(&self) -> i32 {
        self.bounds.height
    }
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    fn index(&self, c: TileCoord) -> Option<usize> {
        if !self.bounds.contains(c) {
            return None;
        }
        Some((c.y * self.bounds.width + c.x) as usize)
    }

    pub fn get(&self, c: TileCoord) -> Option<Tile> {
        let id = self.cells[self.index(c)?]?;
        self.tile(id)
    }

    pub fn kind_at(&self, c: TileCoord) -> Option<TileType> {
        self.get(c).map(|t| t.kind)
    }

    pub fn is_occupied(&self, c: TileCoord) -> bool {
        self.get(c).is_some()
    }

    pub fn tile(&self, id: TileId) -> Option<Tile> {
        self.tiles.get(id.0 as usize).copied()
    }

    /// Where the tile currently rests, `None` once it has been removed.
    pub fn position_of(&self, id: TileId) -> Option<TileCoord> {
        self.positions.get(id.0 as usize).copied().flatten()
    }

    /// Deletes the occupancy entry at `c`.
    pub fn remove(&mut self, c: TileCoord) -> Result<Tile, GridError> {
        let i = self.index(c).ok_or(GridError::NotFound(c))?;
        let id = self.cells[i].take().ok_or(GridError::NotFound(c))?;
        self.positions[id.0 as usize] = None;
        self.tile(id).ok_or(GridError::NotFound(c))
    }

    /// Moves the tile at `from` to `to`. The target must be inside the grid and empty.
    pub fn rebind(&mut self, from: TileCoord, to: TileCoord) -> Result<(), GridError> {
        let dst = self.index(to).ok_or(GridError::OutOfBounds(to))?;
        let src = self.index(from).ok_or(GridError::OutOfBounds(from))?;
        let id = self.cells[src].ok_or(GridError::NotFound(from))?;
        match self.cells[dst] {
            Some(other) if other != id => return Err(GridError::Conflict { from, to }),
            _ => {}
        }
        self.cells[src] = None;
        self.cells[dst] = Some(id);
        self.positions[id.0 as usize] = Some(to);
        Ok(())
    }

    /// Tiles in column `x` strictly above row `y`, lowest first.
    pub fn column_above(&self, x: i32, y: i32) -> Vec<(TileCoord, Tile)> {
        self.column_from(x, y.saturating_add(1))
    }

    /// Tiles in column `x` at row `y` or higher, lowest first.
    pub fn column_from(&self, x: i32, y: i32) -> Vec<(TileCoord, Tile)> {
        (y.max(0)..self.bounds.height)
            .map(|row| TileCoord { x, y: row })
            .filter_map(|c| self.get(c).map(|t| (c, t)))
            .collect()
    }

    /// Tiles in row `y`, left to right, skipping empty cells.
    pub fn row(&self, y: i32) -> Vec<(TileCoord, Tile)> {
        (0..self.bounds.width)
            .map(|x| TileCoord { x, y })
            .filter_map(|c| self.get(c).map(|t| (c, t)))
            .collect()
    }

    pub fn occupied(&self) -> impl Iterator<Item = (TileCoord, Tile)> + '_ {
        self.bounds
            .iter_points()
            .filter_map(|c| self.get(c).map(|t| (c, t)))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Every coordinate of a non-empty grid holds a tile.
    pub fn is_full(&self) -> bool {
        !self.bounds.is_empty() && self.cells.iter().all(|c| c.is_some())
    }

    /// No tile rests above an empty cell in its column.
    pub fn is_settled(&self) -> bool {
        (0..self.bounds.width).all(|x| {
            let mut gap = false;
            for y in 0..self.bounds.height {
                let occupied = self.is_occupied(TileCoord { x, y });
                if occupied && gap {
                    return false;
                }
                gap |= !occupied;
            }
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{RandomSampler, ScriptedSampler};
    use crate::tile::TileType::{Blue as B, Green as G, Red as R};

    fn c(x: i32, y: i32) -> TileCoord {
        TileCoord::new(x, y)
    }

    #[test]
    fn setup_fills_every_cell() {
        let mut board = Board::default();
        assert!(!board.is_full());
        board
            .setup(4, 3, &[R, G, B], &mut RandomSampler::seeded(1))
            .unwrap();
        assert!(board.is_full());
        assert_eq!(board.occupied_count(), 12);
        assert!(board.occupied().all(|(_, t)| [R, G, B].contains(&t.kind)));
    }

    #[test]
    fn setup_order_is_column_major() {
        let mut board = Board::default();
        let mut s = ScriptedSampler::new(vec![R, G, B, R]);
        board.setup(2, 2, &[R, G, B], &mut s).unwrap();
        assert_eq!(board.kind_at(c(0, 0)), Some(R));
        assert_eq!(board.kind_at(c(0, 1)), Some(G));
        assert_eq!(board.kind_at(c(1, 0)), Some(B));
        assert_eq!(board.get(c(1, 1)).unwrap().id, TileId(3));
    }

    #[test]
    fn setup_rejects_bad_input_and_keeps_old_board() {
        let mut board = Board::from_rows(&[vec![R, G]]).unwrap();
        let mut s = RandomSampler::seeded(3);
        assert!(matches!(board.setup(0, 4, &[R], &mut s), Err(GridError::Configuration(_))));
        assert!(matches!(board.setup(4, 0, &[R], &mut s), Err(GridError::Configuration(_))));
        assert!(matches!(board.setup(4, 4, &[], &mut s), Err(GridError::Configuration(_))));
        assert_eq!(board.width(), 2);
        assert!(board.is_full());
    }

    #[test]
    fn remove_reports_not_found_on_second_call() {
        let mut board = Board::from_rows(&[vec![R, G, B]]).unwrap();
        let t = board.remove(c(1, 0)).unwrap();
        assert_eq!(t.kind, G);
        assert_eq!(board.position_of(t.id), None);
        assert_eq!(board.remove(c(1, 0)), Err(GridError::NotFound(c(1, 0))));
        assert_eq!(board.remove(c(9, 0)), Err(GridError::NotFound(c(9, 0))));
    }

    #[test]
    fn rebind_moves_and_tracks_position() {
        let mut board = Board::from_rows(&[vec![R], vec![G]]).unwrap();
        board.remove(c(0, 0)).unwrap();
        let green = board.get(c(0, 1)).unwrap();
        board.rebind(c(0, 1), c(0, 0)).unwrap();
        assert_eq!(board.get(c(0, 0)), Some(green));
        assert!(!board.is_occupied(c(0, 1)));
        assert_eq!(board.position_of(green.id), Some(c(0, 0)));
    }

    #[test]
    fn rebind_rejects_occupied_and_out_of_bounds_targets() {
        let mut board = Board::from_rows(&[vec![R], vec![G]]).unwrap();
        assert_eq!(
            board.rebind(c(0, 1), c(0, 0)),
            Err(GridError::Conflict { from: c(0, 1), to: c(0, 0) })
        );
        assert_eq!(board.rebind(c(0, 0), c(0, -1)), Err(GridError::OutOfBounds(c(0, -1))));
        assert_eq!(board.kind_at(c(0, 0)), Some(R));
        assert_eq!(board.kind_at(c(0, 1)), Some(G));
    }

    #[test]
    fn column_and_row_queries_are_ordered() {
        let board = Board::from_rows(&[vec![R, G], vec![B, R], vec![G, G]]).unwrap();
        let above: Vec<_> = board.column_above(0, 0).into_iter().map(|(p, t)| (p, t.kind)).collect();
        assert_eq!(above, vec![(c(0, 1), B), (c(0, 2), G)]);
        assert_eq!(board.column_from(1, 1).len(), 2);
        assert!(board.column_above(0, 2).is_empty());
        let row: Vec<_> = board.row(1).into_iter().map(|(p, _)| p.x).collect();
        assert_eq!(row, vec![0, 1]);
    }

    #[test]
    fn row_skips_holes() {
        let mut board = Board::from_rows(&[vec![R, G, B]]).unwrap();
        board.remove(c(1, 0)).unwrap();
        let xs: Vec<_> = board.row(0).into_iter().map(|(p, _)| p.x).collect();
        assert_eq!(xs, vec![0, 2]);
    }

    #[test]
    fn settled_detects_floating_tiles() {
        let mut board = Board::from_rows(&[vec![R, G], vec![B, R]]).unwrap();
        assert!(board.is_settled());
        board.remove(c(1, 1)).unwrap();
        assert!(board.is_settled());
        board.remove(c(0, 0)).unwrap();
        assert!(!board.is_settled());
    }

    #[test]
    fn snapshot_restores_holes() {
        let snap = BoardSnapshot {
            width: 2,
            height: 2,
            cells: vec![Some(R), Some(G), Some(B), None],
        };
        let board = Board::from_snapshot(&snap).unwrap();
        assert_eq!(board.kind_at(c(0, 1)), Some(B));
        assert!(!board.is_occupied(c(1, 1)));
        assert_eq!(board.snapshot(), snap);
        let bad = BoardSnapshot { cells: vec![None], ..snap };
        assert!(Board::from_snapshot(&bad).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(Board::from_rows(&[vec![R, G], vec![B]]).is_err());
        assert!(Board::from_rows(&[]).is_err());
    }
}
