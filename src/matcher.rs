use std::collections::BTreeSet;

use crate::board::Board;
use crate::config::MIN_RUN_FLOOR;
use crate::coords::TileCoord;
use crate::error::GridError;
use crate::tile::TileType;

/// Coordinates cleared by one matching pass. Ordered by column, then row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet(BTreeSet<TileCoord>);

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, c: TileCoord) -> bool {
        self.0.contains(&c)
    }

    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.0.iter().copied()
    }

    /// Distinct columns touched by the set, ascending.
    pub fn columns(&self) -> BTreeSet<i32> {
        self.0.iter().map(|c| c.x).collect()
    }

    pub fn union(&mut self, other: MatchSet) {
        self.0.extend(other.0);
    }
}

impl FromIterator<TileCoord> for MatchSet {
    fn from_iter<I: IntoIterator<Item = TileCoord>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for MatchSet {
    type Item = TileCoord;
    type IntoIter = std::collections::btree_set::IntoIter<TileCoord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Finds runs of identical adjacent tile types in one line of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunMatcher {
    min_run: usize,
}

impl Default for RunMatcher {
    fn default() -> Self {
        Self { min_run: MIN_RUN_FLOOR }
    }
}

impl RunMatcher {
    pub fn new(min_run: usize) -> Result<Self, GridError> {
        if min_run < MIN_RUN_FLOOR {
            return Err(GridError::Configuration(format!(
                "min_run must be at least {MIN_RUN_FLOOR}, got {min_run}"
            )));
        }
        Ok(Self { min_run })
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    /// Scans `line` (ascending order along a row or a column) and returns every
    /// coordinate that belongs to a run of at least `min_run` equal types.
    ///
    /// A run only continues across tiles whose coordinates are physically
    /// adjacent, so a line with a hole never bridges the gap.
    pub fn find_runs(&self, line: &[(TileCoord, TileType)]) -> MatchSet {
        let mut matched = MatchSet::default();
        let mut start = 0;
        for i in 1..=line.len() {
            let continues = i < line.len()
                && line[i].1 == line[i - 1].1
                && line[i].0.follows(line[i - 1].0);
            if continues {
                continue;
            }
            if i - start >= self.min_run {
                matched.0.extend(line[start..i].iter().map(|(c, _)| *c));
            }
            start = i;
        }
        matched
    }

    /// Runs along row `y` as the board currently holds it.
    pub fn scan_row(&self, board: &Board, y: i32) -> MatchSet {
        let line: Vec<_> = board.row(y).into_iter().map(|(c, t)| (c, t.kind)).collect();
        self.find_runs(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileType::{Blue as B, Green as G, Red as R};

    fn row_of(kinds: &[TileType]) -> Vec<(TileCoord, TileType)> {
        kinds
            .iter()
            .enumerate()
            .map(|(x, k)| (TileCoord::new(x as i32, 0), *k))
            .collect()
    }

    fn xs(set: &MatchSet) -> Vec<i32> {
        set.iter().map(|c| c.x).collect()
    }

    #[test]
    fn threshold_floor() {
        assert!(RunMatcher::new(2).is_err());
        assert_eq!(RunMatcher::new(4).unwrap().min_run(), 4);
        assert_eq!(RunMatcher::default().min_run(), 3);
    }

    #[test]
    fn short_trailing_run_is_ignored() {
        let m = RunMatcher::default();
        let set = m.find_runs(&row_of(&[R, R, R, G, G]));
        assert_eq!(xs(&set), vec![0, 1, 2]);
    }

    #[test]
    fn long_run_matches_every_tile() {
        let m = RunMatcher::default();
        assert_eq!(m.find_runs(&row_of(&[G, G, G, G, G])).len(), 5);
    }

    #[test]
    fn separate_runs_are_unioned() {
        let m = RunMatcher::default();
        let set = m.find_runs(&row_of(&[R, R, R, B, G, G, G]));
        assert_eq!(xs(&set), vec![0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn interrupted_same_type_does_not_merge() {
        let m = RunMatcher::default();
        assert!(m.find_runs(&row_of(&[R, R, G, R, R])).is_empty());
    }

    #[test]
    fn gap_breaks_a_run() {
        let m = RunMatcher::default();
        let line = vec![
            (TileCoord::new(0, 0), R),
            (TileCoord::new(1, 0), R),
            (TileCoord::new(3, 0), R),
        ];
        assert!(m.find_runs(&line).is_empty());
    }

    #[test]
    fn column_lines_are_supported() {
        let m = RunMatcher::default();
        let line: Vec<_> = (0..3).map(|y| (TileCoord::new(2, y), B)).collect();
        assert_eq!(m.find_runs(&line).columns().into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn empty_and_stable_rows_give_the_same_empty_result() {
        let m = RunMatcher::default();
        assert!(m.find_runs(&[]).is_empty());
        let row = row_of(&[R, G, R, G]);
        assert_eq!(m.find_runs(&row), m.find_runs(&row));
        assert!(m.find_runs(&row).is_empty());
    }

    #[test]
    fn higher_threshold() {
        let m = RunMatcher::new(4).unwrap();
        assert!(m.find_runs(&row_of(&[R, R, R, G])).is_empty());
        assert_eq!(m.find_runs(&row_of(&[B, R, R, R, R])).len(), 4);
    }

    #[test]
    fn scan_row_reads_board() {
        let board = Board::from_rows(&[vec![R, R, R, B, R], vec![G, B, G, B, G]]).unwrap();
        let m = RunMatcher::default();
        assert_eq!(xs(&m.scan_row(&board, 0)), vec![0, 1, 2]);
        assert!(m.scan_row(&board, 1).is_empty());
    }
}
