use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid position: `x` is the column (left to right), `y` the row (bottom to top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one row down.
    pub fn below(self) -> Self {
        Self { x: self.x, y: self.y - 1 }
    }

    pub fn above(self) -> Self {
        Self { x: self.x, y: self.y + 1 }
    }

    /// True when `self` sits directly after `prev` along a row or a column.
    pub fn follows(self, prev: TileCoord) -> bool {
        (self.y == prev.y && self.x == prev.x + 1) || (self.x == prev.x && self.y == prev.y + 1)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, c: TileCoord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Every point of the grid, column by column, bottom to top inside a column.
    pub fn iter_points(self) -> impl Iterator<Item = TileCoord> {
        let width = self.width.max(0);
        let height = self.height.max(0);
        (0..width).flat_map(move |x| (0..height).map(move |y| TileCoord { x, y }))
    }
}
