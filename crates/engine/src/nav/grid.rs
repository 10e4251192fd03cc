use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Wall,
    Ground,
    /// Decorative trail tile; behaves like `Ground` for every navigation rule.
    Path,
}

impl TileKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(TileKind::Wall),
            'G' => Some(TileKind::Ground),
            'P' => Some(TileKind::Path),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            TileKind::Wall => 'W',
            TileKind::Ground => 'G',
            TileKind::Path => 'P',
        }
    }

    pub fn is_ground_class(self) -> bool {
        matches!(self, TileKind::Ground | TileKind::Path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    pub fn manhattan(self, other: TileCoord) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Expansion order used by path search. Ties between equal-length routes
    /// resolve toward whichever neighbour was enqueued first.
    pub const SEARCH_ORDER: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("tile grid must have at least one row and one column")]
    Empty,
    #[error("tile grid row {row} has {actual} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown tile code '{code}' at ({x}, {y})")]
    UnknownTileCode { code: char, x: usize, y: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    cols: usize,
    rows: usize,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    pub fn new(rows: Vec<Vec<TileKind>>) -> Result<Self, GridError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(GridError::Ragged {
                    row: row_index,
                    expected,
                    actual: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }

        Ok(Self {
            cols: expected,
            rows: rows.len(),
            tiles,
        })
    }

    pub fn parse<S: AsRef<str>>(layout: &[S]) -> Result<Self, GridError> {
        let mut rows = Vec::with_capacity(layout.len());
        for (y, line) in layout.iter().enumerate() {
            let mut row = Vec::with_capacity(line.as_ref().len());
            for (x, code) in line.as_ref().chars().enumerate() {
                let kind = TileKind::from_code(code)
                    .ok_or(GridError::UnknownTileCode { code, x, y })?;
                row.push(kind);
            }
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        self.index_of(coord).is_some()
    }

    pub fn tile_at(&self, coord: TileCoord) -> Option<TileKind> {
        self.index_of(coord).map(|index| self.tiles[index])
    }

    pub fn is_ground_class(&self, coord: TileCoord) -> bool {
        self.tile_at(coord).is_some_and(TileKind::is_ground_class)
    }

    pub(crate) fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        let (x, y) = (coord.x as usize, coord.y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }

    pub(crate) fn coord_of(&self, index: usize) -> TileCoord {
        TileCoord {
            x: (index % self.cols) as i32,
            y: (index / self.cols) as i32,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn row_codes(&self, y: usize) -> Option<String> {
        if y >= self.rows {
            return None;
        }
        let start = y * self.cols;
        Some(
            self.tiles[start..start + self.cols]
                .iter()
                .map(|kind| kind.code())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_rectangular_grid() {
        let grid = TileGrid::parse(&["WWW", "WGP", "WWW"]).expect("grid");
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.tile_at(TileCoord::new(1, 1)), Some(TileKind::Ground));
        assert_eq!(grid.tile_at(TileCoord::new(2, 1)), Some(TileKind::Path));
        assert_eq!(grid.row_codes(1).as_deref(), Some("WGP"));
    }

    #[test]
    fn rejects_empty_and_ragged_layouts() {
        let empty: [&str; 0] = [];
        assert_eq!(TileGrid::parse(&empty), Err(GridError::Empty));
        assert_eq!(TileGrid::parse(&[""]), Err(GridError::Empty));
        assert_eq!(
            TileGrid::parse(&["WWW", "WG"]),
            Err(GridError::Ragged {
                row: 1,
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_unknown_tile_codes() {
        assert_eq!(
            TileGrid::parse(&["WGW", "WXW"]),
            Err(GridError::UnknownTileCode {
                code: 'X',
                x: 1,
                y: 1
            })
        );
    }

    #[test]
    fn negative_and_overflowing_coords_are_out_of_bounds() {
        let grid = TileGrid::parse(&["GG", "GG"]).expect("grid");
        for coord in [
            TileCoord::new(-1, 0),
            TileCoord::new(0, -1),
            TileCoord::new(2, 0),
            TileCoord::new(0, 2),
        ] {
            assert!(!grid.in_bounds(coord), "coord={coord}");
            assert_eq!(grid.tile_at(coord), None);
        }
    }

    #[test]
    fn path_tiles_are_ground_class() {
        assert!(TileKind::Path.is_ground_class());
        assert!(TileKind::Ground.is_ground_class());
        assert!(!TileKind::Wall.is_ground_class());
    }

    #[test]
    fn step_applies_unit_offsets() {
        let origin = TileCoord::new(2, 2);
        assert_eq!(origin.step(Direction::Up), TileCoord::new(2, 1));
        assert_eq!(origin.step(Direction::Down), TileCoord::new(2, 3));
        assert_eq!(origin.step(Direction::Left), TileCoord::new(1, 2));
        assert_eq!(origin.step(Direction::Right), TileCoord::new(3, 2));
    }
}
