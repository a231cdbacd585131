//! Logical isometric map: one [`LogicalCell`] per (col, row).
//!
//! The grid is filled once by a map producer (see [`super::generator`]) and
//! is read-only from the moment compilation starts.

use thiserror::Error;

/// Default elevation cap, in side-face units.
pub const MAX_HEIGHT: u8 = 4;

/// Top-face material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ground {
    #[default]
    Grass,
    Stone,
    Dirt,
    Water,
    Roof,
}

/// Side-face material. Independent of [`Ground`], same cardinality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Grass,
    Stone,
    Dirt,
    Water,
    Roof,
}

impl Ground {
    pub const ALL: [Ground; 5] = [
        Ground::Grass,
        Ground::Stone,
        Ground::Dirt,
        Ground::Water,
        Ground::Roof,
    ];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The side material a producer would naturally pair with this ground.
    pub fn natural_side(self) -> Side {
        match self {
            Ground::Grass | Ground::Dirt => Side::Dirt,
            Ground::Stone | Ground::Roof => Side::Stone,
            Ground::Water => Side::Water,
        }
    }
}

impl Side {
    pub const ALL: [Side; 5] = [Side::Grass, Side::Stone, Side::Dirt, Side::Water, Side::Roof];

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// One map entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LogicalCell {
    pub ground: Ground,
    pub side: Side,
    /// Stacked elevation in side-face units, `0 ..= max_height`.
    pub height: u8,
}

impl LogicalCell {
    pub fn flat(ground: Ground) -> Self {
        Self {
            ground,
            side: ground.natural_side(),
            height: 0,
        }
    }

    pub fn raised(ground: Ground, side: Side, height: u8) -> Self {
        Self {
            ground,
            side,
            height,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("cell ({col}, {row}) outside {cols}x{rows} map")]
    OutOfRange {
        col: usize,
        row: usize,
        cols: usize,
        rows: usize,
    },

    #[error("cell ({col}, {row}) height {height} exceeds max height {max}")]
    TooHigh {
        col: usize,
        row: usize,
        height: u8,
        max: u8,
    },

    #[error("row {row} has {len} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("map must have at least one row and one column")]
    Empty,
}

/// Dense row-major `cols × rows` cell grid.
#[derive(Clone, Debug)]
pub struct IsoMap {
    cols: usize,
    rows: usize,
    max_height: u8,
    cells: Vec<LogicalCell>,
}

impl IsoMap {
    /// Flat grass map.
    pub fn new(cols: usize, rows: usize, max_height: u8) -> Result<Self, MapError> {
        if cols == 0 || rows == 0 {
            return Err(MapError::Empty);
        }
        Ok(Self {
            cols,
            rows,
            max_height,
            cells: vec![LogicalCell::flat(Ground::Grass); cols * rows],
        })
    }

    /// Build from `rows[row][col]`, validating every cell.
    pub fn from_rows(rows: Vec<Vec<LogicalCell>>, max_height: u8) -> Result<Self, MapError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut map = Self::new(cols, rows.len(), max_height)?;
        for (r, line) in rows.into_iter().enumerate() {
            if line.len() != cols {
                return Err(MapError::RaggedRow {
                    row: r,
                    len: line.len(),
                    expected: cols,
                });
            }
            for (c, cell) in line.into_iter().enumerate() {
                map.set(c, r, cell)?;
            }
        }
        Ok(map)
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn max_height(&self) -> u8 {
        self.max_height
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> Option<&LogicalCell> {
        if col < self.cols && row < self.rows {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn set(&mut self, col: usize, row: usize, cell: LogicalCell) -> Result<(), MapError> {
        if col >= self.cols || row >= self.rows {
            return Err(MapError::OutOfRange {
                col,
                row,
                cols: self.cols,
                rows: self.rows,
            });
        }
        if cell.height > self.max_height {
            return Err(MapError::TooHigh {
                col,
                row,
                height: cell.height,
                max: self.max_height,
            });
        }
        self.cells[row * self.cols + col] = cell;
        Ok(())
    }

    /// Tallest cell actually present (≤ `max_height`).
    pub fn tallest(&self) -> u8 {
        self.cells.iter().map(|c| c.height).max().unwrap_or(0)
    }
}
