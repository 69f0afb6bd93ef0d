//! Display geometries and their DDRAM addressing.

use crate::error::Error;

/// Supported display modules.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DisplayType {
    /// 16x1 module wired internally as two lines of 8 characters.
    Lcd16x1,
    /// 16x1 module with linear single-line addressing.
    Lcd16x1Linear,
    Lcd16x2,
    Lcd16x4,
    Lcd20x2,
    Lcd20x4,
    Lcd40x2,
    /// Two controllers, rows 3 and 4 alias the memory of rows 1 and 2.
    Lcd40x4,
}

impl DisplayType {
    /// Look up the module for a columns x rows pair. `rows == 0` selects the
    /// linear one-line 16 column module.
    pub fn from_size<E>(columns: u8, rows: u8) -> Result<Self, Error<E>> {
        use DisplayType::*;
        match (columns, rows) {
            (16, 0) => Ok(Lcd16x1Linear),
            (16, 1) => Ok(Lcd16x1),
            (16, 2) => Ok(Lcd16x2),
            (16, 4) => Ok(Lcd16x4),
            (20, 2) => Ok(Lcd20x2),
            (20, 4) => Ok(Lcd20x4),
            (40, 2) => Ok(Lcd40x2),
            (40, 4) => Ok(Lcd40x4),
            _ => Err(Error::UnsupportedGeometry { columns, rows }),
        }
    }
}

/// Normalized layout the controller is driven with.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Geometry {
    pub columns: u8,
    pub rows: u8,
    /// Function set line count: two-line mode when set.
    pub two_lines: bool,
    offsets: &'static [u8],
}

impl Geometry {
    /// DDRAM base address of every row.
    pub fn offsets(&self) -> &'static [u8] {
        self.offsets
    }

    /// DDRAM address of a position, wrapping both coordinates.
    pub fn address(&self, column: u8, row: u8) -> u8 {
        self.offsets[(row % self.rows) as usize] + column % self.columns
    }

    pub fn wrap(&self, column: u8, row: u8) -> (u8, u8) {
        (column % self.columns, row % self.rows)
    }
}

impl From<DisplayType> for Geometry {
    fn from(display: DisplayType) -> Self {
        use DisplayType::*;
        let (columns, offsets): (u8, &'static [u8]) = match display {
            Lcd16x1 => (8, &[0x00, 0x40]),
            Lcd16x1Linear => (16, &[0x00]),
            Lcd16x2 => (16, &[0x00, 0x40]),
            Lcd16x4 => (16, &[0x00, 0x40, 0x10, 0x50]),
            Lcd20x2 => (20, &[0x00, 0x40]),
            Lcd20x4 => (20, &[0x00, 0x40, 0x14, 0x54]),
            Lcd40x2 => (40, &[0x00, 0x40]),
            Lcd40x4 => (40, &[0x00, 0x40, 0x00, 0x40]),
        };
        let rows = offsets.len() as u8;
        Geometry {
            columns,
            rows,
            two_lines: rows > 1,
            offsets,
        }
    }
}
