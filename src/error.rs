use thiserror::Error;

/// Errors returned by the driver. `E` is the error type of the port expander.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum Error<E> {
    #[error("unsupported display geometry {columns}x{rows}")]
    UnsupportedGeometry { columns: u8, rows: u8 },
    #[error("row {row} out of range, display has {rows} rows")]
    RowOutOfRange { row: u8, rows: u8 },
    #[error("column {column} out of range, display has {columns} columns")]
    ColumnOutOfRange { column: u8, columns: u8 },
    #[error("glyph index {0} out of range")]
    GlyphOutOfRange(u8),
    #[error("buffer too small, {needed} bytes required")]
    BufferTooSmall { needed: usize },
    #[error("display not initialized")]
    NotInitialized,
    #[error("busy flag did not clear")]
    BusyTimeout,
    #[error("port expander bus fault: {0:?}")]
    Bus(E),
}
