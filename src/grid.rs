use thiserror::Error;

/// Number of rows the input table is built with
pub const DEFAULT_ROWS: usize = 30;
/// Number of columns the input table is built with
pub const DEFAULT_COLS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must have at least one row and one column (got {rows}x{cols})")]
    EmptyDimensions { rows: usize, cols: usize },
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("table data is not a list of string rows: {0}")]
    Decode(String),
}

/// Fixed-size table of editable text cells
///
/// Cells are stored row-major in a single vector. The dimensions are set
/// once by [`Grid::create`] and never change afterwards; every write that
/// falls outside them is either rejected ([`Grid::set`]) or skipped by the
/// caller (see `paste::distribute`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<String>,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![String::new(); DEFAULT_ROWS * DEFAULT_COLS],
        }
    }
}

impl Grid {
    /// Build the input table
    ///
    /// Creates `rows` x `cols` independent cells, each holding an empty
    /// string. This is the only constructor; there is no way to resize a
    /// grid once it exists.
    ///
    /// # Arguments
    /// * `rows` - Number of row containers
    /// * `cols` - Number of cells per row
    ///
    /// # Returns
    /// * `Result<Grid, GridError>` - The empty grid, or `EmptyDimensions`
    ///   when either dimension is zero
    pub fn create(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyDimensions { rows, cols });
        }

        log::debug!("building {}x{} input grid", rows, cols);
        Ok(Grid {
            rows,
            cols,
            cells: vec![String::new(); rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        if !self.contains(row, col) {
            return None;
        }
        Some(self.cells[self.index(row, col)].as_str())
    }

    /// Overwrite one cell, as typing into it would.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<(), GridError> {
        if !self.contains(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let index = self.index(row, col);
        self.cells[index] = value.into();
        Ok(())
    }

    /// Write a cell the caller has already bounds-checked; panics otherwise.
    pub(crate) fn overwrite(&mut self, row: usize, col: usize, value: &str) {
        debug_assert!(self.contains(row, col));
        let index = self.index(row, col);
        self.cells[index] = value.to_string();
    }

    /// Iterate over the rows in document order, each as a slice of cells.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.cols)
    }

    /// Copy every cell value, row by row, into nested vectors.
    ///
    /// No value is validated or trimmed; empty cells stay empty strings.
    pub fn snapshot(&self) -> Vec<Vec<String>> {
        self.iter_rows().map(|row| row.to_vec()).collect()
    }

    /// Encode the snapshot as the `tableData` JSON text (array of string arrays).
    pub fn to_table_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    /// Decode `tableData` JSON into its rows.
    ///
    /// Rows may be ragged; the processing side writes them as they come.
    pub fn from_table_json(text: &str) -> Result<Vec<Vec<String>>, GridError> {
        serde_json::from_str(text).map_err(|e| GridError::Decode(e.to_string()))
    }

    /// True when no cell holds any text.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }
}
