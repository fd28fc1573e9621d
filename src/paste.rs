use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

lazy_static! {
    // Spreadsheet apps emit CRLF on Windows, LF elsewhere, bare CR on old Macs
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n|\r|\n").unwrap();
}

/// Position of the cell that received the paste
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub row: usize,
    pub col: usize,
}

impl Anchor {
    pub fn new(row: usize, col: usize) -> Self {
        Anchor { row, col }
    }
}

/// Split clipboard text into rows of tab-separated values
///
/// Rows are separated by any of `\r\n`, `\r` or `\n`. Every empty row is
/// dropped, wherever it sits, so a blank line never overwrites a cell and
/// the rows after it move up to close the gap.
///
/// # Arguments
/// * `text` - Raw clipboard text
///
/// # Returns
/// * `Vec<Vec<&str>>` - Rows of cell values, borrowed from `text`
///
/// # Examples
/// ```
/// use tablefill::paste::parse_clipboard;
///
/// let rows = parse_clipboard("a\tb\r\nc\td\r\n");
/// assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
/// ```
pub fn parse_clipboard(text: &str) -> Vec<Vec<&str>> {
    LINE_BREAK
        .split(text)
        .filter(|line| !line.is_empty())
        .map(|line| line.split('\t').collect())
        .collect()
}

/// Write a clipboard payload into the grid starting at `anchor`
///
/// Value `(r, c)` of the payload lands on cell `(anchor.row + r,
/// anchor.col + c)` when that cell exists; anything that would fall
/// outside the grid is dropped. The grid never grows and nothing wraps.
/// An absent or empty payload leaves every cell untouched.
///
/// # Arguments
/// * `grid` - The grid to mutate
/// * `text` - Clipboard text, if the paste carried any
/// * `anchor` - Top-left cell of the paste
///
/// # Returns
/// * `usize` - Number of cells overwritten
pub fn distribute(grid: &mut Grid, text: Option<&str>, anchor: Anchor) -> usize {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return 0;
    };

    let mut written = 0;
    for (row_offset, values) in parse_clipboard(text).into_iter().enumerate() {
        let row = anchor.row + row_offset;
        if row >= grid.rows() {
            break;
        }
        for (col_offset, value) in values.into_iter().enumerate() {
            let col = anchor.col + col_offset;
            if col >= grid.cols() {
                break;
            }
            grid.overwrite(row, col, value);
            written += 1;
        }
    }

    log::debug!(
        "pasted {} cell(s) at ({}, {})",
        written,
        anchor.row,
        anchor.col
    );
    written
}

/// Pure form of [`distribute`]: returns the pasted copy, leaves `grid` alone.
pub fn pasted(grid: &Grid, text: Option<&str>, anchor: Anchor) -> Grid {
    let mut next = grid.clone();
    distribute(&mut next, text, anchor);
    next
}
