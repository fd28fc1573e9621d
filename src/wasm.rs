//! Browser binding for the input page.
//!
//! The page keeps one [`WebGrid`] per load and mirrors it into its text
//! inputs; clipboard access, the file picker, `fetch` and blob URLs stay on
//! the JavaScript side.

use wasm_bindgen::prelude::*;

use crate::grid::Grid;
use crate::link;
use crate::paste::{self, Anchor};

#[wasm_bindgen]
pub struct WebGrid {
    grid: Grid,
}

#[wasm_bindgen]
impl WebGrid {
    /// 30x6 grid, the size the page is built with.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGrid {
        WebGrid {
            grid: Grid::default(),
        }
    }

    pub fn with_size(rows: usize, cols: usize) -> Result<WebGrid, JsError> {
        let grid = Grid::create(rows, cols)?;
        Ok(WebGrid { grid })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<String> {
        self.grid.get(row, col).map(str::to_string)
    }

    /// Mirror a value typed into an input.
    pub fn set(&mut self, row: usize, col: usize, value: String) -> Result<(), JsError> {
        self.grid.set(row, col, value)?;
        Ok(())
    }

    /// Apply clipboard text at the target cell; returns cells written.
    pub fn paste(&mut self, text: Option<String>, row: usize, col: usize) -> usize {
        paste::distribute(&mut self.grid, text.as_deref(), Anchor::new(row, col))
    }

    #[wasm_bindgen(js_name = tableData)]
    pub fn table_data(&self) -> Result<String, JsError> {
        Ok(self.grid.to_table_json()?)
    }
}

impl Default for WebGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_name = downloadName)]
pub fn download_name(original: &str, content_disposition: Option<String>) -> String {
    link::download_name(original, content_disposition.as_deref())
}
