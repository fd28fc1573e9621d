/*!
# Table Fill

A small helper for sending hand-entered table data to a spreadsheet
processing endpoint, built in Rust.

## Overview

The user fills a fixed 30×6 grid of text cells, either by typing or by
pasting a block copied from a spreadsheet application (tab-separated
columns, newline-separated rows). The grid is then submitted together with
a selected workbook as one multipart request, and the processed file that
comes back is offered for download.

## Architecture

### Client side
- **Grid** ([`grid`]) - Fixed-size table of string cells, built once per page
- **Paste Distributor** ([`paste`]) - Parses clipboard text and fans it out
  from the pasted cell, silently dropping anything outside the grid
- **Submission Coordinator** ([`submit`]) - Snapshots the grid, sends it with
  the file, drives the convert button / status line / download link
- **Download link** ([`link`]) - Object URL store and result filename rules
- **HTTP transport** (`transport`, `web` feature) - `multipart/form-data` POST
  via reqwest
- **Browser binding** (`wasm`, `wasm` feature) - wasm-bindgen surface for the
  input page

### Server side (`web` feature)
- **Processing endpoint** (`app`) - axum router serving the page and
  `POST /api/process`
- **Result builder** (`downloader`) - Template rows followed by the grid rows,
  written as UTF-8 CSV with a BOM

## Wire format

`POST /api/process` with two parts:

- `file` - the selected workbook, unmodified
- `tableData` - the grid as JSON, e.g. `[["a","b",...],["c","d",...],...]`

A 2xx answer carries the converted file (optionally named by
`Content-Disposition`); anything else carries an error description.

## Binaries

- `tablefill-server` - serves the page and the processing endpoint
- `tablefill` - pastes TSV into a grid, submits it with a workbook and saves
  the result
*/

pub mod grid;
pub mod link;
pub mod paste;
pub mod submit;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod downloader;
#[cfg(feature = "web")]
pub mod transport;

#[cfg(feature = "wasm")]
pub mod wasm;

/// Re-export the everyday types
pub use grid::*;
pub use link::*;
pub use paste::*;
pub use submit::*;
