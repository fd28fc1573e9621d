use clap::Parser;
use std::path::PathBuf;

use crate::grid::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::paste::Anchor;
use crate::transport::DEFAULT_ENDPOINT;

/// Serve the input page and the processing endpoint
#[derive(Parser, Debug, Clone)]
#[command(name = "tablefill-server", version)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "TABLEFILL_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// CSV whose rows head every converted file (skipped if absent)
    #[arg(long, env = "TABLEFILL_TEMPLATE", default_value = "format.csv")]
    pub template: PathBuf,

    /// Directory holding the compiled browser bundle, served under /pkg
    #[arg(long, env = "TABLEFILL_PKG_DIR", default_value = "pkg")]
    pub pkg_dir: PathBuf,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "TABLEFILL_MAX_UPLOAD_MB", default_value_t = 16)]
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            template: PathBuf::from("format.csv"),
            pkg_dir: PathBuf::from("pkg"),
            max_upload_mb: 16,
        }
    }
}

/// Paste tab-separated data into the grid and submit it with a workbook
#[derive(Parser, Debug, Clone)]
#[command(name = "tablefill", version)]
pub struct ClientConfig {
    /// Workbook to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Tab/newline separated text to paste ("-" reads stdin)
    #[arg(long)]
    pub paste: Option<String>,

    /// Cell that receives the paste, as ROW,COL (zero-based)
    #[arg(long, default_value = "0,0", value_parser = parse_anchor)]
    pub anchor: Anchor,

    /// Processing endpoint URL
    #[arg(long, env = "TABLEFILL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    #[arg(long, default_value_t = DEFAULT_COLS)]
    pub cols: usize,

    /// Where the converted file is written
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

pub fn parse_anchor(value: &str) -> Result<Anchor, String> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {:?}", value))?;
    let row = row
        .trim()
        .parse()
        .map_err(|e| format!("bad row {:?}: {}", row, e))?;
    let col = col
        .trim()
        .parse()
        .map_err(|e| format!("bad column {:?}: {}", col, e))?;
    Ok(Anchor::new(row, col))
}
