use std::path::Path;
use thiserror::Error;

/// Byte order mark prepended so spreadsheet apps open the CSV as UTF-8
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("tableData field is missing")]
    MissingTableData,
    #[error("{0}")]
    Table(#[from] crate::grid::GridError),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Upload {
        status: axum::http::StatusCode,
        message: String,
    },
}

/// Read every row of the template CSV, if the file exists.
///
/// A leading BOM is ignored. A missing template is not an error; the
/// result then simply starts with the table rows.
pub fn load_template(path: &Path) -> Result<Vec<Vec<String>>, ProcessError> {
    if !path.exists() {
        log::debug!("no template at {}, output starts with table rows", path.display());
        return Ok(Vec::new());
    }

    let raw = std::fs::read(path)?;
    let text = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text);

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Build the converted file: template rows, then the table rows as entered
///
/// Values are written verbatim (the "paste values" step of the manual
/// workflow). Rows may differ in length. The output is UTF-8 with a BOM.
///
/// # Arguments
/// * `template` - Rows copied to the top of the output
/// * `table` - Grid rows from the `tableData` field
///
/// # Returns
/// * `Result<Vec<u8>, ProcessError>` - The CSV bytes
pub fn to_csv(template: &[Vec<String>], table: &[Vec<String>]) -> Result<Vec<u8>, ProcessError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(UTF8_BOM.to_vec());

    for row in template.iter().chain(table) {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| ProcessError::Io(e.into_error()))
}

/// `complete_YYYYMMDD.csv` for the given day.
pub fn result_filename(date: chrono::NaiveDate) -> String {
    format!("complete_{}.csv", date.format("%Y%m%d"))
}
