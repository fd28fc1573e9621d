//! Download affordance for a finished conversion.
//!
//! The processed file is kept behind a local object URL (the way a browser
//! hands out `blob:` URLs) and offered under a suggested filename taken from
//! the response, or derived from the uploaded file's name.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref EXT_FILENAME: Regex =
        Regex::new(r#"(?i)filename\*\s*=\s*([A-Za-z0-9_-]+)'[^']*'([^;]+)"#).unwrap();
    static ref QUOTED_FILENAME: Regex = Regex::new(r#"(?i)filename\s*=\s*"((?:[^"\\]|\\.)*)""#).unwrap();
    static ref BARE_FILENAME: Regex = Regex::new(r#"(?i)filename\s*=\s*([^";\s]+)"#).unwrap();
}

const OBJECT_URL_PREFIX: &str = "blob:tablefill/";

/// Visible download link bound to an object URL
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DownloadLink {
    pub href: String,
    pub filename: String,
    pub label: String,
}

impl DownloadLink {
    pub fn new(href: String, filename: String) -> Self {
        let label = format!("Download ({})", filename);
        DownloadLink {
            href,
            filename,
            label,
        }
    }
}

/// Holds the payload behind the current object URL
///
/// Only one payload is live at a time: registering a new one supersedes
/// the previous URL, which then no longer resolves.
#[derive(Debug, Default)]
pub struct ObjectUrls {
    next_id: u64,
    current: Option<(String, Vec<u8>)>,
}

impl ObjectUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, bytes: Vec<u8>) -> String {
        self.next_id += 1;
        let url = format!("{}{}", OBJECT_URL_PREFIX, self.next_id);
        if let Some((old, _)) = self.current.replace((url.clone(), bytes)) {
            log::debug!("revoked {}", old);
        }
        url
    }

    pub fn resolve(&self, url: &str) -> Option<&[u8]> {
        match &self.current {
            Some((current, bytes)) if current == url => Some(bytes.as_slice()),
            _ => None,
        }
    }
}

/// Pull the suggested filename out of a `Content-Disposition` value
///
/// `filename*=` (RFC 5987, percent-encoded) wins over a plain `filename=`.
/// Directory components are stripped so a hostile server cannot point the
/// save location somewhere else.
///
/// # Examples
/// ```
/// use tablefill::link::filename_from_content_disposition;
///
/// let name = filename_from_content_disposition(r#"attachment; filename="complete_20240101.csv""#);
/// assert_eq!(name.as_deref(), Some("complete_20240101.csv"));
/// ```
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let raw = if let Some(caps) = EXT_FILENAME.captures(header) {
        urlencoding::decode(caps[2].trim())
            .map(|decoded| decoded.into_owned())
            .ok()
    } else {
        None
    };

    let raw = raw
        .or_else(|| {
            QUOTED_FILENAME
                .captures(header)
                .map(|caps| caps[1].replace("\\\"", "\"").replace("\\\\", "\\"))
        })
        .or_else(|| BARE_FILENAME.captures(header).map(|caps| caps[1].to_string()))?;

    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Name the result after the upload: `book.xlsx` becomes `book_complete.xlsx`.
///
/// The `_complete` marker goes before the last extension; a name without
/// one just gets the suffix, and an empty name becomes `complete`.
pub fn completed_filename(original: &str) -> String {
    match original.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_complete{}", &original[..dot], &original[dot..]),
        _ if original.is_empty() => "complete".to_string(),
        _ => format!("{}_complete", original),
    }
}

/// Pick the download name: server-suggested if usable, otherwise derived.
pub fn download_name(original: &str, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .unwrap_or_else(|| completed_filename(original))
}
