//! Submission of the grid and the selected workbook to the processing endpoint.
//!
//! [`Page`] is the explicit stand-in for the page's ambient state: the grid,
//! the file picker, the status line, the convert button and the download
//! link. [`Page::process_data`] runs one submission through a [`Transport`]
//! and moves the UI through idle, submitting and settled.

use serde::Serialize;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

use crate::grid::Grid;
use crate::link::{DownloadLink, ObjectUrls, download_name};

pub const MISSING_FILE_PROMPT: &str = "Please select an Excel file.";
pub const IN_PROGRESS_STATUS: &str = "Processing...";
pub const SUCCESS_STATUS: &str = "Conversion complete! Download the result below.";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("failed to encode table data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Server error: {0}")]
    Server(String),
    #[error("{0}")]
    Transport(String),
}

/// The workbook picked in the file control
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// One outgoing request: the file as selected plus the grid snapshot
#[derive(Debug)]
pub struct SubmissionBundle<'a> {
    pub file: &'a SelectedFile,
    pub table: Vec<Vec<String>>,
}

impl SubmissionBundle<'_> {
    /// The `tableData` part: row-major JSON array of string arrays.
    pub fn table_data(&self) -> Result<String, SubmitError> {
        Ok(serde_json::to_string(&self.table)?)
    }
}

/// What came back from the endpoint, body already read
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries a bundle to the processing endpoint
///
/// The page awaits exactly one `send` at a time. Network and body-read
/// failures come back as `SubmitError::Transport`.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, bundle: &SubmissionBundle<'_>) -> Result<TransportResponse, SubmitError>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum TransferResult {
    Success(DownloadLink),
    Failure(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    #[default]
    Idle,
    InProgress,
    Success,
    Error,
}

/// Everything the user can see apart from the grid
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UiState {
    pub submit_enabled: bool,
    pub status: String,
    pub status_kind: StatusKind,
    pub download: Option<DownloadLink>,
    /// Last blocking prompt shown to the user
    pub prompt: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            submit_enabled: true,
            status: String::new(),
            status_kind: StatusKind::Idle,
            download: None,
            prompt: None,
        }
    }
}

/// Holds the convert button disabled while a request is outstanding
///
/// Acquiring disables the button, shows the in-progress status and hides
/// any previous download link. Dropping re-enables the button, so every
/// way out of a submission (including the future being dropped mid-flight)
/// leaves it clickable again; an unsettled in-progress status is cleared
/// back to idle.
pub struct SubmitGuard<'a> {
    ui: &'a mut UiState,
}

impl<'a> SubmitGuard<'a> {
    pub fn acquire(ui: &'a mut UiState) -> Self {
        ui.submit_enabled = false;
        ui.status = IN_PROGRESS_STATUS.to_string();
        ui.status_kind = StatusKind::InProgress;
        ui.download = None;
        SubmitGuard { ui }
    }
}

impl Deref for SubmitGuard<'_> {
    type Target = UiState;

    fn deref(&self) -> &UiState {
        self.ui
    }
}

impl DerefMut for SubmitGuard<'_> {
    fn deref_mut(&mut self) -> &mut UiState {
        self.ui
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.ui.submit_enabled = true;
        // Dropped before settling: nothing is in progress any more
        if self.ui.status_kind == StatusKind::InProgress {
            self.ui.status.clear();
            self.ui.status_kind = StatusKind::Idle;
        }
    }
}

/// The page: grid, file selection, UI state and the object URL store
#[derive(Debug, Default)]
pub struct Page {
    pub grid: Grid,
    pub selected_file: Option<SelectedFile>,
    pub ui: UiState,
    urls: ObjectUrls,
}

impl Page {
    pub fn new(grid: Grid) -> Self {
        Page {
            grid,
            ..Default::default()
        }
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.selected_file = Some(file);
    }

    /// Bytes behind the link currently on the page, if any.
    pub fn download_bytes(&self) -> Option<&[u8]> {
        let link = self.ui.download.as_ref()?;
        self.urls.resolve(&link.href)
    }

    /// Send the grid and selected file for conversion
    ///
    /// Without a selected file this only sets `ui.prompt` and returns
    /// `NoFileSelected`; no request is made and nothing else changes.
    /// Otherwise the grid is snapshotted as-is, sent through `transport`,
    /// and the outcome lands in the status line (and the download link on
    /// success). The convert button is enabled again on every return path.
    ///
    /// # Arguments
    /// * `transport` - Carries the bundle to the processing endpoint
    ///
    /// # Returns
    /// * `Result<TransferResult, SubmitError>` - The settled outcome, or
    ///   `NoFileSelected` when the precondition fails
    pub async fn process_data<T: Transport>(
        &mut self,
        transport: &T,
    ) -> Result<TransferResult, SubmitError> {
        let Some(file) = self.selected_file.as_ref() else {
            log::warn!("convert requested without a selected file");
            self.ui.prompt = Some(MISSING_FILE_PROMPT.to_string());
            return Err(SubmitError::NoFileSelected);
        };

        let bundle = SubmissionBundle {
            file,
            table: self.grid.snapshot(),
        };

        let mut ui = SubmitGuard::acquire(&mut self.ui);
        log::info!(
            "submitting {} ({} bytes) with {} grid rows",
            file.name,
            file.bytes.len(),
            bundle.table.len()
        );

        let outcome = match send_and_check(transport, &bundle).await {
            Ok(response) => {
                let filename = download_name(&file.name, response.content_disposition.as_deref());
                let href = self.urls.register(response.body);
                let link = DownloadLink::new(href, filename);
                log::info!("conversion finished, offering {}", link.filename);

                ui.download = Some(link.clone());
                ui.status = SUCCESS_STATUS.to_string();
                ui.status_kind = StatusKind::Success;
                TransferResult::Success(link)
            }
            Err(e) => {
                log::error!("conversion failed: {}", e);
                let message = format!("An error occurred: {}", e);
                ui.status = message.clone();
                ui.status_kind = StatusKind::Error;
                TransferResult::Failure(message)
            }
        };

        Ok(outcome)
    }
}

async fn send_and_check<T: Transport>(
    transport: &T,
    bundle: &SubmissionBundle<'_>,
) -> Result<TransportResponse, SubmitError> {
    let response = transport.send(bundle).await?;
    if !response.is_ok() {
        let text = String::from_utf8_lossy(&response.body).into_owned();
        log::warn!("endpoint answered {}: {}", response.status, text);
        return Err(SubmitError::Server(text));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paste::{Anchor, distribute};
    use std::cell::RefCell;

    /// Records what it was sent and replies with a canned answer.
    struct Canned {
        reply: Result<TransportResponse, String>,
        seen: RefCell<Vec<(SelectedFile, String)>>,
    }

    impl Canned {
        fn ok(status: u16, disposition: Option<&str>, body: &[u8]) -> Self {
            Canned {
                reply: Ok(TransportResponse {
                    status,
                    content_disposition: disposition.map(str::to_string),
                    body: body.to_vec(),
                }),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Canned {
                reply: Err(message.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        async fn send(&self, bundle: &SubmissionBundle<'_>) -> Result<TransportResponse, SubmitError> {
            self.seen
                .borrow_mut()
                .push((bundle.file.clone(), bundle.table_data()?));
            self.reply.clone().map_err(SubmitError::Transport)
        }
    }

    fn page_with_file() -> Page {
        let mut page = Page::new(Grid::default());
        page.select_file(SelectedFile::new("book.xlsx", vec![0x50, 0x4b, 3, 4]));
        page
    }

    #[tokio::test]
    async fn missing_file_prompts_and_sends_nothing() {
        let mut page = Page::new(Grid::default());
        page.grid.set(0, 0, "v").unwrap();
        let grid_before = page.grid.clone();
        let transport = Canned::ok(200, None, b"x");

        let err = page.process_data(&transport).await.unwrap_err();

        assert!(matches!(err, SubmitError::NoFileSelected));
        assert!(transport.seen.borrow().is_empty());
        assert_eq!(page.grid, grid_before);
        assert_eq!(page.ui.prompt.as_deref(), Some(MISSING_FILE_PROMPT));
        assert!(page.ui.submit_enabled);
        assert_eq!(page.ui.status, "");
        assert_eq!(page.ui.status_kind, StatusKind::Idle);
        assert!(page.ui.download.is_none());
    }

    #[tokio::test]
    async fn success_sends_file_and_grid_and_offers_download() {
        let mut page = page_with_file();
        distribute(&mut page.grid, Some("a\tb\nc\td"), Anchor::new(0, 0));
        page.grid.set(29, 5, "last").unwrap();
        let transport = Canned::ok(200, None, b"converted");

        let result = page.process_data(&transport).await.unwrap();

        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.bytes, vec![0x50, 0x4b, 3, 4]);
        assert_eq!(Grid::from_table_json(&seen[0].1).unwrap(), page.grid.snapshot());

        let link = match result {
            TransferResult::Success(link) => link,
            other => panic!("expected success, got {:?}", other),
        };
        assert_eq!(link.filename, "book_complete.xlsx");
        assert!(link.href.starts_with("blob:"));
        assert_eq!(page.ui.download.as_ref(), Some(&link));
        assert_eq!(page.download_bytes(), Some(&b"converted"[..]));
        assert_eq!(page.ui.status, SUCCESS_STATUS);
        assert_eq!(page.ui.status_kind, StatusKind::Success);
        assert!(page.ui.submit_enabled);
    }

    #[tokio::test]
    async fn server_suggested_name_wins() {
        let mut page = page_with_file();
        let transport = Canned::ok(
            200,
            Some(r#"attachment; filename="complete_20240102.csv""#),
            b"x",
        );
        let result = page.process_data(&transport).await.unwrap();
        match result {
            TransferResult::Success(link) => assert_eq!(link.filename, "complete_20240102.csv"),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_failure_surfaces_body_and_hides_link() {
        let mut page = page_with_file();
        page.process_data(&Canned::ok(200, None, b"first")).await.unwrap();
        assert!(page.ui.download.is_some());

        let result = page
            .process_data(&Canned::ok(500, None, b"bad file"))
            .await
            .unwrap();

        assert!(matches!(&result, TransferResult::Failure(msg) if msg.contains("bad file")));
        assert!(page.ui.status.contains("bad file"));
        assert_eq!(page.ui.status_kind, StatusKind::Error);
        assert!(page.ui.download.is_none());
        assert!(page.download_bytes().is_none());
        assert!(page.ui.submit_enabled);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_with_its_message() {
        let mut page = page_with_file();
        let result = page
            .process_data(&Canned::failing("connection refused"))
            .await
            .unwrap();

        assert_eq!(
            result,
            TransferResult::Failure("An error occurred: connection refused".to_string())
        );
        assert_eq!(page.ui.status, "An error occurred: connection refused");
        assert!(page.ui.submit_enabled);
    }

    #[test]
    fn guard_disables_then_reenables() {
        let mut ui = UiState {
            download: Some(DownloadLink::new("blob:tablefill/1".into(), "a.csv".into())),
            ..Default::default()
        };
        {
            let guard = SubmitGuard::acquire(&mut ui);
            assert!(!guard.submit_enabled);
            assert_eq!(guard.status, IN_PROGRESS_STATUS);
            assert!(guard.download.is_none());
        }
        assert!(ui.submit_enabled);
        assert_eq!(ui.status_kind, StatusKind::Idle);
        assert_eq!(ui.status, "");

        {
            let mut guard = SubmitGuard::acquire(&mut ui);
            guard.status = "An error occurred: x".to_string();
            guard.status_kind = StatusKind::Error;
        }
        assert!(ui.submit_enabled);
        assert_eq!(ui.status_kind, StatusKind::Error);
        assert_eq!(ui.status, "An error occurred: x");
    }

    #[tokio::test]
    async fn dropping_an_inflight_submission_reenables_the_button() {
        struct Never;
        impl Transport for Never {
            async fn send(&self, _: &SubmissionBundle<'_>) -> Result<TransportResponse, SubmitError> {
                std::future::pending().await
            }
        }

        let mut page = page_with_file();
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            page.process_data(&Never),
        )
        .await;
        assert!(outcome.is_err());
        assert!(page.ui.submit_enabled);
        assert_eq!(page.ui.status_kind, StatusKind::Idle);
        assert_eq!(page.ui.status, "");
        assert!(page.ui.download.is_none());
    }

    #[test]
    fn only_2xx_counts_as_ok() {
        let mut response = TransportResponse {
            status: 204,
            content_disposition: None,
            body: Vec::new(),
        };
        assert!(response.is_ok());
        response.status = 302;
        assert!(!response.is_ok());
        response.status = 404;
        assert!(!response.is_ok());
    }
}
