use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};

use crate::submit::{SubmissionBundle, SubmitError, Transport, TransportResponse};

/// Default location of the processing endpoint when served locally
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/process";

/// Posts submissions as `multipart/form-data` over HTTP
///
/// The request carries two parts: `file` with the workbook bytes as
/// selected, and `tableData` with the grid as JSON text. No timeout is set;
/// a request runs until the server answers or the connection fails.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, SubmitError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("tablefill/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        Ok(HttpTransport {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(bundle: &SubmissionBundle<'_>) -> Result<Form, SubmitError> {
        let mut file = Part::bytes(bundle.file.bytes.clone()).file_name(bundle.file.name.clone());
        if let Some(content_type) = &bundle.file.content_type {
            file = file
                .mime_str(content_type)
                .map_err(|e| SubmitError::Transport(e.to_string()))?;
        }

        Ok(Form::new()
            .part("file", file)
            .text("tableData", bundle.table_data()?))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, bundle: &SubmissionBundle<'_>) -> Result<TransportResponse, SubmitError> {
        let form = Self::form(bundle)?;
        log::debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?
            .to_vec();

        Ok(TransportResponse {
            status,
            content_disposition,
            body,
        })
    }
}
