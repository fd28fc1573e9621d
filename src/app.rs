#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::downloader::{self, ProcessError};
use crate::grid::Grid;

pub struct AppState {
    template: PathBuf,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ProcessError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProcessError::MissingFile => StatusCode::BAD_REQUEST,
            ProcessError::Upload { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        log::warn!("process request failed ({}): {}", status, self);
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the router: input page, browser bundle and processing endpoint.
pub fn router(config: &ServerConfig) -> Router {
    let app_state = Arc::new(AppState {
        template: config.template.clone(),
    });

    Router::new()
        .route("/", get(serve_index))
        .route("/api/process", post(process_excel))
        .nest_service("/pkg", ServeDir::new(&config.pkg_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .with_state(app_state)
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let listener = TcpListener::bind(&config.bind).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

// Keeps the multipart status, e.g. 413 when the body limit is hit
fn upload_error(e: MultipartError) -> ProcessError {
    ProcessError::Upload {
        status: e.status(),
        message: e.body_text(),
    }
}

/// `POST /api/process`: workbook + `tableData` in, CSV attachment out
///
/// The uploaded workbook is required but its content is not read; the
/// output is the template rows followed by the grid rows.
async fn process_excel(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ProcessError> {
    let mut file_name: Option<String> = None;
    let mut file_size = 0;
    let mut table_data: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = Some(field.file_name().unwrap_or("upload").to_string());
                file_size = field
                    .bytes()
                    .await
                    .map_err(upload_error)?
                    .len();
            }
            "tableData" => {
                table_data = Some(
                    field
                        .text()
                        .await
                        .map_err(upload_error)?,
                );
            }
            _ => {}
        }
    }

    let file_name = file_name.ok_or(ProcessError::MissingFile)?;
    let table = Grid::from_table_json(&table_data.ok_or(ProcessError::MissingTableData)?)?;
    log::info!(
        "processing {} ({} bytes) with {} table rows",
        file_name,
        file_size,
        table.len()
    );

    let template = downloader::load_template(&state.template)?;
    let csv = downloader::to_csv(&template, &table)?;
    let download_name = downloader::result_filename(chrono::Local::now().date_naive());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "tablefill-test-boundary";

    fn multipart_body(file: &[u8], table_data: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"book.xlsx\"\r\n\r\n",
                b = BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(
            format!(
                "\r\n--{b}\r\nContent-Disposition: form-data; name=\"tableData\"\r\n\r\n{t}\r\n--{b}--\r\n",
                b = BOUNDARY,
                t = table_data
            )
            .as_bytes(),
        );
        body
    }

    fn process_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn config(dir: &std::path::Path, max_upload_mb: usize) -> ServerConfig {
        ServerConfig {
            template: dir.join("absent.csv"),
            max_upload_mb,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn oversized_upload_is_payload_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&config(dir.path(), 1));
        let workbook = vec![b'x'; 3 * 1024 * 1024 / 2];

        let response = app
            .oneshot(process_request(multipart_body(&workbook, "[]")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn bad_table_data_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&config(dir.path(), 1));

        let response = app
            .oneshot(process_request(multipart_body(b"PK", "not json")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn small_upload_returns_csv_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(&config(dir.path(), 1));

        let response = app
            .oneshot(process_request(multipart_body(b"PK", r#"[["a","b"]]"#)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\xEF\xBB\xBFa,b\n");
    }
}
