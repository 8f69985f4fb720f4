//! HTTP service exposing the document tools
//!
//! Every tool route takes a multipart form with the uploaded `file` (or
//! repeated `files`), an optional `options` JSON field and an optional
//! `password`, and answers with the produced file. Several outputs are
//! returned as one ZIP archive.

use crate::error::Error;
use crate::pdf::{DocumentCodec, PdfCodec};
use crate::pipeline::{
    Artifact, Completion, CompressOptions, ImageOptions, MergeOptions, ProtectOptions, SplitMode,
    ToolOptions, WatermarkOptions, DEFAULT_THUMBNAIL_WIDTH,
};
use crate::session::{SessionConfig, ToolRequest, ToolSession, Upload};
use anyhow::Result;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Header naming the degraded variant an operation fell back to
pub const FALLBACK_HEADER: &str = "x-pagesmith-fallback";

/// Resource limits for the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (default: 127.0.0.1:8080)
    pub bind_addr: String,
    /// Maximum request body size in bytes (default: 100MB)
    pub max_upload_bytes: usize,
    /// Thumbnail width in pixels (default: 200)
    pub thumbnail_width: u16,
    /// Maximum render resolution for image export (default: 300)
    pub max_dpi: u32,
    /// Maximum pixel area of one exported page image (default: 100_000_000)
    pub max_image_pixels: u64,
    /// Maximum documents held in a thumbnail cache (default: 32)
    pub thumbnail_cache_entries: usize,
    /// Maximum encoded thumbnail bytes held per request (default: 64MB)
    pub thumbnail_cache_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            max_upload_bytes: 100 * 1024 * 1024, // 100MB
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            max_dpi: 300,
            max_image_pixels: 100_000_000,
            thumbnail_cache_entries: 32,
            thumbnail_cache_bytes: 64 * 1024 * 1024, // 64MB
        }
    }
}

impl ServerConfig {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            thumbnail_width: self.thumbnail_width,
            max_image_pixels: Some(self.max_image_pixels),
            thumbnail_cache_entries: self.thumbnail_cache_entries,
            thumbnail_cache_bytes: self.thumbnail_cache_bytes,
        }
    }
}

/// Builds the codec used by one request. PDFium bindings are not
/// thread-safe, so every request gets its own codec.
pub type CodecFactory = fn() -> Box<dyn DocumentCodec>;

fn pdf_codec() -> Box<dyn DocumentCodec> {
    Box::new(PdfCodec::new())
}

#[derive(Clone)]
struct AppState {
    config: Arc<ServerConfig>,
    codec: CodecFactory,
}

/// Error response of every route: `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            e if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::warn!(error = %err, "Request rejected");
        }
        Self {
            status,
            message: err.client_message(),
        }
    }
}

impl ApiError {
    /// Map a multipart failure; an exceeded body limit becomes `UploadTooLarge`
    fn multipart(err: MultipartError, config: &ServerConfig) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Error::UploadTooLarge {
                max_size: config.max_upload_bytes,
            }
            .into();
        }
        tracing::warn!(error = %err, "Multipart upload failed");
        Self {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Fields of a tool upload form
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<(String, Vec<u8>)>,
    options: Option<String>,
    password: Option<String>,
    image: Option<Vec<u8>>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, config: &ServerConfig) -> ApiResult<Self> {
        let fail = |e: MultipartError| ApiError::multipart(e, config);
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(fail)? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" | "files" => {
                    let filename = field.file_name().unwrap_or("document.pdf").to_string();
                    let data = field.bytes().await.map_err(fail)?;
                    form.files.push((filename, data.to_vec()));
                }
                "options" => form.options = Some(field.text().await.map_err(fail)?),
                "password" => {
                    let password = field.text().await.map_err(fail)?;
                    if !password.is_empty() {
                        form.password = Some(password);
                    }
                }
                "image" => form.image = Some(field.bytes().await.map_err(fail)?.to_vec()),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        if form.files.is_empty() {
            return Err(Error::InvalidOptions {
                reason: "no file uploaded".to_string(),
            }
            .into());
        }
        Ok(form)
    }

    /// Parsed `options` field; required
    fn options<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let text = self.options.as_deref().ok_or_else(|| Error::InvalidOptions {
            reason: "missing options field".to_string(),
        })?;
        serde_json::from_str(text).map_err(|e| {
            ApiError::from(Error::InvalidOptions {
                reason: e.to_string(),
            })
        })
    }

    /// Parsed `options` field, or defaults when absent
    fn options_or_default<T: DeserializeOwned + Default>(&self) -> ApiResult<T> {
        match self.options {
            Some(_) => self.options(),
            None => Ok(T::default()),
        }
    }

    fn uploads(&mut self) -> Vec<Upload> {
        let password = self.password.clone();
        std::mem::take(&mut self.files)
            .into_iter()
            .map(|(name, bytes)| Upload {
                name,
                bytes,
                password: password.clone(),
            })
            .collect()
    }
}

/// Open the uploads, run one tool and collapse the output into a download
async fn run_tool(
    state: &AppState,
    mut form: UploadForm,
    options: ToolOptions,
    suffix: &'static str,
) -> ApiResult<Response> {
    options.validate()?;
    let uploads = form.uploads();
    let session_config = state.config.session_config();
    let make_codec = state.codec;

    let (artifact, completion) = tokio::task::spawn_blocking(
        move || -> crate::error::Result<(Artifact, Completion)> {
            let codec = make_codec();
            let mut session = ToolSession::new(codec.as_ref(), session_config);
            let mut ids = Vec::with_capacity(uploads.len());
            for upload in uploads {
                ids.push(session.add_document(upload)?);
            }

            let archive_stem = match ids.as_slice() {
                [id] => format!("{}_{}", session.document(*id)?.stem(), suffix),
                _ => format!("pagesmith_{}", suffix),
            };
            let (output, completion) = session.try_run(&ToolRequest::new(ids, options))?;
            Ok((session.download(output, &archive_stem)?, completion))
        },
    )
    .await
    .map_err(|e| {
        ApiError::from(Error::ProcessingFailed {
            reason: format!("worker task failed: {}", e),
        })
    })??;

    tracing::info!(
        tool = suffix,
        filename = %artifact.filename,
        bytes = artifact.data.len(),
        "Request completed"
    );
    Ok(download_response(artifact, completion))
}

fn download_response(artifact: Artifact, completion: Completion) -> Response {
    let filename = artifact.filename.replace(['"', '\\'], "_");
    let mut response = (
        [
            (header::CONTENT_TYPE, artifact.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        artifact.data,
    )
        .into_response();

    if let Completion::Fallback { reason } = completion {
        if let Ok(value) = HeaderValue::from_str(&reason) {
            response.headers_mut().insert(FALLBACK_HEADER, value);
        }
    }
    response
}

async fn handle_split(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let mode: SplitMode = form.options()?;
    run_tool(&state, form, ToolOptions::Split(mode), "split").await
}

async fn handle_merge(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let options: MergeOptions = form.options_or_default()?;
    run_tool(&state, form, ToolOptions::Merge(options), "merged").await
}

async fn handle_compress(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let options: CompressOptions = form.options_or_default()?;
    run_tool(&state, form, ToolOptions::Compress(options), "compressed").await
}

async fn handle_to_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let options: ImageOptions = form.options_or_default()?;
    if options.dpi > state.config.max_dpi {
        return Err(Error::InvalidOptions {
            reason: format!("dpi must not exceed {}", state.config.max_dpi),
        }
        .into());
    }
    run_tool(&state, form, ToolOptions::ToImages(options), "images").await
}

async fn handle_protect(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let options: ProtectOptions = form.options()?;
    run_tool(&state, form, ToolOptions::Protect(options), "protected").await
}

async fn handle_watermark(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let form = UploadForm::read(multipart, &state.config).await?;
    let mut options: WatermarkOptions = form.options_or_default()?;
    options.image = form.image.clone();
    run_tool(&state, form, ToolOptions::Watermark(options), "watermarked").await
}

#[derive(Debug, Serialize)]
struct ThumbnailPage {
    page_number: u32,
    width: u32,
    height: u32,
    mime_type: String,
    /// Base64 encoded image
    data: String,
}

#[derive(Debug, Serialize)]
struct ThumbnailDocument {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_count: Option<u32>,
    pages: Vec<ThumbnailPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ThumbnailsResponse {
    documents: Vec<ThumbnailDocument>,
}

/// Thumbnails of every uploaded file; a file that cannot be read reports
/// its own error without failing the others
async fn handle_thumbnails(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<ThumbnailsResponse>> {
    let mut form = UploadForm::read(multipart, &state.config).await?;
    let uploads = form.uploads();
    let session_config = state.config.session_config();
    let make_codec = state.codec;

    let documents = tokio::task::spawn_blocking(move || {
        let codec = make_codec();
        let mut session = ToolSession::new(codec.as_ref(), session_config);
        let names: Vec<String> = uploads.iter().map(|u| u.name.clone()).collect();
        let engine = base64::engine::general_purpose::STANDARD;

        session
            .add_documents(uploads)
            .into_iter()
            .zip(names)
            .map(|(added, name)| {
                let pages = added.and_then(|id| session.thumbnails(id));
                match pages {
                    Ok(pages) => ThumbnailDocument {
                        name,
                        page_count: Some(pages.len() as u32),
                        pages: pages
                            .into_iter()
                            .map(|page| ThumbnailPage {
                                page_number: page.page_number,
                                width: page.width,
                                height: page.height,
                                data: engine.encode(&page.thumbnail.data),
                                mime_type: page.thumbnail.mime_type,
                            })
                            .collect(),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(document = %name, error = %e, "Thumbnail extraction failed");
                        ThumbnailDocument {
                            name,
                            page_count: None,
                            pages: Vec::new(),
                            error: Some(e.client_message()),
                        }
                    }
                }
            })
            .collect::<Vec<_>>()
    })
    .await
    .map_err(|e| {
        ApiError::from(Error::ProcessingFailed {
            reason: format!("worker task failed: {}", e),
        })
    })?;

    Ok(Json(ThumbnailsResponse { documents }))
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Router backed by the PDFium/qpdf codec
pub fn router(config: ServerConfig) -> Router {
    router_with_codec(config, pdf_codec)
}

/// Router whose requests use codecs built by `codec`
pub fn router_with_codec(config: ServerConfig, codec: CodecFactory) -> Router {
    let body_limit = config.max_upload_bytes;
    let state = AppState {
        config: Arc::new(config),
        codec,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/protect", post(handle_protect))
        .route("/api/split", post(handle_split))
        .route("/api/to-images", post(handle_to_images))
        .route("/api/watermark", post(handle_watermark))
        .route("/api/merge", post(handle_merge))
        .route("/api/compress", post(handle_compress))
        .route("/api/thumbnails", post(handle_thumbnails))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP service until the process is stopped
pub async fn run_server_with_config(config: ServerConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        max_upload_bytes = config.max_upload_bytes,
        "pagesmith listening"
    );

    axum::serve(listener, router(config)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_document, page_labels, sample_pdf, MemoryCodec};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pagesmith-test-boundary";

    enum Part<'a> {
        File(&'a str, &'a str, &'a [u8]),
        Text(&'a str, &'a str),
    }

    fn form_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::File(field, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n",
                            field, filename
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text(field, value) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}",
                            field, value
                        )
                        .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn memory_codec() -> Box<dyn DocumentCodec> {
        Box::new(MemoryCodec::new())
    }

    fn memory_router(config: ServerConfig) -> Router {
        router_with_codec(config, memory_codec)
    }

    async fn error_of(response: Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(ServerConfig::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_split_single_page_is_not_zipped() {
        let doc = memory_document("A", 5);
        let request = form_request(
            "/api/split",
            &[
                Part::File("file", "report.pdf", &doc),
                Part::Text("options", r#"{"split_mode": "pages", "pages": [4]}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report_page_4.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(page_labels(&body), vec!["A4"]);
    }

    #[tokio::test]
    async fn test_split_parts_are_zipped() {
        let doc = memory_document("A", 11);
        let request = form_request(
            "/api/split",
            &[
                Part::File("file", "report.pdf", &doc),
                Part::Text("options", r#"{"split_mode": "size", "equal_parts": 3}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report_split.zip\""
        );
    }

    #[tokio::test]
    async fn test_split_without_pages_is_bad_request() {
        let doc = memory_document("A", 3);
        let request = form_request(
            "/api/split",
            &[
                Part::File("file", "report.pdf", &doc),
                Part::Text("options", r#"{"split_mode": "pages", "pages": []}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_of(response).await,
            crate::error::NO_PAGES_SELECTED_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_unreadable_upload_is_bad_request() {
        let request = form_request(
            "/api/compress",
            &[Part::File("file", "notes.txt", b"plain text")],
        );
        let response = router(ServerConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_of(response).await,
            "The file could not be read as a PDF document"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let request = form_request("/api/protect", &[Part::Text("options", "{}")]);
        let response = router(ServerConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_too_large() {
        let config = ServerConfig {
            max_upload_bytes: 1024,
            ..ServerConfig::default()
        };
        let big = vec![b'x'; 8 * 1024];
        let request = form_request("/api/compress", &[Part::File("file", "big.pdf", &big)]);
        let response = router(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            error_of(response).await,
            "Upload exceeds maximum size of 1024 bytes"
        );
    }

    #[tokio::test]
    async fn test_merge_needs_two_files() {
        let doc = memory_document("A", 2);
        let request = form_request("/api/merge", &[Part::File("files", "a.pdf", &doc)]);
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_of(response).await,
            "Select at least 2 documents to merge"
        );
    }

    #[tokio::test]
    async fn test_merge_interleave() {
        let a = memory_document("A", 2);
        let b = memory_document("B", 2);
        let request = form_request(
            "/api/merge",
            &[
                Part::File("files", "a.pdf", &a),
                Part::File("files", "b.pdf", &b),
                Part::Text("options", r#"{"merge_mode": "interleave"}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(page_labels(&body), vec!["A1", "B1", "A2", "B2"]);
    }

    #[tokio::test]
    async fn test_merge_without_mode_is_sequential() {
        let a = memory_document("A", 2);
        let b = memory_document("B", 1);
        let request = form_request(
            "/api/merge",
            &[
                Part::File("files", "a.pdf", &a),
                Part::File("files", "b.pdf", &b),
                Part::Text("options", r#"{"add_bookmarks": true}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(page_labels(&body), vec!["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn test_to_images_dpi_limit() {
        let doc = memory_document("A", 1);
        let request = form_request(
            "/api/to-images",
            &[
                Part::File("file", "a.pdf", &doc),
                Part::Text("options", r#"{"dpi": 450}"#),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_watermark_fallback_header() {
        let doc = memory_document("A", 1);
        let request = form_request(
            "/api/watermark",
            &[
                Part::File("file", "a.pdf", &doc),
                Part::Text("options", r#"{"text": "DRAFT"}"#),
                Part::File("image", "logo.png", b"not an image"),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(FALLBACK_HEADER));
    }

    #[tokio::test]
    async fn test_thumbnails_scope_errors_per_file() {
        let doc = memory_document("A", 2);
        let request = form_request(
            "/api/thumbnails",
            &[
                Part::File("files", "good.pdf", &doc),
                Part::File("files", "bad.pdf", b"garbage"),
            ],
        );
        let response = memory_router(ServerConfig::default())
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let documents = value["documents"].as_array().unwrap();
        assert_eq!(documents[0]["page_count"], 2);
        assert_eq!(documents[0]["pages"][1]["page_number"], 2);
        assert!(documents[0].get("error").is_none());
        assert!(documents[1]["error"].is_string());
    }

    #[tokio::test]
    async fn test_protect_real_pdf() {
        let pdf = sample_pdf(&[(612.0, 792.0), (612.0, 792.0)]);
        let request = form_request(
            "/api/protect",
            &[
                Part::File("file", "contract.pdf", &pdf),
                Part::Text("options", r#"{"user_password": "secret"}"#),
            ],
        );
        let response = router(ServerConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"contract_protected.pdf\""
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }
}
