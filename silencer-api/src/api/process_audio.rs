//! POST /process-audio
//!
//! One file part: the trimmed audio is the response body. Several file
//! parts: a zip archive with every trimmed file plus
//! `processing_summary.json`.
//!
//! Optional text fields: `format` (`wav`, `wav_f32`), `min_silence_len`
//! (ms), `silence_thresh` (dBFS), `keep_silence` (ms). They apply to
//! single-file requests; batch requests always use the deployment
//! parameters and default WAV output.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use silencer_common::{OutputFormat, ParameterOverrides};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{ProcessedResult, UploadedFile, ARCHIVE_CONTENT_TYPE};
use crate::AppState;

/// Download name of batch archives
const ARCHIVE_DOWNLOAD_NAME: &str = "processed_audio.zip";

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_FILES_TOTAL: HeaderName = HeaderName::from_static("x-files-total");
const X_FILES_SUCCEEDED: HeaderName = HeaderName::from_static("x-files-succeeded");
const X_FILES_FAILED: HeaderName = HeaderName::from_static("x-files-failed");

/// Everything read from the multipart body
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<UploadedFile>,
    format: Option<String>,
    overrides: ParameterOverrides,
}

/// POST /process-audio
pub async fn process_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("process_audio", %request_id);

    async move {
        let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        let form = read_form(multipart).await?;

        let mut response = match form.files.len() {
            0 => return Err(ApiError::NoFilesProvided),
            1 => process_single(&state, form).await?,
            _ => process_batch(&state, form).await?,
        };

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }
        Ok(response)
    }
    .instrument(span)
    .await
}

/// Collect file parts and parameter fields
async fn read_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name().map(str::to_string) {
            let data = field.bytes().await?;

            // Browsers send an empty part for an untouched file input
            if filename.is_empty() && data.is_empty() {
                debug!(field = %name, "Skipping empty file part");
                continue;
            }

            debug!(field = %name, filename = %filename, bytes = data.len(), "Received file part");
            form.files.push(UploadedFile::new(name, &filename, data));
            continue;
        }

        let value = field.text().await?;
        let value = value.trim();
        match name.as_str() {
            "format" => form.format = Some(value.to_string()),
            "min_silence_len" => form.overrides.min_silence_len_ms = Some(parse_field(&name, value)?),
            "silence_thresh" => form.overrides.silence_thresh_db = Some(parse_field(&name, value)?),
            "keep_silence" => form.overrides.keep_silence_ms = Some(parse_field(&name, value)?),
            _ => debug!(field = %name, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn parse_field<T: std::str::FromStr>(name: &str, value: &str) -> ApiResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid value for {}: {:?} ({})", name, value, e)))
}

async fn process_single(state: &AppState, mut form: UploadForm) -> ApiResult<Response> {
    let file = form.files.remove(0);
    let params = state.config.processing.with_overrides(&form.overrides)?;
    let output_format = OutputFormat::parse_or_default(form.format.as_deref());

    info!(
        filename = %file.filename,
        bytes = file.size(),
        format = output_format.name(),
        min_silence_len_ms = params.min_silence_len_ms,
        silence_thresh_db = params.silence_thresh_db,
        keep_silence_ms = params.keep_silence_ms,
        "Processing single file"
    );

    let stem = file.stem().to_string();
    match state
        .orchestrator
        .process_file(Arc::new(file), params, output_format)
        .await
    {
        ProcessedResult::Success(output) => {
            let download_name = format!("{}_processed.{}", stem, output_format.extension());
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(output.content_type));
            headers.insert(header::CONTENT_DISPOSITION, attachment(&download_name)?);
            Ok((headers, output.data).into_response())
        }
        ProcessedResult::Failure { error, .. } => Err(ApiError::File(error)),
    }
}

async fn process_batch(state: &AppState, form: UploadForm) -> ApiResult<Response> {
    if !form.overrides.is_empty() || form.format.is_some() {
        warn!("Parameter and format fields are ignored for multi-file requests");
    }

    info!(files = form.files.len(), "Processing batch");

    let outcome = state
        .orchestrator
        .process_batch(form.files, state.config.processing)
        .await?;

    let counts = outcome.summary.counts;
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ARCHIVE_CONTENT_TYPE));
    headers.insert(header::CONTENT_DISPOSITION, attachment(ARCHIVE_DOWNLOAD_NAME)?);
    headers.insert(X_FILES_TOTAL, HeaderValue::from(counts.total));
    headers.insert(X_FILES_SUCCEEDED, HeaderValue::from(counts.succeeded));
    headers.insert(X_FILES_FAILED, HeaderValue::from(counts.failed));

    Ok((headers, outcome.archive.data).into_response())
}

/// `attachment; filename="..."` with characters that would break the header replaced
fn attachment(filename: &str) -> ApiResult<HeaderValue> {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .map_err(|e| ApiError::Internal(format!("invalid download name: {}", e)))
}

/// Build processing routes
pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process-audio", post(process_audio))
}
