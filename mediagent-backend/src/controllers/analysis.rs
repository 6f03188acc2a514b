use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};

use crate::ai::multi_agent::{AnalysisError, ResponseMap};
use crate::config::{Config, API_KEY_VAR};
use crate::AppState;

/// Multipart field the report file is expected under
const FILE_FIELD: &str = "file";
/// Uploaded reports are plain text; anything bigger is not a report
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

const MISSING_REPORT_CONTENT: &str = "Missing 'report_content' in request body.";
const STRING_INTERNAL_ERROR: &str = "Internal server error during agent execution.";
const FILE_INTERNAL_ERROR: &str = "Internal server error during processing.";

#[derive(Debug, Deserialize)]
struct ProcessStringRequest {
    report_content: Option<String>,
    #[serde(default)]
    include_specialists: bool,
}

#[derive(Serialize)]
struct AnalysisResponse {
    status: &'static str,
    diagnosis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename_processed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    specialist_reports: Option<ResponseMap>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            details: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Why an upload was turned away before analysis
#[derive(Debug, PartialEq)]
enum UploadError {
    MissingField,
    NoFilename,
    UnsupportedType,
    TooLarge,
    Read(String),
}

struct ReportUpload {
    filename: String,
    bytes: Vec<u8>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/process_string").route(web::post().to(process_string)));
    cfg.service(web::resource("/process_file").route(web::post().to(process_file)));
}

/// Analyze a report sent as `{"report_content": "..."}`
async fn process_string(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let request: ProcessStringRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("[ANALYSIS] Unreadable /process_string body: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_REPORT_CONTENT));
        }
    };

    let report_content = match request.report_content {
        Some(content) => content,
        None => return HttpResponse::BadRequest().json(ErrorResponse::new(MISSING_REPORT_CONTENT)),
    };

    if let Err(response) = require_api_key(&state.config) {
        return response;
    }

    match state.orchestrator.run_analysis(&report_content).await {
        Ok(diagnosis) => HttpResponse::Ok().json(AnalysisResponse {
            status: "success",
            diagnosis: diagnosis.text,
            filename_processed: None,
            specialist_reports: request
                .include_specialists
                .then_some(diagnosis.specialist_reports),
        }),
        Err(e) => analysis_error_response(e, STRING_INTERNAL_ERROR),
    }
}

/// Analyze the text of an uploaded `.txt` report (multipart field `file`)
async fn process_file(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let upload = match read_report_upload(&mut payload).await {
        Ok(upload) => upload,
        Err(e) => return upload_error_response(e),
    };

    if let Err(response) = require_api_key(&state.config) {
        return response;
    }

    let report_content = match String::from_utf8(upload.bytes) {
        Ok(text) => text,
        Err(e) => {
            log::error!("[ANALYSIS] Failed to decode {} as UTF-8: {}", upload.filename, e);
            return HttpResponse::InternalServerError().json(
                ErrorResponse::new(FILE_INTERNAL_ERROR)
                    .with_details(format!("File is not valid UTF-8 text: {}", e)),
            );
        }
    };

    log::info!(
        "[ANALYSIS] Processing uploaded report {} ({} bytes)",
        upload.filename,
        report_content.len()
    );

    match state.orchestrator.run_analysis(&report_content).await {
        Ok(diagnosis) => HttpResponse::Ok().json(AnalysisResponse {
            status: "success",
            diagnosis: diagnosis.text,
            filename_processed: Some(upload.filename),
            specialist_reports: None,
        }),
        Err(e) => analysis_error_response(e, FILE_INTERNAL_ERROR),
    }
}

/// Find the `file` field, check its name and extension, then read it
async fn read_report_upload(payload: &mut Multipart) -> Result<ReportUpload, UploadError> {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                log::debug!("[ANALYSIS] Unreadable multipart body: {}", e);
                return Err(UploadError::MissingField);
            }
        };

        let (name, filename) = {
            let disposition = field.content_disposition();
            (
                disposition.get_name().map(str::to_string),
                disposition.get_filename().map(str::to_string),
            )
        };

        // Other fields, and a `file` part without a filename (a plain form
        // value), are skipped
        let filename = match filename {
            Some(filename) if name.as_deref() == Some(FILE_FIELD) => filename,
            _ => {
                while let Some(chunk) = field.next().await {
                    chunk.map_err(|e| UploadError::Read(e.to_string()))?;
                }
                continue;
            }
        };
        if filename.is_empty() {
            return Err(UploadError::NoFilename);
        }
        if !has_txt_extension(&filename) {
            return Err(UploadError::UnsupportedType);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| UploadError::Read(e.to_string()))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(UploadError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(ReportUpload { filename, bytes });
    }

    Err(UploadError::MissingField)
}

fn has_txt_extension(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".txt")
}

fn upload_error_response(error: UploadError) -> HttpResponse {
    match error {
        UploadError::MissingField => HttpResponse::BadRequest().json(ErrorResponse::new(
            "Missing file upload. Please submit a file under the form data key 'file'.",
        )),
        UploadError::NoFilename => HttpResponse::BadRequest().json(ErrorResponse::new("No file selected.")),
        UploadError::UnsupportedType => HttpResponse::UnsupportedMediaType().json(ErrorResponse::new(
            "Invalid file type. Only .txt files are accepted for analysis.",
        )),
        UploadError::TooLarge => HttpResponse::PayloadTooLarge().json(ErrorResponse::new(format!(
            "File too large. Reports are limited to {} bytes.",
            MAX_UPLOAD_BYTES
        ))),
        UploadError::Read(detail) => {
            log::error!("[ANALYSIS] Failed to read uploaded file: {}", detail);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new(FILE_INTERNAL_ERROR).with_details(detail))
        }
    }
}

/// The request-time configuration check: no credential, no model calls
fn require_api_key(config: &Config) -> Result<(), HttpResponse> {
    if config.has_api_key() {
        return Ok(());
    }
    log::error!("[ANALYSIS] Rejecting request: {} is not set", API_KEY_VAR);
    Err(HttpResponse::InternalServerError().json(
        ErrorResponse::new(format!("API configuration error. {} is not set.", API_KEY_VAR))
            .with_message(config.api_key_help()),
    ))
}

fn analysis_error_response(error: AnalysisError, internal_error: &str) -> HttpResponse {
    match error {
        AnalysisError::ReportTooShort => HttpResponse::BadRequest().json(ErrorResponse::new(error.to_string())),
        AnalysisError::Template(_) | AnalysisError::TaskFailed(_) => {
            log::error!("[ANALYSIS] An error occurred during analysis: {}", error);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new(internal_error).with_details(error.to_string()))
        }
    }
}
