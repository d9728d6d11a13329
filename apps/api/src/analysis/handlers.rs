use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::analysis::upload::{analyze_upload, validate_request, CvUpload};
use crate::errors::AppError;
use crate::scanner::MatchReport;
use crate::state::AppState;

/// POST /api/v1/analyze
/// Multipart fields: `cv_file` (PDF) and `job_description` (text).
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchReport>, AppError> {
    let mut upload: Option<CvUpload> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "cv_file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                upload = Some(CvUpload { filename, bytes });
            }
            "job_description" => job_description = field.text().await.map_err(malformed)?,
            _ => {}
        }
    }

    let upload = validate_request(upload, &job_description)?;
    let report = analyze_upload(
        state.scanner.clone(),
        state.config.upload_dir.clone(),
        upload,
        job_description,
    )
    .await?;
    Ok(Json(report))
}

/// POST /analyze
/// Same request as `handle_analyze`; errors use the flat `{"error": "..."}`
/// body the form front-end expects.
pub async fn handle_analyze_form(state: State<AppState>, multipart: Multipart) -> Response {
    match handle_analyze(state, multipart).await {
        Ok(report) => report.into_response(),
        Err(e) => e.into_plain_response(),
    }
}

fn malformed(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Malformed upload: {e}"))
    }
}
