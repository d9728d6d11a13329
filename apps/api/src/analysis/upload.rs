use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::scanner::extract::extract_text_from_pdf;
use crate::scanner::{MatchReport, ScannerContext};

/// A CV file as received from the client.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Rejects requests before any processing happens.
pub fn validate_request(upload: Option<CvUpload>, job_description: &str) -> Result<CvUpload, AppError> {
    let upload = upload.ok_or_else(|| AppError::Validation("No CV file uploaded".to_string()))?;

    if upload.filename.is_empty() || job_description.trim().is_empty() {
        return Err(AppError::Validation("Missing file or description".to_string()));
    }
    if !is_pdf_filename(&upload.filename) {
        return Err(AppError::Validation("Invalid file type".to_string()));
    }

    Ok(upload)
}

pub fn is_pdf_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
}

/// Runs the blocking scan on the blocking pool.
pub async fn analyze_upload(
    scanner: Arc<ScannerContext>,
    upload_dir: PathBuf,
    upload: CvUpload,
    job_description: String,
) -> Result<MatchReport, AppError> {
    let filename = upload.filename.clone();
    let report = tokio::task::spawn_blocking(move || {
        scan_upload(&scanner, &upload_dir, &upload.bytes, &job_description)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Analysis task failed: {e}")))??;

    info!(
        "Analyzed '{filename}': {}% match ({}/{} JD skills)",
        report.match_percentage,
        report.matching_skills.len(),
        report.total_jd_skills
    );
    Ok(report)
}

/// Writes the upload to a temp file in `upload_dir`, extracts its text and
/// scores it against the job description.
///
/// The temp file is deleted on every exit path: explicitly on success, by
/// `NamedTempFile`'s `Drop` on any error or panic.
pub fn scan_upload(
    scanner: &ScannerContext,
    upload_dir: &Path,
    bytes: &[u8],
    job_description: &str,
) -> Result<MatchReport, AppError> {
    let mut file = tempfile::Builder::new()
        .prefix("cv-")
        .suffix(".pdf")
        .tempfile_in(upload_dir)
        .with_context(|| format!("Failed to create upload file in {}", upload_dir.display()))?;
    file.write_all(bytes).context("Failed to write upload file")?;
    file.flush().context("Failed to write upload file")?;

    let cv_text = extract_text_from_pdf(file.path())?;

    if let Err(e) = file.close() {
        warn!("Failed to remove upload file: {e}");
    }

    Ok(scanner.match_report(&cv_text, job_description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::extract::test_support::pdf_bytes;
    use crate::scanner::PatternVocabulary;

    fn scanner() -> ScannerContext {
        let vocabulary = PatternVocabulary::from_jsonl(
            "{\"label\": \"SKILL\", \"pattern\": [{\"LOWER\": \"python\"}]}\n\
             {\"label\": \"SKILL\", \"pattern\": [{\"LOWER\": \"java\"}]}",
            Path::new("inline.jsonl"),
        )
        .unwrap();
        ScannerContext::new(vocabulary, None)
    }

    fn upload(filename: &str) -> CvUpload {
        CvUpload {
            filename: filename.to_string(),
            bytes: Bytes::from_static(b"%PDF"),
        }
    }

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let err = validate_request(None, "Python developer").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: No CV file uploaded");
    }

    #[test]
    fn test_blank_description_is_rejected() {
        let err = validate_request(Some(upload("cv.pdf")), "   \n").unwrap_err();
        assert!(err.to_string().contains("Missing file or description"));
    }

    #[test]
    fn test_empty_filename_is_rejected() {
        let err = validate_request(Some(upload("")), "Python").unwrap_err();
        assert!(err.to_string().contains("Missing file or description"));
    }

    #[test]
    fn test_non_pdf_is_rejected() {
        let err = validate_request(Some(upload("cv.docx")), "Python").unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
    }

    #[test]
    fn test_pdf_extension_check() {
        assert!(is_pdf_filename("cv.pdf"));
        assert!(is_pdf_filename("My.CV.PDF"));
        assert!(is_pdf_filename(".pdf"));
        assert!(!is_pdf_filename("pdf"));
        assert!(!is_pdf_filename("cv.pdf.exe"));
    }

    #[test]
    fn test_temp_file_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = pdf_bytes(&["Experience Python"]);
        let report = scan_upload(&scanner(), dir.path(), &bytes, "Python and Java").unwrap();
        assert_eq!(report.total_jd_skills, 2);
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_temp_file_removed_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_upload(&scanner(), dir.path(), b"not a pdf", "Python").unwrap_err();
        assert!(matches!(err, AppError::Scanner(_)));
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_missing_upload_dir_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_upload(&scanner(), &dir.path().join("gone"), b"", "Python").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_analyze_upload_runs_off_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let upload = CvUpload {
            filename: "cv.pdf".to_string(),
            bytes: Bytes::from(pdf_bytes(&["Python"])),
        };
        let report = analyze_upload(
            Arc::new(scanner()),
            dir.path().to_path_buf(),
            upload,
            "Java".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(report.missing_skills, vec!["java"]);
        assert!(is_empty_dir(dir.path()));
    }
}
