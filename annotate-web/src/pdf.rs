//! PDF upload handling: validation, temp-file bookkeeping, and text
//! extraction through an external extractor subprocess.
//!
//! The extraction algorithm itself lives outside this codebase; the
//! extractor is any command that takes a PDF path and prints a JSON
//! object `{text, pages, word_count, extraction_method}` on stdout. This
//! module only spawns it (with a timeout), parses its output and cleans
//! up the temporary file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("no PDF file uploaded")]
    NoFile,
    #[error("only PDF files are allowed")]
    InvalidType,
    #[error("file too large, maximum size is {max_mb} MB")]
    FileTooLarge { max_mb: usize },
    #[error("PDF processing timed out after {seconds}s")]
    Timeout { seconds: u64 },
    #[error("PDF parsing failed: {details}")]
    ParsingFailed { details: String },
    #[error("invalid parsed data: no text content")]
    InvalidParsedData,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse extractor output: {0}")]
    Output(#[from] serde_json::Error),
}

impl PdfError {
    /// Short machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            PdfError::NoFile => "NO_FILE",
            PdfError::InvalidType => "INVALID_TYPE",
            PdfError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            PdfError::Timeout { .. } => "PROCESSING_TIMEOUT",
            PdfError::ParsingFailed { .. } => "PARSING_FAILED",
            PdfError::InvalidParsedData => "INVALID_PARSED_DATA",
            PdfError::Io(_) => "IO_ERROR",
            PdfError::Output(_) => "JSON_PARSE_ERROR",
        }
    }

    /// Whether the client caused the failure (vs. a server-side fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfError::NoFile | PdfError::InvalidType | PdfError::FileTooLarge { .. }
        )
    }
}

/// What the extractor prints on stdout.
#[derive(Debug, Deserialize)]
struct ParserOutput {
    text: String,
    #[serde(default)]
    pages: u32,
    #[serde(default)]
    word_count: u64,
    #[serde(default)]
    extraction_method: Option<String>,
}

/// Extraction result returned to the frontend.
#[derive(Debug, Serialize)]
pub struct ExtractedDocument {
    pub text: String,
    pub filename: String,
    pub metadata: ExtractionMetadata,
}

#[derive(Debug, Serialize)]
pub struct ExtractionMetadata {
    pub pages: u32,
    pub word_count: u64,
    pub extraction_method: String,
    pub processed_at: String,
    pub file_size: usize,
}

/// Rejects non-PDF uploads and uploads over the size cap before any
/// bytes hit the disk.
pub fn validate_upload(
    config: &Config,
    content_type: Option<&str>,
    size: usize,
) -> Result<(), PdfError> {
    if size == 0 {
        return Err(PdfError::NoFile);
    }
    if content_type != Some("application/pdf") {
        return Err(PdfError::InvalidType);
    }
    if size > config.max_file_size {
        return Err(PdfError::FileTooLarge {
            max_mb: config.max_file_size / 1024 / 1024,
        });
    }
    Ok(())
}

/// Writes the upload to a temp file, runs the extractor on it and parses
/// the output. The temp file is removed whatever happens.
pub async fn extract_text(
    config: &Config,
    pdf_bytes: &[u8],
    original_name: &str,
) -> Result<ExtractedDocument, PdfError> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let temp_path = temp_upload_path(config);
    tokio::fs::write(&temp_path, pdf_bytes).await?;

    info!(file = original_name, path = %temp_path.display(), "starting PDF text extraction");

    let result = run_extractor(config, &temp_path).await;
    cleanup_file(&temp_path).await;

    let output = result?;
    if output.text.trim().is_empty() {
        return Err(PdfError::InvalidParsedData);
    }

    info!(
        file = original_name,
        pages = output.pages,
        word_count = output.word_count,
        "PDF text extraction successful"
    );

    Ok(ExtractedDocument {
        text: output.text,
        filename: original_name.to_string(),
        metadata: ExtractionMetadata {
            pages: output.pages,
            word_count: output.word_count,
            extraction_method: output
                .extraction_method
                .unwrap_or_else(|| "unknown".to_string()),
            processed_at: Utc::now().to_rfc3339(),
            file_size: pdf_bytes.len(),
        },
    })
}

static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

fn temp_upload_path(config: &Config) -> PathBuf {
    let stamp = Utc::now().timestamp_millis();
    let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    config
        .upload_dir
        .join(format!("upload_{}_{stamp}_{seq}.pdf", std::process::id()))
}

async fn run_extractor(config: &Config, path: &Path) -> Result<ParserOutput, PdfError> {
    let child = Command::new(&config.extractor_cmd)
        .arg(&config.extractor_script)
        .arg(path)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(config.pdf_timeout, child).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(PdfError::Timeout {
                seconds: config.pdf_timeout.as_secs(),
            })
        }
    };

    debug!(code = ?output.status.code(), "extractor process finished");

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PdfError::ParsingFailed {
            details: if stderr.trim().is_empty() {
                "unknown parsing error".to_string()
            } else {
                stderr.trim().to_string()
            },
        });
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

async fn cleanup_file(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %err, "failed to clean up temporary file");
    } else {
        debug!(path = %path.display(), "cleaned up temporary file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_env()
    }

    #[test]
    fn test_validate_rejects_empty_upload() {
        let err = validate_upload(&config(), Some("application/pdf"), 0).unwrap_err();
        assert_eq!(err.code(), "NO_FILE");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_rejects_wrong_content_type() {
        let err = validate_upload(&config(), Some("text/plain"), 100).unwrap_err();
        assert_eq!(err.code(), "INVALID_TYPE");
    }

    #[test]
    fn test_validate_rejects_oversized_upload() {
        let cfg = config();
        let err =
            validate_upload(&cfg, Some("application/pdf"), cfg.max_file_size + 1).unwrap_err();
        assert_eq!(err.code(), "FILE_TOO_LARGE");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validate_accepts_pdf_within_limit() {
        assert!(validate_upload(&config(), Some("application/pdf"), 1024).is_ok());
    }

    #[test]
    fn test_temp_paths_are_distinct() {
        let cfg = config();
        assert_ne!(temp_upload_path(&cfg), temp_upload_path(&cfg));
    }
}
