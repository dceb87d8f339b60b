//! Centralized configuration: every tunable read from the environment in
//! one place, with defaults that work for local development.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port the API server binds to.
    pub port: u16,
    /// Maximum accepted PDF upload size in bytes.
    pub max_file_size: usize,
    /// Directory for temporary upload files.
    pub upload_dir: PathBuf,
    /// Hard limit on how long one extraction subprocess may run.
    pub pdf_timeout: Duration,
    /// Command used to run the external PDF-to-text extractor.
    pub extractor_cmd: String,
    /// Script passed to the extractor command.
    pub extractor_script: String,
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 3001),
            max_file_size: env_parse("MAX_FILE_SIZE", 10 * 1024 * 1024),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            pdf_timeout: Duration::from_millis(env_parse("PDF_PROCESSING_TIMEOUT", 30_000)),
            extractor_cmd: env::var("EXTRACTOR_CMD").unwrap_or_else(|_| "python3".to_string()),
            extractor_script: env::var("EXTRACTOR_SCRIPT")
                .unwrap_or_else(|_| "pdf_parser.py".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env();
        assert!(config.max_file_size >= 1024 * 1024);
        assert!(config.pdf_timeout >= Duration::from_secs(5));
        assert!(!config.extractor_cmd.is_empty());
    }
}
