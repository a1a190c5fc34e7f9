//! Reading schema source files under the compile-time size and line limits

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT, SADL_EXTENSION,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .sadl, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        use codes::file_processing::*;
        match self {
            FileProcessorError::FileNotFound { .. } => FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => INVALID_EXTENSION,
            FileProcessorError::FileTooLarge { .. } => FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => PERMISSION_DENIED,
            FileProcessorError::InvalidEncoding { .. } => INVALID_ENCODING,
            FileProcessorError::IoError { .. } => IO_ERROR,
            FileProcessorError::InvalidPath { .. } => INVALID_PATH,
            FileProcessorError::TooManyLines { .. } => TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Map an I/O failure on `path` to the matching variant
    fn from_io(path: &Path, error: &std::io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => FileProcessorError::FileNotFound { path },
            ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path },
            ErrorKind::InvalidData => FileProcessorError::InvalidEncoding { path },
            _ => FileProcessorError::IoError {
                message: format!("'{}': {}", path, error),
            },
        }
    }
}

/// What is known about a schema file once it has been read
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased extension, if any
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_sadl_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    pub fn human_readable_size(&self) -> String {
        human_size(self.size)
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }

    /// Size in KB plus a tenth of the line count
    pub fn complexity_score(&self) -> f64 {
        self.size as f64 / 1024.0 + self.line_count as f64 * 0.1
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

/// Source text of one schema file with its metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// True when the file holds only whitespace
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let ms = self.processing_duration.as_secs_f64() * 1000.0;
        if ms > 0.0 {
            self.char_count() as f64 / ms
        } else {
            0.0
        }
    }
}

/// Loads schema files. Size and line limits are compile-time constants; the
/// fields here are runtime preferences.
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_sadl_extension: bool,
    pub enable_performance_logging: bool,
    pub log_non_sadl_processing: bool,
    pub include_complexity_metrics: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_sadl_extension: false,
            enable_performance_logging: true,
            log_non_sadl_processing: true,
            include_complexity_metrics: false,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_sadl_extension: prefs.require_sadl_extension,
            enable_performance_logging: prefs.enable_performance_logging,
            log_non_sadl_processing: prefs.log_non_sadl_processing,
            include_complexity_metrics: prefs.include_complexity_metrics,
        }
    }

    pub fn with_sadl_extension_required(mut self, required: bool) -> Self {
        self.require_sadl_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn with_complexity_metrics(mut self, enabled: bool) -> Self {
        self.include_complexity_metrics = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn large_file_threshold() -> u64 {
        LARGE_FILE_THRESHOLD
    }

    /// Read a schema file and return its contents with metadata
    pub fn process_file(&self, file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        log_debug!("Starting file processing", "file" => file_path);

        let path = self.validate_path(file_path)?;
        let mut metadata = self.collect_metadata(&path)?;
        self.check_limits(&metadata, file_path)?;

        let source = fs::read_to_string(&path).map_err(|e| {
            let error = FileProcessorError::from_io(&path, &e);
            log_error!(error.error_code(), "Failed to read schema file",
                "file" => file_path,
                "io_error" => e);
            error
        })?;

        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            let error = FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            };
            log_error!(error.error_code(), "File exceeds maximum line count",
                "file" => file_path,
                "lines" => line_count,
                "max_lines" => MAX_LINE_COUNT);
            return Err(error);
        }
        metadata.line_count = line_count;

        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start.elapsed(),
        };
        self.log_success(&result, file_path);

        if !result.metadata.is_sadl_file && self.log_non_sadl_processing {
            log_debug!("Processing file without .sadl extension",
                "file" => file_path,
                "extension" => result.metadata.extension.as_deref().unwrap_or("none"));
        }
        Ok(result)
    }

    fn log_success(&self, result: &FileProcessingResult, file_path: &str) {
        let meta = &result.metadata;
        let duration_ms = format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0);
        if !self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed successfully",
                "file" => file_path,
                "size_bytes" => meta.size,
                "lines" => meta.line_count);
            return;
        }
        let rate = format!("{:.2}", result.processing_rate());
        if self.include_complexity_metrics {
            let complexity = format!("{:.2}", meta.complexity_score());
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed successfully",
                "file" => file_path,
                "size" => meta.human_readable_size(),
                "lines" => meta.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms,
                "chars_per_ms" => rate,
                "complexity_score" => complexity,
                "is_large_file" => meta.is_large_file());
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "File processed successfully",
                "file" => file_path,
                "size" => meta.human_readable_size(),
                "lines" => meta.line_count,
                "chars" => result.char_count(),
                "duration_ms" => duration_ms,
                "chars_per_ms" => rate);
        }
    }

    fn validate_path(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        let path = Path::new(file_path);
        if file_path.is_empty() || (path.exists() && !path.is_file()) {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "Path is not a file", "path" => file_path);
            return Err(error);
        }
        if !path.exists() {
            let error = FileProcessorError::FileNotFound {
                path: file_path.to_string(),
            };
            log_error!(error.error_code(), "File not found", "path" => file_path);
            return Err(error);
        }
        path.canonicalize().map_err(|e| {
            let error = FileProcessorError::from_io(path, &e);
            log_error!(error.error_code(), "Failed to canonicalize path",
                "path" => file_path,
                "io_error" => e);
            error
        })
    }

    fn collect_metadata(&self, path: &Path) -> Result<FileMetadata, FileProcessorError> {
        let stat = fs::metadata(path).map_err(|e| {
            let error = FileProcessorError::from_io(path, &e);
            log_error!(error.error_code(), "Failed to read file metadata",
                "path" => path.display(),
                "io_error" => e);
            error
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let metadata = FileMetadata {
            path: path.to_path_buf(),
            size: stat.len(),
            is_sadl_file: extension.as_deref() == Some(SADL_EXTENSION),
            extension,
            line_count: 0,
            modified: stat.modified().ok(),
        };
        log_debug!("File metadata collected",
            "size" => metadata.human_readable_size(),
            "extension" => metadata.extension.as_deref().unwrap_or("none"),
            "is_sadl" => metadata.is_sadl_file);
        Ok(metadata)
    }

    fn check_limits(&self, metadata: &FileMetadata, file_path: &str) -> Result<(), FileProcessorError> {
        if metadata.size > MAX_FILE_SIZE {
            let error = FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            };
            log_error!(error.error_code(), "File exceeds maximum size",
                "file" => file_path,
                "size" => metadata.human_readable_size(),
                "limit" => human_size(MAX_FILE_SIZE));
            return Err(error);
        }
        if metadata.size == 0 {
            let error = FileProcessorError::EmptyFile;
            log_error!(error.error_code(), "File is empty", "file" => file_path);
            return Err(error);
        }
        if self.require_sadl_extension && !metadata.is_sadl_file {
            let error = FileProcessorError::InvalidExtension {
                extension: metadata.extension.clone(),
            };
            log_error!(error.error_code(), "File does not have the .sadl extension",
                "file" => file_path,
                "extension" => metadata.extension.as_deref().unwrap_or("none"));
            return Err(error);
        }
        Ok(())
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    const SCHEMA: &str = "name demo\n\ntype Id String (pattern=\"^[a-z]+$\")\n";

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("demo.sadl");
        fs::write(&file_path, SCHEMA).unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        assert_eq!(result.metadata.line_count, 3);
        assert!(result.metadata.is_sadl_file);
        assert_eq!(result.metadata.extension.as_deref(), Some("sadl"));
        assert_eq!(result.char_count(), SCHEMA.chars().count());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_file_not_found() {
        let result = FileProcessor::new().process_file("missing.sadl");
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let result = FileProcessor::new().process_file(dir.path().to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
        assert_matches!(
            FileProcessor::new().process_file(""),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_file_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("large.sadl");
        fs::write(&file_path, "a".repeat((MAX_FILE_SIZE + 1) as usize)).unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::FileTooLarge { size, max_size }) => {
            assert!(size > MAX_FILE_SIZE);
            assert_eq!(max_size, MAX_FILE_SIZE);
        });
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("demo.txt");
        fs::write(&file_path, SCHEMA).unwrap();
        let path = file_path.to_str().unwrap();

        let strict = FileProcessor::new().with_sadl_extension_required(true);
        assert_matches!(
            strict.process_file(path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );

        let relaxed = FileProcessor::new().process_file(path).unwrap();
        assert!(!relaxed.metadata.is_sadl_file);
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.sadl");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_too_many_lines() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("many_lines.sadl");
        fs::write(&file_path, "\n".repeat(MAX_LINE_COUNT + 1)).unwrap();

        let result = FileProcessor::new().process_file(file_path.to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::TooManyLines { lines, max_lines }) => {
            assert_eq!(lines, MAX_LINE_COUNT + 1);
            assert_eq!(max_lines, MAX_LINE_COUNT);
        });
    }

    #[test]
    fn test_large_file_metadata() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("big.sadl");
        let content = format!("// {}\n", "x".repeat(LARGE_FILE_THRESHOLD as usize));
        fs::write(&file_path, content).unwrap();

        let result = FileProcessor::new()
            .with_complexity_metrics(true)
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        assert!(result.metadata.is_large_file());
        assert!(result.metadata.complexity_score() > 1024.0);
        assert!(result.metadata.human_readable_size().ends_with("MB"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.00 KB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_error_methods() {
        let error = FileProcessorError::FileNotFound {
            path: "demo.sadl".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert!(!error.is_recoverable());
        assert!(error.requires_halt());

        let lines = FileProcessorError::TooManyLines {
            lines: 2,
            max_lines: 1,
        };
        assert_eq!(lines.error_code().as_str(), "E013");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_sadl_extension: true,
            enable_performance_logging: false,
            log_non_sadl_processing: false,
            include_complexity_metrics: true,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_sadl_extension);
        assert!(!processor.enable_performance_logging);
        assert!(!processor.log_non_sadl_processing);
        assert!(processor.include_complexity_metrics);
    }
}
