//! Loading `.sadl` schema files from disk
//!
//! Size and line limits come from compile-time constants and cannot be
//! raised at runtime. Extension checking and metric logging follow the
//! `[file_processor]` runtime preferences.

mod processor;

use crate::config::constants::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::log_debug;
use crate::logging::codes;
pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Read a schema file with the processor configured from the runtime preferences
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    create_processor().process_file(file_path)
}

/// A processor configured from the process-wide runtime preferences
pub fn create_processor() -> FileProcessor {
    FileProcessor::from_preferences(&crate::config::runtime_config().file_processor)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

pub fn get_large_file_threshold() -> u64 {
    LARGE_FILE_THRESHOLD
}

/// Check that every file processing code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    let required = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
        codes::file_processing::TOO_MANY_LINES,
    ];
    for code in &required {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor limits loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("demo.sadl");
        fs::write(&file_path, "type Name String\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.source, "type Name String\n");
    }

    #[test]
    fn test_halt_on_missing_file() {
        let error = process_file("no/such/file.sadl").unwrap_err();
        assert!(should_halt_on_error(&error));
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_limits() {
        assert_eq!(get_max_file_size(), 10 * 1024 * 1024);
        assert_eq!(get_large_file_threshold(), 1024 * 1024);
        assert!(get_large_file_threshold() <= get_max_file_size());
        assert_eq!(MAX_LINE_COUNT, 100_000);
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}
