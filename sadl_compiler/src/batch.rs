//! Batch compilation of schema directories
//!
//! Files are discovered by extension, sorted, and compiled either one after
//! another or on worker threads. Each file gets its own parser; the only
//! shared state is the result list.

use crate::config::constants::compile_time::batch_processing::{
    MAX_FILES_PER_BATCH, MAX_WORKER_THREADS,
};
use crate::config::constants::compile_time::file_processing::SADL_EXTENSION;
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            recursive: true,
            max_files: None,
            progress_reporting: true,
            fail_fast: false,
        }
    }
}

impl BatchConfig {
    /// Worker count clamped to `1..=MAX_WORKER_THREADS`
    pub fn worker_count(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Order both lists by path, so parallel runs report like sequential ones
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch compile completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .sadl files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::DirectoryNotFound { .. } | Self::NoFilesFound { .. } | Self::IoError { .. } => {
                codes::batch::DISCOVERY_FAILED
            }
            Self::TooManyFiles { .. } => codes::batch::BATCH_LIMIT_EXCEEDED,
            Self::ThreadError { .. } => codes::batch::WORKER_FAILED,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    fn logged(self) -> Self {
        crate::log_error!(self.error_code(), "Batch processing failed", "error" => &self);
        self
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Find the schema files under `dir_path`, sorted by path
pub fn discover_sadl_files(dir_path: &Path, config: &BatchConfig) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    let mut files = Vec::new();
    visit_directory(dir_path, config.recursive, &mut files).map_err(BatchError::logged)?;
    files.sort();

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!("Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }
    if files.len() > MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: MAX_FILES_PER_BATCH,
        }
        .logged());
    }
    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        }
        .logged());
    }

    crate::log_debug!("File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );
    Ok(files)
}

fn visit_directory(dir_path: &Path, recursive: bool, files: &mut Vec<PathBuf>) -> Result<(), BatchError> {
    let io_error = |e: std::io::Error| BatchError::IoError {
        error: format!("{}: {}", dir_path.display(), e),
    };
    for entry in fs::read_dir(dir_path).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            if recursive {
                visit_directory(&path, recursive, files)?;
            }
        } else if is_sadl_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_sadl_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(SADL_EXTENSION))
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn compile(file_path: &Path, file_id: usize) -> Result<PipelineResult, PipelineError> {
    pipeline::process_file_with_id(&file_path.to_string_lossy(), file_id)
}

/// Compile every schema file under `dir_path` on the calling thread
pub fn process_directory_sequential(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start = Instant::now();
    crate::log_info!("Starting sequential batch compile", "directory" => dir_path.display());

    let files = discover_sadl_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!("Compiling file {} of {}: {}", file_id + 1, files.len(), file_path.display());
        }
        match compile(file_path, file_id) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch compile");
                    break;
                }
            }
        }
    }

    results.processing_duration = start.elapsed();
    log_completion(&results, 1);
    Ok(results)
}

/// Compile every schema file under `dir_path` on worker threads
pub fn process_directory_parallel(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start = Instant::now();
    let workers = config.worker_count();
    crate::log_info!("Starting parallel batch compile",
        "directory" => dir_path.display(),
        "max_threads" => workers
    );

    let files = discover_sadl_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), workers);
    crate::log_debug!("Parallel batch configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => workers
    );

    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let chunk_results = process_chunk_parallel(chunk, chunk_index * chunk_size, workers)?;
        results.merge(chunk_results);
        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch compile");
            break;
        }
    }

    results.sort();
    results.processing_duration = start.elapsed();
    log_completion(&results, workers);
    Ok(results)
}

/// Split `files` across up to `workers` threads. `first_id` is the file id of
/// `files[0]` within the whole batch.
fn process_chunk_parallel(files: &[PathBuf], first_id: usize, workers: usize) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let per_thread = (files.len() + workers - 1) / workers;

    let mut handles = Vec::new();
    for (thread_index, thread_files) in files.chunks(per_thread.max(1)).enumerate() {
        let thread_files = thread_files.to_vec();
        let base_id = first_id + thread_index * per_thread;
        let results = Arc::clone(&results);

        handles.push(thread::spawn(move || -> Result<(), BatchError> {
            for (offset, file_path) in thread_files.into_iter().enumerate() {
                let outcome = compile(&file_path, base_id + offset);
                let mut guard = results.lock().map_err(|_| BatchError::ThreadError {
                    message: "Result list poisoned by a failed worker".to_string(),
                })?;
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
            Ok(())
        }));
    }

    for handle in handles {
        handle
            .join()
            .map_err(|_| BatchError::ThreadError {
                message: "Worker thread panicked".to_string(),
            })
            .and_then(|outcome| outcome)
            .map_err(BatchError::logged)?;
    }

    let results = Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Worker still holds the result list".to_string(),
        })?
        .into_inner()
        .map_err(|_| BatchError::ThreadError {
            message: "Result list poisoned by a failed worker".to_string(),
        })?;
    Ok(results)
}

/// Files per chunk: enough to keep every worker busy, capped to bound memory
fn calculate_chunk_size(file_count: usize, workers: usize) -> usize {
    const MAX_CHUNK_SIZE: usize = 50;
    let workers = workers.max(1);
    ((file_count + workers - 1) / workers).clamp(1, MAX_CHUNK_SIZE)
}

fn log_completion(results: &BatchResults, threads: usize) {
    crate::log_success!(codes::success::BATCH_COMPLETE, "Batch compile completed",
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

/// Sequential for a single worker, parallel otherwise
pub fn process_directory_with_config(dir_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    if config.worker_count() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    const GOOD: &str = "type Name String (maxsize=64)\n";
    const BAD: &str = "type Pair Struct {\n    left Missing\n}\n";

    fn quiet(max_threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads,
            progress_reporting: false,
            ..BatchConfig::default()
        }
    }

    fn schema_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a_bad.sadl"), BAD).unwrap();
        fs::write(dir.path().join("b_good.sadl"), GOOD).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c_good.SADL"), GOOD).unwrap();
        dir
    }

    #[test]
    fn test_file_discovery() {
        let dir = schema_dir();
        let files = discover_sadl_files(dir.path(), &quiet(1)).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_bad.sadl", "b_good.sadl", "c_good.SADL"]);

        let config = BatchConfig {
            recursive: false,
            ..quiet(1)
        };
        assert_eq!(discover_sadl_files(dir.path(), &config).unwrap().len(), 2);

        let config = BatchConfig {
            max_files: Some(1),
            ..quiet(1)
        };
        assert_eq!(discover_sadl_files(dir.path(), &config).unwrap().len(), 1);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        assert_matches!(
            discover_sadl_files(dir.path(), &quiet(1)),
            Err(BatchError::NoFilesFound { .. })
        );

        let missing = dir.path().join("missing");
        let err = discover_sadl_files(&missing, &quiet(1)).unwrap_err();
        assert_matches!(err, BatchError::DirectoryNotFound { .. });
        assert_eq!(err.error_code().as_str(), "E080");
    }

    #[test]
    fn test_is_sadl_file() {
        let dir = tempdir().unwrap();
        let sadl = dir.path().join("test.sadl");
        let txt = dir.path().join("test.txt");
        fs::write(&sadl, GOOD).unwrap();
        fs::write(&txt, GOOD).unwrap();

        assert!(is_sadl_file(&sadl));
        assert!(!is_sadl_file(&txt));
        assert!(!is_sadl_file(dir.path()));
    }

    #[test]
    fn test_sequential_batch() {
        let dir = schema_dir();
        let results = process_directory_sequential(dir.path(), &quiet(1)).unwrap();

        assert_eq!(results.files_discovered, 3);
        assert_eq!(results.files_processed, 3);
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        let (path, error) = &results.failed_files[0];
        assert!(path.ends_with("a_bad.sadl"));
        assert_eq!(error.to_string(), "Undefined type 'Missing' in struct field 'Pair.left'");
        assert_eq!(results.successful_files[0].1.model.name, "b_good");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = schema_dir();
        let sequential = process_directory_sequential(dir.path(), &quiet(1)).unwrap();
        let parallel = process_directory_parallel(dir.path(), &quiet(3)).unwrap();

        assert_eq!(parallel.files_processed, sequential.files_processed);
        let paths = |r: &BatchResults| -> Vec<PathBuf> {
            r.successful_files.iter().map(|(p, _)| p.clone()).collect()
        };
        assert_eq!(paths(&parallel), paths(&sequential));
        assert_eq!(parallel.failed_files[0].0, sequential.failed_files[0].0);
    }

    #[test]
    fn test_fail_fast() {
        let dir = schema_dir();
        let config = BatchConfig {
            fail_fast: true,
            ..quiet(1)
        };
        let results = process_directory_with_config(dir.path(), &config).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_batch_results() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().starts_with("Batch compile completed: 0 files processed"));
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(100, 4), 25);
        assert_eq!(calculate_chunk_size(10, 4), 3);
        assert_eq!(calculate_chunk_size(1, 4), 1);
        assert_eq!(calculate_chunk_size(200, 4), 50);
        assert_eq!(calculate_chunk_size(0, 0), 1);
    }

    #[test]
    fn test_batch_config() {
        let config = BatchConfig::default();
        assert!(config.max_threads >= 1);
        assert!(config.recursive);
        assert!(!config.fail_fast);
        assert!(config.max_files.is_none());

        assert_eq!(quiet(0).worker_count(), 1);
        assert_eq!(quiet(64).worker_count(), MAX_WORKER_THREADS);
    }
}
