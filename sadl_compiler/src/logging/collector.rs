//! Per-file event collection for batch compiles with cargo-style output

use super::events::LogEvent;
use crate::config::constants::compile_time::logging::{LOG_BUFFER_SIZE, MAX_LOG_EVENTS_PER_FILE};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

// ============================================================================
// FILE PROCESSING CONTEXT
// ============================================================================

/// The schema file currently being compiled on this thread
#[derive(Debug, Clone)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
    pub start_time: Instant,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self {
            file_path,
            file_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

// ============================================================================
// PROCESSING SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub successful_files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_file_time: Duration,
}

impl ProcessingSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.successful_files as f64 / self.total_files as f64
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

// ============================================================================
// ERROR COLLECTOR
// ============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Thread-safe store of events keyed by schema file
pub struct ErrorCollector {
    file_events: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
    file_contexts: Mutex<BTreeMap<PathBuf, FileProcessingContext>>,
    processing_start: Instant,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            file_events: Mutex::new(BTreeMap::new()),
            file_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event for a file. Past the per-file limit a single warning
    /// is stored and further events are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut events = lock(&self.file_events);
        let file_events = events.entry(file_path.to_path_buf()).or_default();

        if file_events.len() < MAX_LOG_EVENTS_PER_FILE {
            file_events.push(event);
        } else if file_events.len() == MAX_LOG_EVENTS_PER_FILE {
            file_events.push(LogEvent::warning(&format!(
                "Too many events for file (limit: {})",
                MAX_LOG_EVENTS_PER_FILE
            )));
        }
    }

    pub fn record_file_context(&self, context: FileProcessingContext) {
        lock(&self.file_contexts).insert(context.file_path.clone(), context);
    }

    pub fn get_file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        lock(&self.file_events)
            .get(file_path)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_file_errors(&self, file_path: &Path) -> Vec<LogEvent> {
        self.get_file_events(file_path)
            .into_iter()
            .filter(LogEvent::is_error)
            .collect()
    }

    pub fn file_has_errors(&self, file_path: &Path) -> bool {
        lock(&self.file_events)
            .get(file_path)
            .is_some_and(|events| events.iter().any(LogEvent::is_error))
    }

    pub fn get_all_file_events(&self) -> BTreeMap<PathBuf, Vec<LogEvent>> {
        lock(&self.file_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.file_events);
        let contexts = lock(&self.file_contexts);

        let mut summary = ProcessingSummary {
            total_files: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..Default::default()
        };

        let mut total_file_time = Duration::ZERO;
        let mut timed_files = 0u32;

        for (file_path, file_events) in events.iter() {
            let errors = file_events.iter().filter(|e| e.is_error()).count();
            let warnings = file_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            } else {
                summary.successful_files += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if let Some(context) = contexts.get(file_path) {
                total_file_time += context.elapsed();
                timed_files += 1;
            }
        }

        if timed_files > 0 {
            summary.average_file_time = total_file_time / timed_files;
        }
        summary
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.file_events).values().map(Vec::len).sum()
    }

    /// (events stored, buffer size, fraction used)
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let used = self.total_event_count();
        (used, LOG_BUFFER_SIZE, used as f64 / LOG_BUFFER_SIZE as f64)
    }

    pub fn clear(&self) {
        lock(&self.file_events).clear();
        lock(&self.file_contexts).clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CARGO-STYLE FORMATTING
// ============================================================================

fn push_event(output: &mut String, label: &str, file_path: &Path, event: &LogEvent) {
    let location = event
        .span
        .map(|span| {
            format!(
                "\n  --> {}:{}:{}",
                file_path.display(),
                span.line(),
                span.column()
            )
        })
        .unwrap_or_default();
    output.push_str(&format!(
        "{}[{}]: {}{}\n",
        label, event.code, event.message, location
    ));
    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            output.push_str(&format!("  = {}: {}\n", key, value));
        }
    }
}

/// Render all collected errors and warnings grouped by file
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (file_path, events) in &collector.get_all_file_events() {
        let reportable: Vec<_> = events
            .iter()
            .filter(|e| e.is_error() || e.is_warning())
            .collect();
        if reportable.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", file_path.display()));
        for event in reportable {
            if event.is_error() {
                push_event(&mut output, "error", file_path, event);
                let action = event.recommended_action();
                if action != "No specific action available" {
                    output.push_str(&format!("  = help: {}\n", action));
                }
            } else {
                push_event(&mut output, "warning", file_path, event);
            }
        }
        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.has_errors() {
        output.push_str(&format!("Total errors: {}\n", summary.total_errors));
    }
    if summary.has_warnings() {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_summary_counts_files() {
        let collector = ErrorCollector::new();
        let good = Path::new("good.sadl");
        let bad = Path::new("bad.sadl");

        collector.record_event(
            good,
            LogEvent::success(codes::success::PIPELINE_COMPLETE, "done"),
        );
        collector.record_event(
            bad,
            LogEvent::error(codes::validation::UNDEFINED_TYPE, "Undefined type 'X'"),
        );
        collector.record_file_context(FileProcessingContext::new(bad.to_path_buf(), 1));

        let summary = collector.get_summary();
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.successful_files, 1);
        assert_eq!(summary.failed_files, 1);
        assert!(summary.has_errors());
        assert!(collector.file_has_errors(bad));
        assert!(!collector.file_has_errors(good));
        assert_eq!(collector.get_file_errors(bad).len(), 1);
    }

    #[test]
    fn test_per_file_limit() {
        let collector = ErrorCollector::new();
        let path = Path::new("noisy.sadl");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 10 {
            collector.record_event(path, LogEvent::info("event"));
        }
        let events = collector.get_file_events(path);
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_FILE + 1);
        assert!(events.last().unwrap().is_warning());
    }

    #[test]
    fn test_cargo_style_output() {
        let collector = ErrorCollector::new();
        collector.record_event(
            Path::new("schema.sadl"),
            LogEvent::error(codes::model::DUPLICATE_TYPE, "Duplicate type name: Foo")
                .with_context("type", "Foo"),
        );
        let output = format_cargo_style_errors(&collector);
        assert!(output.contains("Checking schema.sadl..."));
        assert!(output.contains("error[E040]: Duplicate type name: Foo"));
        assert!(output.contains("  = type: Foo"));
        assert!(output.contains("  = help: Rename one of the types"));
        assert!(output.contains("Total errors: 1"));

        collector.clear();
        assert_eq!(collector.total_event_count(), 0);
    }
}
