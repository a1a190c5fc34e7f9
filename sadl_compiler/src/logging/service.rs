//! Logger backends and the service that filters events by level

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Level-filtering front end over a [`Logger`]
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Service built from the logging preferences: JSON lines when structured
    /// logging is enabled, plain text otherwise.
    pub fn with_config() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StructuredLogger)
        } else {
            Arc::new(ConsoleLogger {
                enabled: config::use_console_logging(),
            })
        };
        Self::new(logger, min_level)
    }

    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }

    pub fn log_error(&self, code: Code, message: &str) {
        self.log_event(LogEvent::error(code, message));
    }

    pub fn log_success(&self, code: Code, message: &str) {
        self.log_event(LogEvent::success(code, message));
    }

    pub fn log_info(&self, message: &str) {
        self.log_event(LogEvent::info(message));
    }

    pub fn log_warning(&self, message: &str) {
        self.log_event(LogEvent::warning(message));
    }

    pub fn log_debug(&self, message: &str) {
        self.log_event(LogEvent::debug(message));
    }
}

/// Plain text logger writing to stderr. Errors are always written; other
/// levels only when console logging is enabled so stdout stays free for
/// compiler output.
pub struct ConsoleLogger {
    pub enabled: bool,
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        if event.is_error() || self.enabled {
            eprintln!("{}", event.format());
        }
    }
}

/// JSON-lines logger writing to stderr
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.format_json() {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{}", event.format()),
        }
    }
}

/// Logger that keeps every event in memory, used by tests
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_events(&self) -> Vec<LogEvent> {
        self.events().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events().len()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn get_errors(&self) -> Vec<LogEvent> {
        self.events().iter().filter(|e| e.is_error()).cloned().collect()
    }

    pub fn has_event_with_code(&self, code: Code) -> bool {
        self.events().iter().any(|e| e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        self.events().push(event.clone());
    }
}

/// Service configured from the runtime preferences
pub fn create_configured_service() -> LoggingService {
    LoggingService::with_config()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Info);

        service.log_error(codes::syntax::SYNTAX_ERROR, "Syntax error");
        service.log_success(codes::success::PARSING_COMPLETE, "parsed");
        service.log_debug("hidden");

        assert_eq!(memory.event_count(), 2);
        assert_eq!(memory.get_errors().len(), 1);
        assert!(memory.has_event_with_code(codes::success::PARSING_COMPLETE));
    }

    #[test]
    fn test_set_min_level() {
        let memory = Arc::new(MemoryLogger::new());
        let mut service = LoggingService::new(memory.clone(), LogLevel::Error);
        service.log_warning("dropped");
        assert_eq!(memory.event_count(), 0);

        service.set_min_level(LogLevel::Debug);
        service.log_debug("kept");
        assert_eq!(memory.event_count(), 1);
        memory.clear();
        assert_eq!(memory.event_count(), 0);
    }
}
