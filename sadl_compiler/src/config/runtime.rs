// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::OnceLock;

/// Errors raised while loading a runtime configuration file
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Runtime configuration already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProcessorPreferences {
    /// Whether to require the .sadl extension
    pub require_sadl_extension: bool,

    /// Whether to enable detailed performance logging
    pub enable_performance_logging: bool,

    /// Whether to log debug information for files without the .sadl extension
    pub log_non_sadl_processing: bool,

    /// Whether to include complexity scores in output
    pub include_complexity_metrics: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_sadl_extension: env::var(env_vars::REQUIRE_SADL_EXTENSION)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_performance_logging: env::var(env_vars::ENABLE_PERFORMANCE_LOGGING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_non_sadl_processing: env::var(env_vars::LOG_NON_SADL_PROCESSING)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_complexity_metrics: env::var(env_vars::INCLUDE_COMPLEXITY_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether to collect per-class token metrics
    pub collect_detailed_metrics: bool,

    /// Whether to count newlines and comments in the token totals
    pub include_all_tokens_in_counts: bool,

    /// Whether to log string length statistics
    pub log_string_statistics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env::var(env_vars::LEXICAL_DETAILED_METRICS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_all_tokens_in_counts: env::var(env_vars::LEXICAL_INCLUDE_ALL_TOKENS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_string_statistics: env::var(env_vars::LEXICAL_LOG_STRING_STATS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxPreferences {
    /// Lines of source context shown above a syntax error
    pub error_context_lines: u32,

    /// Whether to log each directive as it is parsed
    pub log_directives: bool,
}

impl Default for SyntaxPreferences {
    fn default() -> Self {
        Self {
            error_context_lines: env::var(env_vars::SYNTAX_ERROR_CONTEXT_LINES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(crate::config::constants::compile_time::syntax::ERROR_CONTEXT_LINES),
            log_directives: env::var(env_vars::SYNTAX_LOG_DIRECTIVES)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPreferences {
    /// Whether to log each type definition as it is validated
    pub log_validation_details: bool,

    /// Whether to include counts of validated items in the success event
    pub include_validation_summary: bool,
}

impl Default for ValidationPreferences {
    fn default() -> Self {
        Self {
            log_validation_details: env::var(env_vars::VALIDATION_LOG_DETAILS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_validation_summary: env::var(env_vars::VALIDATION_INCLUDE_SUMMARY)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level of events that are logged
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var(env_vars::LOGGING_LOG_PERFORMANCE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var(env_vars::LOGGING_INCLUDE_FILE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub syntax: SyntaxPreferences,
    pub validation: ValidationPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Load a TOML config file. Sections and keys that are absent fall back
    /// to the environment-derived defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Install the process-wide runtime configuration. Must run before the first
/// call to [`runtime_config`].
pub fn init_runtime_config(config: RuntimeConfig) -> Result<(), ConfigError> {
    RUNTIME_CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// The process-wide runtime configuration, defaulting to environment values
pub fn runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get_or_init(RuntimeConfig::default)
}

/// Environment variable names for configuration
pub mod env_vars {
    // File Processor
    pub const REQUIRE_SADL_EXTENSION: &str = "SADL_REQUIRE_SADL_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "SADL_ENABLE_PERFORMANCE_LOGGING";
    pub const LOG_NON_SADL_PROCESSING: &str = "SADL_LOG_NON_SADL_PROCESSING";
    pub const INCLUDE_COMPLEXITY_METRICS: &str = "SADL_INCLUDE_COMPLEXITY_METRICS";

    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "SADL_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_ALL_TOKENS: &str = "SADL_LEXICAL_INCLUDE_ALL_TOKENS";
    pub const LEXICAL_LOG_STRING_STATS: &str = "SADL_LEXICAL_LOG_STRING_STATS";

    // Syntax
    pub const SYNTAX_ERROR_CONTEXT_LINES: &str = "SADL_SYNTAX_ERROR_CONTEXT_LINES";
    pub const SYNTAX_LOG_DIRECTIVES: &str = "SADL_SYNTAX_LOG_DIRECTIVES";

    // Validation
    pub const VALIDATION_LOG_DETAILS: &str = "SADL_VALIDATION_LOG_DETAILS";
    pub const VALIDATION_INCLUDE_SUMMARY: &str = "SADL_VALIDATION_INCLUDE_SUMMARY";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SADL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SADL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SADL_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "SADL_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "SADL_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "SADL_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("warning"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("invalid"), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
[logging]
min_log_level = "debug"

[syntax]
error_context_lines = 2
"#,
        )
        .unwrap();
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert_eq!(config.syntax.error_context_lines, 2);
        assert!(!config.syntax.log_directives);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(RuntimeConfig::from_toml_str("[logging\nmin_log_level = 3").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[file_processor]\nrequire_sadl_extension = true").unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert!(config.file_processor.require_sadl_extension);
    }

    #[test]
    fn test_load_missing_file() {
        let result = RuntimeConfig::load("/nonexistent/sadl.toml");
        assert_matches!(result, Err(ConfigError::Read { .. }));
    }
}
