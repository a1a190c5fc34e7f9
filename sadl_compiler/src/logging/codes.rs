//! Error codes and classification for the SADL compiler
//!
//! Single source of truth for all error and success codes together with the
//! metadata (category, severity, recovery behavior) attached to each of them.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const ILLEGAL_TOKEN: Code = Code::new("E020");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

/// Syntax error codes
pub mod syntax {
    use super::Code;

    pub const SYNTAX_ERROR: Code = Code::new("E030");
    pub const UNEXPECTED_EOF: Code = Code::new("E031");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E032");
    pub const UNKNOWN_DIRECTIVE: Code = Code::new("E033");
    pub const UNRECOGNIZED_OPTION: Code = Code::new("E034");
    pub const INVALID_LITERAL: Code = Code::new("E035");
    pub const INVALID_PATH_TEMPLATE: Code = Code::new("E036");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E037");
    pub const SCANNER_DIAGNOSTIC: Code = Code::new("E038");
}

/// Model construction error codes
pub mod model {
    use super::Code;

    pub const DUPLICATE_TYPE: Code = Code::new("E040");
    pub const DUPLICATE_HTTP_OPERATION: Code = Code::new("E041");
    pub const DUPLICATE_ACTION: Code = Code::new("E042");
}

/// Validation error codes
pub mod validation {
    use super::Code;

    pub const UNDEFINED_TYPE: Code = Code::new("E050");
    pub const REQUIRED_WITH_DEFAULT: Code = Code::new("E051");
    pub const CONFLICTING_CONSTRAINTS: Code = Code::new("E052");
    pub const CONSTRAINT_VIOLATION: Code = Code::new("E053");
    pub const INVALID_UNIT_VALUE: Code = Code::new("E054");
    pub const INVALID_HTTP_BINDING: Code = Code::new("E055");
    pub const INVALID_PATTERN: Code = Code::new("E056");
    pub const INVALID_EXAMPLE: Code = Code::new("E057");
    pub const INVALID_VALUE: Code = Code::new("E058");
}

/// Extension error codes
pub mod extension {
    use super::Code;

    pub const EXTENSION_ALREADY_EXISTS: Code = Code::new("E060");
    pub const EXTENSION_VALIDATION_FAILED: Code = Code::new("E061");
}

/// Pipeline error codes
pub mod pipeline {
    use super::Code;

    pub const PIPELINE_FAILURE: Code = Code::new("E070");
    pub const OUTPUT_SERIALIZATION_FAILED: Code = Code::new("E071");
}

/// Batch processing error codes
pub mod batch {
    use super::Code;

    pub const DISCOVERY_FAILED: Code = Code::new("E080");
    pub const WORKER_FAILED: Code = Code::new("E081");
    pub const BATCH_LIMIT_EXCEEDED: Code = Code::new("E082");
}

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("E090");
    pub const INITIALIZATION_FAILURE: Code = Code::new("E091");
    pub const CONFIGURATION_ERROR: Code = Code::new("E092");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSING_COMPLETE: Code = Code::new("I030");
    pub const MODEL_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const VALIDATION_COMPLETE: Code = Code::new("I050");
    pub const EXTENSION_VALIDATION_COMPLETE: Code = Code::new("I060");
    pub const PIPELINE_COMPLETE: Code = Code::new("I070");
    pub const DECOMPILE_COMPLETE: Code = Code::new("I071");
    pub const BATCH_COMPLETE: Code = Code::new("I080");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const REGISTERED_ERRORS: &[ErrorMetadata] = &[
    // File processing
    ErrorMetadata::new("E005", "FileProcessing", Severity::High, false, true,
        "Schema file not found", "Check the file path"),
    ErrorMetadata::new("E006", "FileProcessing", Severity::Medium, false, true,
        "File does not have the .sadl extension", "Rename the file or disable the extension requirement"),
    ErrorMetadata::new("E007", "FileProcessing", Severity::High, false, true,
        "Schema file exceeds the maximum size", "Split the schema into smaller files"),
    ErrorMetadata::new("E008", "FileProcessing", Severity::Medium, false, true,
        "Schema file is empty", "Add at least one directive"),
    ErrorMetadata::new("E009", "FileProcessing", Severity::High, false, true,
        "Permission denied reading schema file", "Check file permissions"),
    ErrorMetadata::new("E010", "FileProcessing", Severity::High, false, true,
        "Schema file is not valid UTF-8", "Re-encode the file as UTF-8"),
    ErrorMetadata::new("E011", "FileProcessing", Severity::High, false, true,
        "I/O error reading schema file", "Retry or check the file system"),
    ErrorMetadata::new("E012", "FileProcessing", Severity::Medium, false, true,
        "Path is not a regular file", "Pass a .sadl file or a directory in batch mode"),
    ErrorMetadata::new("E013", "FileProcessing", Severity::High, false, true,
        "Schema file has too many lines", "Split the schema into smaller files"),
    // Lexical
    ErrorMetadata::new("E020", "Lexical", Severity::High, false, true,
        "Malformed token", "Fix the string, number or comment at the reported position"),
    ErrorMetadata::new("E023", "Lexical", Severity::High, false, true,
        "Identifier exceeds the maximum length", "Use a shorter name"),
    ErrorMetadata::new("E024", "Lexical", Severity::High, false, true,
        "String literal exceeds the maximum size", "Shorten the string"),
    ErrorMetadata::new("E026", "Lexical", Severity::Medium, false, true,
        "Comment exceeds the maximum length", "Shorten the comment"),
    ErrorMetadata::new("E027", "Lexical", Severity::Critical, false, true,
        "Too many tokens in schema file", "Split the schema into smaller files"),
    // Syntax
    ErrorMetadata::new("E030", "Syntax", Severity::High, false, true,
        "Syntax error", "Fix the statement at the reported position"),
    ErrorMetadata::new("E031", "Syntax", Severity::High, false, true,
        "Unexpected end of file", "Close all open blocks"),
    ErrorMetadata::new("E032", "Syntax", Severity::High, false, true,
        "Unexpected token", "Check the grammar of the statement"),
    ErrorMetadata::new("E033", "Syntax", Severity::High, false, true,
        "Unknown directive", "Use one of the listed directives"),
    ErrorMetadata::new("E034", "Syntax", Severity::High, false, true,
        "Option not valid for this type", "Remove the option or change the type"),
    ErrorMetadata::new("E035", "Syntax", Severity::High, false, true,
        "Invalid literal value", "Fix the literal"),
    ErrorMetadata::new("E036", "Syntax", Severity::High, false, true,
        "Malformed HTTP path template", "Balance the braces in the path template"),
    ErrorMetadata::new("E037", "Syntax", Severity::Critical, false, true,
        "Nesting exceeds the maximum depth", "Flatten nested definitions"),
    ErrorMetadata::new("E038", "Syntax", Severity::High, false, true,
        "Scanner reported a malformed token", "Fix the token at the reported position"),
    // Model
    ErrorMetadata::new("E040", "Model", Severity::High, false, true,
        "Duplicate type name", "Rename one of the types"),
    ErrorMetadata::new("E041", "Model", Severity::High, false, true,
        "Duplicate HTTP operation name", "Rename one of the operations"),
    ErrorMetadata::new("E042", "Model", Severity::High, false, true,
        "Duplicate action name", "Rename one of the actions"),
    // Validation
    ErrorMetadata::new("E050", "Validation", Severity::High, false, true,
        "Reference to an undefined type", "Define the type or fix the name"),
    ErrorMetadata::new("E051", "Validation", Severity::Medium, false, true,
        "Required field has a default value", "Remove either 'required' or 'default'"),
    ErrorMetadata::new("E052", "Validation", Severity::Medium, false, true,
        "Conflicting constraints", "Use either 'pattern' or 'values'"),
    ErrorMetadata::new("E053", "Validation", Severity::Medium, false, true,
        "Value violates its type constraints", "Fix the default or example value"),
    ErrorMetadata::new("E054", "Validation", Severity::Medium, false, true,
        "Invalid UnitValue definition", "Use a numeric value type and a String or Enum unit"),
    ErrorMetadata::new("E055", "Validation", Severity::High, false, true,
        "Invalid HTTP parameter binding", "Bind parameters to the path, query or a header"),
    ErrorMetadata::new("E056", "Validation", Severity::Medium, false, true,
        "Invalid pattern", "Fix the regular expression or pattern reference"),
    ErrorMetadata::new("E057", "Validation", Severity::Medium, false, true,
        "Invalid example", "Fix the example target or value"),
    ErrorMetadata::new("E058", "Validation", Severity::Medium, false, true,
        "Malformed scalar value", "Use the canonical format for the value type"),
    // Extension
    ErrorMetadata::new("E060", "Extension", Severity::Critical, false, true,
        "Extension registered twice", "Register each extension once"),
    ErrorMetadata::new("E061", "Extension", Severity::High, false, true,
        "Extension validation failed", "Fix the extension directive"),
    // Pipeline
    ErrorMetadata::new("E070", "Pipeline", Severity::High, false, true,
        "Pipeline failure", "See the stage error"),
    ErrorMetadata::new("E071", "Pipeline", Severity::Medium, true, false,
        "Model could not be serialized", "Report a bug"),
    // Batch
    ErrorMetadata::new("E080", "Batch", Severity::High, false, true,
        "Schema discovery failed", "Check the directory path and permissions"),
    ErrorMetadata::new("E081", "Batch", Severity::High, true, false,
        "Batch worker failed", "Retry with --sequential"),
    ErrorMetadata::new("E082", "Batch", Severity::Medium, true, false,
        "Batch limit exceeded", "Raise --max-files or process fewer files"),
    // System
    ErrorMetadata::new("E090", "System", Severity::Critical, false, true,
        "Critical internal error", "File a bug report"),
    ErrorMetadata::new("E091", "System", Severity::Critical, false, true,
        "Initialization failure", "Check the logging configuration"),
    ErrorMetadata::new("E092", "System", Severity::High, false, true,
        "Invalid configuration", "Fix the configuration file or environment"),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTERED_ERRORS
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_error_code_has_metadata() {
        let codes = [
            file_processing::FILE_NOT_FOUND,
            file_processing::TOO_MANY_LINES,
            lexical::ILLEGAL_TOKEN,
            lexical::TOO_MANY_TOKENS,
            syntax::SYNTAX_ERROR,
            syntax::SCANNER_DIAGNOSTIC,
            model::DUPLICATE_TYPE,
            validation::UNDEFINED_TYPE,
            validation::INVALID_VALUE,
            extension::EXTENSION_ALREADY_EXISTS,
            pipeline::PIPELINE_FAILURE,
            batch::WORKER_FAILED,
            system::CONFIGURATION_ERROR,
        ];
        for code in codes {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_registry_has_no_duplicate_codes() {
        let unique: HashSet<_> = REGISTERED_ERRORS.iter().map(|m| m.code).collect();
        assert_eq!(unique.len(), REGISTERED_ERRORS.len());
    }

    #[test]
    fn test_classification_defaults() {
        assert_eq!(get_description("E999"), "Unknown error");
        assert_eq!(get_category("E999"), "Unknown");
        assert_eq!(get_severity("E999"), Severity::Medium);
        assert!(is_recoverable("E999"));
        assert!(!requires_halt("E999"));
    }

    #[test]
    fn test_classification_lookup() {
        assert_eq!(get_category("E040"), "Model");
        assert_eq!(get_severity("E027"), Severity::Critical);
        assert!(requires_halt("E050"));
        assert!(is_recoverable("E081"));
        assert_eq!(get_action("E051"), "Remove either 'required' or 'default'");
    }
}
