//! Lexical analysis for SADL source text
//!
//! [`Scanner`] produces tokens on demand; [`LexicalAnalyzer`] runs it over a
//! whole file under the compile-time size limits.

pub mod analyzer;
pub mod scanner;

use crate::config::constants::compile_time::lexical::*;
use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};
pub use scanner::Scanner;

/// Tokenize a loaded schema file with the configured preferences
pub fn tokenize_file_result(file_result: &FileProcessingResult) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

/// Check that the lexical error codes are registered and the limits are sane
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::ILLEGAL_TOKEN,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::COMMENT_TOO_LONG,
        crate::logging::codes::lexical::TOO_MANY_TOKENS,
    ];
    for code in lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code
            ));
        }
    }

    if MAX_STRING_SIZE == 0
        || MAX_IDENTIFIER_LENGTH == 0
        || MAX_COMMENT_LENGTH == 0
        || MAX_TOKEN_COUNT == 0
    {
        return Err("Lexical limits must be non-zero".to_string());
    }

    crate::log_debug!("Lexical limits initialized",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );
    Ok(())
}
