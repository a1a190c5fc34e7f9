//! Syntax analysis: token stream to [`Schema`]
//!
//! [`SadlParser`] is a hand-written recursive-descent parser with two tokens
//! of pushback. It records every error with its line, column and a source
//! excerpt, and stops at the first one.

mod error;
mod literal;
mod operations;
mod options;
mod parser;
mod types;

pub use error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
pub use options::{OptionScope, Options};
pub use parser::SadlParser;
pub use types::ParsedTypeSpec;

use crate::logging::codes;
use crate::model::Schema;
use crate::tokens::TokenStream;
use crate::utils::SourceMap;

/// Parse source text. `name` (usually the file path) labels error excerpts
/// and supplies the default schema name.
pub fn parse_source(source: &str, name: Option<&str>) -> SyntaxResult<Schema> {
    parser_for(source, name).parse()
}

/// Parse an already-scanned token stream
pub fn parse_token_stream(tokens: TokenStream, source: SourceMap) -> SyntaxResult<Schema> {
    SadlParser::from_tokens(tokens, source).parse()
}

fn parser_for(source: &str, name: Option<&str>) -> SadlParser {
    let parser = SadlParser::new(source);
    match name {
        Some(name) => parser.with_name(name),
        None => parser,
    }
}

/// Check that the syntax error codes are registered
pub fn init_syntax_logging() -> Result<(), String> {
    let syntax_codes = [
        codes::syntax::SYNTAX_ERROR,
        codes::syntax::UNEXPECTED_EOF,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::syntax::UNKNOWN_DIRECTIVE,
        codes::syntax::UNRECOGNIZED_OPTION,
        codes::syntax::INVALID_LITERAL,
        codes::syntax::INVALID_PATH_TEMPLATE,
        codes::syntax::MAX_RECURSION_DEPTH,
        codes::syntax::SCANNER_DIAGNOSTIC,
    ];
    for code in syntax_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Syntax error code {} not found in metadata registry",
                code
            ));
        }
    }
    crate::log_debug!("Syntax error codes verified", "count" => syntax_codes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging() {
        assert!(init_syntax_logging().is_ok());
    }

    #[test]
    fn test_parse_token_stream() {
        let source = "type Foo Int32 (min=1)\n";
        let schema = parse_token_stream(TokenStream::new(source), SourceMap::new(source.to_string()))
            .unwrap();
        assert_eq!(schema.types[0].name, "Foo");
    }

    #[test]
    fn test_error_excerpt_names_source() {
        let err = parse_source("type Foo Struct {\n  a Strin g\n}\n", Some("demo.sadl")).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.report.contains("demo.sadl:2:"));
    }
}
