//! Syntax errors with source position and a rendered excerpt
//!
//! Every error records the line and column of the token the parser was
//! looking at, and a report containing the message followed by the lines
//! leading up to that token with the token underlined.

use crate::logging::{codes, Code};
use crate::utils::{SourceMap, Span};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// What went wrong, used to pick the error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// Generic grammar violation ("Syntax error")
    Syntax,
    UnexpectedEof,
    /// A token of the wrong kind ("Expected SYMBOL, found NEWLINE")
    UnexpectedToken,
    UnknownDirective,
    UnrecognizedOption,
    InvalidLiteral,
    InvalidPathTemplate,
    MaxDepth,
    /// An illegal token produced by the scanner
    Scanner,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("*** {report}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
    /// The message followed by the highlighted source excerpt
    pub report: String,
}

impl SyntaxError {
    pub fn new(
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        span: Span,
        source: &SourceMap,
        context_lines: u32,
    ) -> Self {
        let message = message.into();
        let report = source.format_error(&span, &message, context_lines);
        Self {
            kind,
            message,
            line: span.line(),
            column: span.column(),
            report,
        }
    }

    pub fn error_code(&self) -> Code {
        match self.kind {
            SyntaxErrorKind::Syntax => codes::syntax::SYNTAX_ERROR,
            SyntaxErrorKind::UnexpectedEof => codes::syntax::UNEXPECTED_EOF,
            SyntaxErrorKind::UnexpectedToken => codes::syntax::UNEXPECTED_TOKEN,
            SyntaxErrorKind::UnknownDirective => codes::syntax::UNKNOWN_DIRECTIVE,
            SyntaxErrorKind::UnrecognizedOption => codes::syntax::UNRECOGNIZED_OPTION,
            SyntaxErrorKind::InvalidLiteral => codes::syntax::INVALID_LITERAL,
            SyntaxErrorKind::InvalidPathTemplate => codes::syntax::INVALID_PATH_TEMPLATE,
            SyntaxErrorKind::MaxDepth => codes::syntax::MAX_RECURSION_DEPTH,
            SyntaxErrorKind::Scanner => codes::syntax::SCANNER_DIAGNOSTIC,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    #[test]
    fn test_report_rendering() {
        let source = SourceMap::new("name foo\ntype Foo Bar <\n".to_string());
        let span = Span::new(Position::new(22, 2, 14), Position::new(23, 2, 15));
        let err = SyntaxError::new(SyntaxErrorKind::Syntax, "Syntax error", span, &source, 5);

        assert_eq!((err.line, err.column), (2, 14));
        let text = err.to_string();
        assert!(text.starts_with("*** Syntax error\n"));
        assert!(text.contains("2 | type Foo Bar <"));
        assert_eq!(err.error_code(), codes::syntax::SYNTAX_ERROR);
        assert!(err.requires_halt());
    }
}
