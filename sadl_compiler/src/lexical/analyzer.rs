//! Eager tokenization with resource limits and metrics
//!
//! The [`Scanner`] itself never fails. The analyzer drives it to the end of the
//! input, enforces the compile-time size limits, records token metrics and
//! hands the parser a buffered [`TokenStream`]. Illegal tokens are counted but
//! left in the stream; the parser reports them where they occur.

use crate::config::constants::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::lexical::Scanner;
use crate::logging::codes;
use crate::tokens::{Token, TokenClass, TokenKind, TokenStream};
use crate::{log_debug, log_error, log_success};

/// Lexical limits exceeded while scanning
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexerError {
    #[error("Identifier too long at {line}:{column}: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, line: u32, column: u32 },

    #[error("String too large at {line}:{column}: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, line: u32, column: u32 },

    #[error("Comment too long at {line}:{column}: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize, line: u32, column: u32 },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }
}

/// Token counts gathered during one tokenization
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub symbol_tokens: usize,
    pub literal_tokens: usize,
    pub punctuation_tokens: usize,
    pub comment_tokens: usize,
    pub newline_tokens: usize,
    pub illegal_tokens: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        let class = token.kind.token_class();
        let counted = preferences.include_all_tokens_in_counts
            || !matches!(class, TokenClass::Comment | TokenClass::Whitespace);
        if counted && !token.is_eof() {
            self.total_tokens += 1;
        }
        if !preferences.collect_detailed_metrics {
            return;
        }
        match class {
            TokenClass::Identifier => self.symbol_tokens += 1,
            TokenClass::Literal => self.literal_tokens += 1,
            TokenClass::Punctuation => self.punctuation_tokens += 1,
            TokenClass::Comment => {
                self.comment_tokens += 1;
                self.max_comment_length = self.max_comment_length.max(token.text.chars().count());
            }
            TokenClass::Whitespace => self.newline_tokens += 1,
            TokenClass::Special => {
                if token.kind == TokenKind::Illegal {
                    self.illegal_tokens += 1;
                }
            }
        }
        if token.kind == TokenKind::String {
            self.record_string_length(token.text.len(), preferences);
        }
    }

    fn record_string_length(&mut self, length: usize, preferences: &LexicalPreferences) {
        self.max_string_length = self.max_string_length.max(length);
        if preferences.log_string_statistics {
            log_debug!("String literal scanned",
                "length" => length,
                "max_so_far" => self.max_string_length
            );
        }
    }
}

/// Check one token against the size limits
fn check_limits(token: &Token) -> Result<(), LexerError> {
    let (line, column) = (token.line(), token.column());
    match token.kind {
        TokenKind::Symbol => {
            let length = token.text.chars().count();
            if length > MAX_IDENTIFIER_LENGTH {
                return Err(LexerError::IdentifierTooLong { length, line, column });
            }
        }
        TokenKind::String => {
            let size = token.text.len();
            if size > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge { size, line, column });
            }
        }
        TokenKind::LineComment | TokenKind::BlockComment => {
            let length = token.text.chars().count();
            if length > MAX_COMMENT_LENGTH {
                return Err(LexerError::CommentTooLong { length, line, column });
            }
        }
        _ => {}
    }
    Ok(())
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(crate::config::runtime_config().lexical.clone())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Scan `source` to the end and buffer the tokens, including the final `Eof`
    pub fn tokenize_source(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();
        let mut tokens = Vec::new();

        for token in Scanner::new(source) {
            if tokens.len() >= MAX_TOKEN_COUNT {
                return Err(LexerError::TooManyTokens {
                    count: tokens.len(),
                });
            }
            check_limits(&token)?;
            self.metrics.record_token(&token, &self.preferences);
            tokens.push(token);
        }

        Ok(TokenStream::from_tokens(tokens))
    }

    /// Tokenize a loaded schema file, logging failures and completion
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let file_path = file_result.metadata.path.display().to_string();

        log_debug!("Starting lexical analysis",
            "file" => file_path.as_str(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size
        );

        let stream = match self.tokenize_source(&file_result.source) {
            Ok(stream) => stream,
            Err(error) => {
                log_error!(error.error_code(), &error.to_string(),
                    "file" => file_path.as_str()
                );
                return Err(error);
            }
        };

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed",
            "file" => file_path.as_str(),
            "token_count" => self.metrics.total_tokens,
            "symbols" => self.metrics.symbol_tokens,
            "literals" => self.metrics.literal_tokens,
            "comments" => self.metrics.comment_tokens,
            "illegal_tokens" => self.metrics.illegal_tokens,
            "max_string_length" => self.metrics.max_string_length
        );

        Ok(stream)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn detailed() -> LexicalPreferences {
        LexicalPreferences {
            collect_detailed_metrics: true,
            include_all_tokens_in_counts: false,
            log_string_statistics: false,
        }
    }

    #[test]
    fn test_metrics_by_class() {
        let mut analyzer = LexicalAnalyzer::with_preferences(detailed());
        let mut stream = analyzer
            .tokenize_source("type Foo String (pattern=\"^a+$\") // doc\n")
            .unwrap();

        let metrics = analyzer.metrics();
        assert_eq!(metrics.symbol_tokens, 4);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.punctuation_tokens, 3);
        assert_eq!(metrics.comment_tokens, 1);
        assert_eq!(metrics.newline_tokens, 1);
        // comments and newlines are excluded from the total by default
        assert_eq!(metrics.total_tokens, 8);
        assert_eq!(metrics.max_string_length, 4);

        assert_eq!(stream.next_token().text, "type");
    }

    #[test]
    fn test_illegal_tokens_are_kept() {
        let mut analyzer = LexicalAnalyzer::with_preferences(detailed());
        let mut stream = analyzer.tokenize_source("name % foo").unwrap();
        assert_eq!(analyzer.metrics().illegal_tokens, 1);

        stream.next_token();
        assert_eq!(stream.next_token().kind, TokenKind::Illegal);
    }

    #[test]
    fn test_identifier_limit() {
        let long_name = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let source = format!("name {}", long_name);
        let mut analyzer = LexicalAnalyzer::with_preferences(detailed());
        let err = analyzer.tokenize_source(&source).unwrap_err();
        assert_matches!(err, LexerError::IdentifierTooLong { line: 1, column: 6, .. });
        assert_eq!(err.error_code(), codes::lexical::IDENTIFIER_TOO_LONG);
    }

    #[test]
    fn test_comment_limit() {
        let source = format!("//{}\n", "x".repeat(MAX_COMMENT_LENGTH + 1));
        let mut analyzer = LexicalAnalyzer::with_preferences(detailed());
        assert_matches!(
            analyzer.tokenize_source(&source),
            Err(LexerError::CommentTooLong { .. })
        );
    }
}
