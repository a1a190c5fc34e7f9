//! Recursive-descent SADL parser: token access, diagnostics and directives
//!
//! The grammar is split across this module's siblings: type specifications
//! and struct/enum bodies in `types`, option lists in `options`, literal
//! values in `literal`, and HTTP operations, actions and examples in
//! `operations`. All of them are `impl SadlParser` blocks sharing the helpers
//! defined here.

use super::error::{SyntaxError, SyntaxErrorKind, SyntaxResult};
use crate::config::constants::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::config::runtime::{runtime_config, SyntaxPreferences};
use crate::extensions::{Extension, ExtensionError};
use crate::logging::codes;
use crate::model::Schema;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::{merge_comment, SourceMap, Span};
use crate::{log_debug, log_error, log_success};
use std::path::Path;

const DIRECTIVES: [&str; 8] = [
    "type", "name", "namespace", "version", "base", "http", "action", "example",
];

pub struct SadlParser {
    tokens: TokenStream,
    source: SourceMap,
    extensions: Vec<Box<dyn Extension>>,
    pub(super) schema: Schema,
    /// Comment preceding the directive being parsed
    current_comment: String,
    depth: usize,
    preferences: SyntaxPreferences,
}

impl SadlParser {
    /// A parser over `source`, scanning lazily
    pub fn new(source: &str) -> Self {
        Self::from_tokens(TokenStream::new(source), SourceMap::new(source.to_string()))
    }

    /// A parser over an already-built token stream. `source` is only used
    /// for error excerpts.
    pub fn from_tokens(tokens: TokenStream, source: SourceMap) -> Self {
        Self {
            tokens,
            source,
            extensions: Vec::new(),
            schema: Schema::default(),
            current_comment: String::new(),
            depth: 0,
            preferences: runtime_config().syntax.clone(),
        }
    }

    /// Name the source, usually with its file path. The file stem becomes the
    /// default schema name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.source = std::mem::take(&mut self.source).with_name(name);
        self
    }

    pub fn with_preferences(mut self, preferences: SyntaxPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Register an extension whose name becomes a top-level directive
    pub fn register_extension(&mut self, extension: Box<dyn Extension>) -> Result<(), ExtensionError> {
        let name = extension.name().to_string();
        if self.extensions.iter().any(|e| e.name() == name) {
            return Err(ExtensionError::AlreadyExists(name));
        }
        self.extensions.push(extension);
        Ok(())
    }

    pub fn extensions(&self) -> &[Box<dyn Extension>] {
        &self.extensions
    }

    pub fn into_extensions(self) -> Vec<Box<dyn Extension>> {
        self.extensions
    }

    // ========================================================================
    // TOP LEVEL
    // ========================================================================

    /// Parse the whole source into a [`Schema`]. Type references are not
    /// checked here; that happens when a model is built and validated.
    pub fn parse(&mut self) -> SyntaxResult<Schema> {
        log_debug!("Starting syntax analysis",
            "source" => self.source.name.as_deref().unwrap_or("<string>")
        );

        self.schema = Schema::default();
        if let Some(name) = &self.source.name {
            if let Some(stem) = Path::new(name).file_stem() {
                self.schema.name = stem.to_string_lossy().into_owned();
            }
        }

        match self.parse_directives() {
            Ok(()) => {
                let schema = std::mem::take(&mut self.schema);
                log_success!(
                    codes::success::PARSING_COMPLETE,
                    "Syntax analysis completed",
                    "types" => schema.types.len(),
                    "http" => schema.http.len(),
                    "actions" => schema.actions.len(),
                    "examples" => schema.examples.len(),
                    "tokens" => self.tokens.consumed()
                );
                Ok(schema)
            }
            Err(error) => {
                log_error!(error.error_code(), "Syntax analysis failed",
                    "line" => error.line,
                    "column" => error.column,
                    "error" => &error.message
                );
                Err(error)
            }
        }
    }

    fn parse_directives(&mut self) -> SyntaxResult<()> {
        let mut comment = String::new();
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Symbol => {
                    if self.preferences.log_directives {
                        log_debug!("Parsing directive",
                            "directive" => &tok.text,
                            "line" => tok.line()
                        );
                    }
                    let comment = std::mem::take(&mut comment);
                    match tok.text.as_str() {
                        "name" => self.parse_name_directive(&comment)?,
                        "namespace" => self.parse_namespace_directive(&comment)?,
                        "version" => self.parse_version_directive(&comment)?,
                        "base" => self.parse_base_directive(&comment)?,
                        "type" => self.parse_type_directive(comment)?,
                        "http" => self.parse_http_directive(comment)?,
                        "action" => self.parse_action_directive(comment)?,
                        "example" => self.parse_example_directive(comment)?,
                        text if text.to_ascii_lowercase().starts_with("x_") => {
                            self.parse_schema_annotation(&tok, &comment)?
                        }
                        text => self.parse_extension_directive(text, comment)?,
                    }
                }
                TokenKind::LineComment => comment = merge_comment(&comment, &tok.text),
                TokenKind::Semicolon | TokenKind::Newline => {}
                _ => return Err(self.expected_directive_error(&tok)),
            }
        }
    }

    fn parse_name_directive(&mut self, comment: &str) -> SyntaxResult<()> {
        self.schema.comment = merge_comment(&self.schema.comment, comment);
        self.schema.name = self.expect_text()?;
        self.end_of_directive()
    }

    fn parse_namespace_directive(&mut self, comment: &str) -> SyntaxResult<()> {
        self.schema.comment = merge_comment(&self.schema.comment, comment);
        let tok = self.next_token()?;
        self.schema.namespace = match tok.kind {
            TokenKind::String => tok.text,
            TokenKind::Symbol => self.dotted_name(tok.text)?,
            _ => return Err(self.unexpected(&tok, "symbol or string")),
        };
        self.end_of_directive()
    }

    fn parse_version_directive(&mut self, comment: &str) -> SyntaxResult<()> {
        self.schema.comment = merge_comment(&self.schema.comment, comment);
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::Number | TokenKind::Symbol | TokenKind::String => {
                self.schema.version = tok.text;
            }
            TokenKind::Eof => return Err(self.end_of_file_error()),
            _ => {
                return Err(self.error_at(
                    SyntaxErrorKind::UnexpectedToken,
                    &tok,
                    format!("Bad version value: {}", tok.text),
                ))
            }
        }
        self.end_of_directive()
    }

    fn parse_base_directive(&mut self, comment: &str) -> SyntaxResult<()> {
        self.schema.comment = merge_comment(&self.schema.comment, comment);
        self.schema.base = self.expect_string()?;
        self.end_of_directive()
    }

    /// `x_name`, `x_name "value"` or `x_name = "value"` at top level
    fn parse_schema_annotation(&mut self, tok: &Token, comment: &str) -> SyntaxResult<()> {
        self.schema.comment = merge_comment(&self.schema.comment, comment);
        let next = self.next_token()?;
        let value = match next.kind {
            TokenKind::Equals => self.expect_string()?,
            TokenKind::String => next.text,
            _ => {
                self.unget();
                String::new()
            }
        };
        self.schema.annotations.insert(tok.text.clone(), value);
        self.end_of_directive()
    }

    fn parse_extension_directive(&mut self, name: &str, comment: String) -> SyntaxResult<()> {
        let Some(index) = self.extensions.iter().position(|e| e.name() == name) else {
            let tok = self.last_token();
            return Err(self.expected_directive_error(&tok));
        };
        self.current_comment = comment;
        let mut extension = self.extensions.remove(index);
        let result = extension.parse_directive(self);
        self.extensions.insert(index, extension);
        self.current_comment.clear();
        result
    }

    fn expected_directive_error(&self, tok: &Token) -> SyntaxError {
        let mut names: Vec<String> = DIRECTIVES.iter().map(|d| format!("'{}'", d)).collect();
        names.extend(self.extensions.iter().map(|e| format!("'{}'", e.name())));
        self.error_at(
            SyntaxErrorKind::UnknownDirective,
            tok,
            format!("Expected one of {}", names.join(", ")),
        )
    }

    /// `a.b.c` after its first segment has been read
    fn dotted_name(&mut self, first: String) -> SyntaxResult<String> {
        let mut name = first;
        loop {
            let tok = self.next_token()?;
            if tok.kind != TokenKind::Dot {
                self.unget();
                return Ok(name);
            }
            name.push('.');
            name.push_str(&self.expect_identifier()?);
        }
    }

    fn end_of_directive(&mut self) -> SyntaxResult<()> {
        let comment = self.end_of_statement(String::new())?;
        if !comment.is_empty() {
            self.schema.comment = merge_comment(&self.schema.comment, &comment);
        }
        Ok(())
    }

    // ========================================================================
    // TOKEN ACCESS
    // ========================================================================

    /// Consume the next token. Illegal tokens from the scanner become errors
    /// here, at the point the parser reaches them.
    pub fn next_token(&mut self) -> SyntaxResult<Token> {
        let tok = self.tokens.next_token();
        if tok.kind == TokenKind::Illegal {
            return Err(self.error_at(SyntaxErrorKind::Scanner, &tok, tok.text.clone()));
        }
        Ok(tok)
    }

    /// Push the last consumed token back
    pub fn unget(&mut self) {
        self.tokens.unget();
    }

    pub fn peek_kind(&mut self) -> TokenKind {
        self.tokens.peek().kind
    }

    fn last_token(&self) -> Token {
        self.tokens
            .last()
            .cloned()
            .unwrap_or_else(|| Token::eof(Span::default()))
    }

    /// The comment that preceded the directive an extension is parsing
    pub fn current_comment(&self) -> &str {
        &self.current_comment
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn expect(&mut self, kind: TokenKind) -> SyntaxResult<Token> {
        let tok = self.next_token()?;
        if tok.kind == kind {
            return Ok(tok);
        }
        Err(self.unexpected(&tok, kind.as_str()))
    }

    pub fn expect_identifier(&mut self) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        self.assert_identifier(&tok)?;
        Ok(tok.text)
    }

    pub fn assert_identifier(&self, tok: &Token) -> SyntaxResult<()> {
        if tok.kind == TokenKind::Symbol {
            return Ok(());
        }
        Err(self.unexpected(tok, "symbol"))
    }

    pub fn expect_string(&mut self) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        if tok.kind == TokenKind::String {
            return Ok(tok.text);
        }
        Err(self.unexpected(&tok, "string"))
    }

    /// A symbol or a string
    pub fn expect_text(&mut self) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        if tok.is_text() {
            return Ok(tok.text);
        }
        Err(self.unexpected(&tok, "symbol or string"))
    }

    pub fn expect_int32(&mut self) -> SyntaxResult<i32> {
        let tok = self.next_token()?;
        if !tok.is_numeric() {
            return Err(self.unexpected(&tok, "number"));
        }
        tok.text.parse::<i32>().map_err(|_| {
            self.error_at(
                SyntaxErrorKind::InvalidLiteral,
                &tok,
                format!("Not a valid Int32: {}", tok.text),
            )
        })
    }

    // ========================================================================
    // STATEMENTS AND COMMENTS
    // ========================================================================

    /// Finish a statement: a newline, `;`, end of file, or a `}` closing the
    /// enclosing block (left unconsumed). Line comments on the way are merged
    /// into `comment`.
    pub fn end_of_statement(&mut self, mut comment: String) -> SyntaxResult<String> {
        let mut terminated = false;
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Eof | TokenKind::Newline => return Ok(comment),
                TokenKind::Semicolon => terminated = true,
                TokenKind::LineComment => comment = merge_comment(&comment, &tok.text),
                TokenKind::CloseBrace => {
                    self.unget();
                    return Ok(comment);
                }
                _ if terminated => {
                    self.unget();
                    return Ok(comment);
                }
                _ => return Err(self.syntax_error_at(&tok)),
            }
        }
    }

    /// Merge a line comment directly following the current token
    pub fn parse_trailing_comment(&mut self, comment: String) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        if tok.kind == TokenKind::LineComment {
            return Ok(merge_comment(&comment, &tok.text));
        }
        self.unget();
        Ok(comment)
    }

    /// Skip blank lines and `;` inside a block, collecting line comments.
    /// Returns true (consuming the brace) when the block's `}` is reached.
    pub fn is_block_done(&mut self, comment: &mut String) -> SyntaxResult<bool> {
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::CloseBrace => return Ok(true),
                TokenKind::LineComment => *comment = merge_comment(comment, &tok.text),
                TokenKind::Newline | TokenKind::Semicolon => {}
                TokenKind::Eof => return Err(self.end_of_file_error()),
                _ => {
                    self.unget();
                    return Ok(false);
                }
            }
        }
    }

    pub fn merge_comment(&self, first: &str, second: &str) -> String {
        merge_comment(first, second)
    }

    // ========================================================================
    // NESTING
    // ========================================================================

    pub(super) fn enter(&mut self) -> SyntaxResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            let tok = self.last_token();
            return Err(self.error_at(
                SyntaxErrorKind::MaxDepth,
                &tok,
                format!("Nesting deeper than {} levels", MAX_PARSE_DEPTH),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    pub fn error_at(&self, kind: SyntaxErrorKind, tok: &Token, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(
            kind,
            message,
            tok.span,
            &self.source,
            self.preferences.error_context_lines,
        )
    }

    /// An error positioned at the most recently consumed token
    pub fn error(&self, message: impl Into<String>) -> SyntaxError {
        let tok = self.last_token();
        self.error_at(SyntaxErrorKind::Syntax, &tok, message)
    }

    pub fn syntax_error(&self) -> SyntaxError {
        self.error("Syntax error")
    }

    pub fn syntax_error_at(&self, tok: &Token) -> SyntaxError {
        if tok.is_eof() {
            return self.error_at(SyntaxErrorKind::UnexpectedEof, tok, "Unexpected end of file");
        }
        self.error_at(SyntaxErrorKind::Syntax, tok, "Syntax error")
    }

    pub fn end_of_file_error(&self) -> SyntaxError {
        let tok = self.last_token();
        self.error_at(SyntaxErrorKind::UnexpectedEof, &tok, "Unexpected end of file")
    }

    /// "Expected <what>, found <kind>", or end of file
    pub fn unexpected(&self, tok: &Token, expected: &str) -> SyntaxError {
        if tok.is_eof() {
            return self.error_at(SyntaxErrorKind::UnexpectedEof, tok, "Unexpected end of file");
        }
        self.error_at(
            SyntaxErrorKind::UnexpectedToken,
            tok,
            format!("Expected {}, found {}", expected, tok.kind),
        )
    }
}
