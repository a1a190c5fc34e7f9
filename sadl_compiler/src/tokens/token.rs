//! SADL token kinds and the token value produced by the scanner
//!
//! Every token carries its raw text and source span. Newlines and line comments
//! are significant to the grammar; block comments are produced by the scanner
//! but filtered out before the parser sees them.
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a scanned token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Scanner diagnostic; the token text holds the message
    Illegal,
    Eof,

    /// Letter followed by letters, digits or underscores
    Symbol,
    /// Double-quoted string or `"""` textblock, text is unescaped
    String,
    /// Integer or decimal number, optionally negative
    Number,
    /// `// ...` to end of line, text excludes the slashes
    LineComment,
    /// `/* ... */`, never seen by the parser
    BlockComment,
    Newline,

    Semicolon,
    Colon,
    Comma,
    Dot,
    At,
    Equals,
    Dollar,
    Quote,
    Slash,
    Question,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    OpenAngle,
    CloseAngle,
    Bang,
    Star,
    Ampersand,
    Backquote,
    Tilde,
    Hash,
}

impl TokenKind {
    /// Map a punctuation character to its token kind
    pub fn from_punctuation(ch: char) -> Option<Self> {
        let kind = match ch {
            ';' => Self::Semicolon,
            ':' => Self::Colon,
            ',' => Self::Comma,
            '.' => Self::Dot,
            '@' => Self::At,
            '=' => Self::Equals,
            '$' => Self::Dollar,
            '\'' => Self::Quote,
            '/' => Self::Slash,
            '?' => Self::Question,
            '{' => Self::OpenBrace,
            '}' => Self::CloseBrace,
            '[' => Self::OpenBracket,
            ']' => Self::CloseBracket,
            '(' => Self::OpenParen,
            ')' => Self::CloseParen,
            '<' => Self::OpenAngle,
            '>' => Self::CloseAngle,
            '!' => Self::Bang,
            '*' => Self::Star,
            '&' => Self::Ampersand,
            '`' => Self::Backquote,
            '~' => Self::Tilde,
            '#' => Self::Hash,
            _ => return None,
        };
        Some(kind)
    }

    /// Upper-case name used in diagnostics ("Expected SYMBOL, found NEWLINE")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Illegal => "UNDEFINED",
            Self::Eof => "EOF",
            Self::Symbol => "SYMBOL",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::LineComment => "LINE_COMMENT",
            Self::BlockComment => "BLOCK_COMMENT",
            Self::Newline => "NEWLINE",
            Self::Semicolon => "SEMICOLON",
            Self::Colon => "COLON",
            Self::Comma => "COMMA",
            Self::Dot => "DOT",
            Self::At => "AT",
            Self::Equals => "EQUALS",
            Self::Dollar => "DOLLAR",
            Self::Quote => "QUOTE",
            Self::Slash => "SLASH",
            Self::Question => "QUESTION",
            Self::OpenBrace => "OPEN_BRACE",
            Self::CloseBrace => "CLOSE_BRACE",
            Self::OpenBracket => "OPEN_BRACKET",
            Self::CloseBracket => "CLOSE_BRACKET",
            Self::OpenParen => "OPEN_PAREN",
            Self::CloseParen => "CLOSE_PAREN",
            Self::OpenAngle => "OPEN_ANGLE",
            Self::CloseAngle => "CLOSE_ANGLE",
            Self::Bang => "BANG",
            Self::Star => "STAR",
            Self::Ampersand => "AMPERSAND",
            Self::Backquote => "BACKQUOTE",
            Self::Tilde => "TILDE",
            Self::Hash => "HASH",
        }
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Symbol => TokenClass::Identifier,
            Self::String | Self::Number => TokenClass::Literal,
            Self::LineComment | Self::BlockComment => TokenClass::Comment,
            Self::Newline => TokenClass::Whitespace,
            Self::Illegal | Self::Eof => TokenClass::Special,
            _ => TokenClass::Punctuation,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token classification used for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Identifier,
    Literal,
    Punctuation,
    /// Line and block comments
    Comment,
    /// Newlines
    Whitespace,
    /// Illegal and end-of-file markers
    Special,
}

/// A scanned token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, "", span)
    }

    /// An illegal token carrying a scanner diagnostic
    pub fn illegal(message: impl Into<String>, span: Span) -> Self {
        Self::new(TokenKind::Illegal, message, span)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Symbols and strings both count as text (e.g. `name foo` or `name "foo"`)
    pub fn is_text(&self) -> bool {
        matches!(self.kind, TokenKind::Symbol | TokenKind::String)
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is_symbol(&self, name: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == name
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Symbol | TokenKind::Number => write!(f, "{} {}", self.kind, self.text),
            TokenKind::String => write!(f, "{} {:?}", self.kind, self.text),
            TokenKind::Illegal => write!(f, "{} ({})", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_mapping() {
        assert_eq!(TokenKind::from_punctuation('{'), Some(TokenKind::OpenBrace));
        assert_eq!(TokenKind::from_punctuation('<'), Some(TokenKind::OpenAngle));
        assert_eq!(TokenKind::from_punctuation('='), Some(TokenKind::Equals));
        assert_eq!(TokenKind::from_punctuation('%'), None);
    }

    #[test]
    fn test_text_predicates() {
        let span = Span::default();
        assert!(Token::new(TokenKind::Symbol, "foo", span).is_text());
        assert!(Token::new(TokenKind::String, "foo", span).is_text());
        assert!(!Token::new(TokenKind::Number, "1", span).is_text());
        assert!(Token::new(TokenKind::Number, "1", span).is_numeric());
        assert!(Token::new(TokenKind::Symbol, "type", span).is_symbol("type"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenKind::Illegal.to_string(), "UNDEFINED");
        assert_eq!(TokenKind::CloseBrace.to_string(), "CLOSE_BRACE");
        assert_eq!(TokenKind::Newline.token_class(), TokenClass::Whitespace);
    }
}
