//! On-demand SADL scanner
//!
//! `Scanner::next_token` never fails: malformed input becomes an `Illegal` token whose
//! text is the diagnostic, and the parser reports it when it consumes the token.

use crate::tokens::{Token, TokenKind};
use crate::utils::{Position, Span};

#[derive(Debug)]
pub struct Scanner {
    chars: Vec<char>,
    index: usize,
    pos: Position,
    finished: bool,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            pos: Position::start(),
            finished: false,
        }
    }

    /// Current position of the scanner
    pub fn position(&self) -> Position {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.index += 1;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.pos)
    }

    /// Scan the next token. Returns an `Eof` token once input is exhausted,
    /// and keeps returning it on further calls.
    pub fn next_token(&mut self) -> Token {
        loop {
            let start = self.pos;
            let Some(ch) = self.read() else {
                return Token::eof(Span::new(start, start));
            };
            match ch {
                '\n' => return Token::new(TokenKind::Newline, "\n", self.span_from(start)),
                '\r' => continue,
                c if c.is_whitespace() => continue,
                c if c.is_alphabetic() => return self.scan_symbol(start, c),
                c if c.is_ascii_digit() || c == '-' => return self.scan_number(start, c),
                '/' => return self.scan_slash(start),
                '"' => return self.scan_string(start),
                c => {
                    let span = self.span_from(start);
                    return match TokenKind::from_punctuation(c) {
                        Some(kind) => Token::new(kind, c.to_string(), span),
                        None => Token::illegal(format!("Unexpected character '{}'", c), span),
                    };
                }
            }
        }
    }

    fn scan_symbol(&mut self, start: Position, first: char) -> Token {
        let mut text = String::from(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.read();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Symbol, text, self.span_from(start))
    }

    fn scan_number(&mut self, start: Position, first: char) -> Token {
        let mut text = String::from(first);
        let mut got_decimal = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.read();
            } else if ch == '.' {
                text.push(ch);
                self.read();
                if got_decimal {
                    return Token::illegal(
                        format!("Malformed number: {}", text),
                        self.span_from(start),
                    );
                }
                got_decimal = true;
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, text, self.span_from(start))
    }

    fn scan_slash(&mut self, start: Position) -> Token {
        match self.peek() {
            Some('/') => {
                self.read();
                let mut text = String::new();
                // the newline stays in the input so it is scanned as its own token
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    text.push(ch);
                    self.read();
                }
                if text.ends_with('\r') {
                    text.pop();
                }
                Token::new(TokenKind::LineComment, text, self.span_from(start))
            }
            Some('*') => {
                self.read();
                let mut text = String::new();
                loop {
                    match self.read() {
                        None => {
                            return Token::illegal(
                                "Unterminated block comment",
                                self.span_from(start),
                            )
                        }
                        Some('*') if self.peek() == Some('/') => {
                            self.read();
                            return Token::new(
                                TokenKind::BlockComment,
                                text,
                                self.span_from(start),
                            );
                        }
                        Some(ch) => text.push(ch),
                    }
                }
            }
            _ => Token::new(TokenKind::Slash, "/", self.span_from(start)),
        }
    }

    /// Read the character after a backslash and return what it stands for
    fn read_escape(&mut self) -> Result<char, String> {
        match self.read() {
            None => Err("Unterminated string".to_string()),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('t') => Ok('\t'),
            Some('"') => Ok('"'),
            Some('\\') => Ok('\\'),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let ch = self.read().ok_or("Unterminated string")?;
                    let digit = ch
                        .to_digit(16)
                        .ok_or("Unicode escape must contain 4 hex digits")?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| format!("Invalid unicode escape: \\u{:04x}", code))
            }
            Some(ch) => Err(format!("Bad escape char in string: \\{}", ch)),
        }
    }

    fn scan_string(&mut self, start: Position) -> Token {
        let mut text = String::new();
        let mut escaped = false;
        loop {
            match self.read() {
                None => return Token::illegal("Unterminated string", self.span_from(start)),
                Some('"') => {
                    if text.is_empty() && !escaped && self.peek() == Some('"') {
                        self.read();
                        return self.scan_textblock(start);
                    }
                    return Token::new(TokenKind::String, text, self.span_from(start));
                }
                Some('\\') => match self.read_escape() {
                    Ok(ch) => {
                        text.push(ch);
                        escaped = true;
                    }
                    Err(message) => return Token::illegal(message, self.span_from(start)),
                },
                Some(ch) => text.push(ch),
            }
        }
    }

    /// Scan a `"""` textblock. The opening delimiter must end its line; the
    /// common leading whitespace of the content lines is removed.
    fn scan_textblock(&mut self, start: Position) -> Token {
        loop {
            match self.read() {
                None => {
                    return Token::illegal(
                        "Unexpected end of file while scanning text block",
                        self.span_from(start),
                    )
                }
                Some('\n') => break,
                Some(ch) if ch.is_whitespace() => continue,
                Some(ch) => {
                    return Token::illegal(
                        format!(
                            "Expected newline to start the text block, encountered '{}'",
                            ch
                        ),
                        self.span_from(start),
                    )
                }
            }
        }

        let mut text = String::new();
        let mut quotes = 0;
        loop {
            let Some(ch) = self.read() else {
                return Token::illegal("Unterminated string", self.span_from(start));
            };
            if ch == '"' {
                quotes += 1;
                if quotes == 3 {
                    return Token::new(
                        TokenKind::String,
                        strip_common_indent(&text),
                        self.span_from(start),
                    );
                }
                continue;
            }
            for _ in 0..quotes {
                text.push('"');
            }
            quotes = 0;
            if ch == '\\' {
                match self.read_escape() {
                    Ok(escaped) => text.push(escaped),
                    Err(message) => return Token::illegal(message, self.span_from(start)),
                }
            } else if ch != '\r' {
                text.push(ch);
            }
        }
    }
}

impl Iterator for Scanner {
    type Item = Token;

    /// Yields every token including the final `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}

/// Remove the whitespace prefix shared by all non-blank lines
fn strip_common_indent(text: &str) -> String {
    let indent = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    if indent == 0 {
        return text.to_string();
    }
    text.split('\n')
        .map(|line| line.chars().skip(indent).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
