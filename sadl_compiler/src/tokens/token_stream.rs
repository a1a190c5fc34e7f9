//! Token stream with bounded pushback for the SADL parser
//!
//! The stream pulls tokens on demand, either straight from a [`Scanner`] or from
//! a pre-scanned buffer, and hides block comments from the parser. The most
//! recently consumed tokens are remembered so the parser can push them back.

use crate::config::constants::compile_time::syntax::MAX_PUSHBACK_TOKENS;
use crate::lexical::Scanner;
use crate::tokens::token::{Token, TokenKind};
use crate::utils::Span;
use std::collections::VecDeque;

#[derive(Debug)]
enum TokenSource {
    Scanner(Scanner),
    Buffered(std::vec::IntoIter<Token>),
}

#[derive(Debug)]
pub struct TokenStream {
    source: TokenSource,
    /// Recently consumed tokens, most recent last
    history: VecDeque<Token>,
    /// Tokens pushed back by the parser, next to be returned last
    pushback: Vec<Token>,
    /// Span of the last token pulled from the source, used for a synthetic EOF
    end: Span,
    consumed: usize,
}

impl TokenStream {
    /// A stream that scans `source` lazily
    pub fn new(source: &str) -> Self {
        Self::with_source(TokenSource::Scanner(Scanner::new(source)))
    }

    /// A stream over tokens that were already scanned
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self::with_source(TokenSource::Buffered(tokens.into_iter()))
    }

    fn with_source(source: TokenSource) -> Self {
        Self {
            source,
            history: VecDeque::with_capacity(MAX_PUSHBACK_TOKENS + 1),
            pushback: Vec::with_capacity(MAX_PUSHBACK_TOKENS),
            end: Span::default(),
            consumed: 0,
        }
    }

    fn pull(&mut self) -> Token {
        loop {
            let token = match &mut self.source {
                TokenSource::Scanner(scanner) => scanner.next_token(),
                TokenSource::Buffered(tokens) => match tokens.next() {
                    Some(token) => token,
                    None => Token::eof(Span::new(self.end.end, self.end.end)),
                },
            };
            self.end = token.span;
            if token.kind != TokenKind::BlockComment {
                return token;
            }
        }
    }

    /// Consume the next significant token. At end of input this keeps
    /// returning an `Eof` token.
    pub fn next_token(&mut self) -> Token {
        let token = match self.pushback.pop() {
            Some(token) => token,
            None => self.pull(),
        };
        self.history.push_back(token.clone());
        if self.history.len() > MAX_PUSHBACK_TOKENS {
            self.history.pop_front();
        }
        self.consumed += 1;
        token
    }

    /// Push the most recently consumed token back onto the stream. Returns
    /// false when nothing is left to push back.
    pub fn unget(&mut self) -> bool {
        match self.history.pop_back() {
            Some(token) => {
                self.pushback.push(token);
                self.consumed -= 1;
                true
            }
            None => false,
        }
    }

    /// Look at the next token without consuming it
    pub fn peek(&mut self) -> &Token {
        if self.pushback.is_empty() {
            let token = self.pull();
            self.pushback.push(token);
        }
        let last = self.pushback.len() - 1;
        &self.pushback[last]
    }

    /// The most recently consumed token
    pub fn last(&self) -> Option<&Token> {
        self.history.back()
    }

    /// Number of tokens consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(stream: &mut TokenStream, n: usize) -> Vec<String> {
        (0..n).map(|_| stream.next_token().text).collect()
    }

    #[test]
    fn test_block_comments_filtered() {
        let mut stream = TokenStream::new("a /* skip me */ b");
        assert_eq!(texts(&mut stream, 2), vec!["a", "b"]);
        assert!(stream.next_token().is_eof());
        assert!(stream.next_token().is_eof());
    }

    #[test]
    fn test_unget_twice() {
        let mut stream = TokenStream::new("a b c");
        assert_eq!(texts(&mut stream, 2), vec!["a", "b"]);
        assert!(stream.unget());
        assert!(stream.unget());
        assert_eq!(stream.consumed(), 0);
        assert_eq!(texts(&mut stream, 3), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unget_is_bounded() {
        let mut stream = TokenStream::new("a b c");
        texts(&mut stream, 3);
        assert!(stream.unget());
        assert!(stream.unget());
        assert!(!stream.unget());
        assert_eq!(stream.next_token().text, "b");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut stream = TokenStream::new("a b");
        assert_eq!(stream.peek().text, "a");
        assert_eq!(stream.peek().text, "a");
        assert_eq!(stream.next_token().text, "a");
        assert_eq!(stream.last().map(|t| t.text.as_str()), Some("a"));
    }

    #[test]
    fn test_buffered_source() {
        let span = Span::default();
        let tokens = vec![
            Token::new(TokenKind::Symbol, "x", span),
            Token::new(TokenKind::BlockComment, "gone", span),
            Token::new(TokenKind::Symbol, "y", span),
        ];
        let mut stream = TokenStream::from_tokens(tokens);
        assert_eq!(texts(&mut stream, 2), vec!["x", "y"]);
        assert!(stream.next_token().is_eof());
    }
}
