//! Literal values: JSON-like data in `default=` options and `example` bodies

use super::error::{SyntaxErrorKind, SyntaxResult};
use super::parser::SadlParser;
use crate::model::Literal;
use crate::tokens::{Token, TokenKind};
use crate::values::Decimal;
use std::collections::BTreeMap;

impl SadlParser {
    /// `= <literal>`
    pub fn parse_equals_literal(&mut self) -> SyntaxResult<Literal> {
        self.expect(TokenKind::Equals)?;
        self.parse_literal_value()
    }

    pub fn parse_literal_value(&mut self) -> SyntaxResult<Literal> {
        let tok = self.next_token()?;
        self.parse_literal(tok)
    }

    /// A literal starting at `tok`, which has already been consumed
    pub fn parse_literal(&mut self, tok: Token) -> SyntaxResult<Literal> {
        match tok.kind {
            TokenKind::Symbol => Ok(match tok.text.as_str() {
                "true" => Literal::Bool(true),
                "false" => Literal::Bool(false),
                "null" => Literal::Null,
                _ => Literal::String(tok.text),
            }),
            TokenKind::String => Ok(Literal::String(tok.text)),
            TokenKind::Number => self.number_literal(&tok).map(Literal::Number),
            TokenKind::OpenBracket => {
                self.enter()?;
                let array = self.parse_literal_array();
                self.leave();
                array
            }
            TokenKind::OpenBrace => {
                self.enter()?;
                let object = self.parse_literal_object();
                self.leave();
                object
            }
            _ => Err(self.syntax_error_at(&tok)),
        }
    }

    /// A numeric token as a [`Decimal`]
    pub fn expect_number(&mut self) -> SyntaxResult<Decimal> {
        let tok = self.next_token()?;
        if !tok.is_numeric() {
            return Err(self.unexpected(&tok, "number"));
        }
        self.number_literal(&tok)
    }

    fn number_literal(&self, tok: &Token) -> SyntaxResult<Decimal> {
        Decimal::parse(&tok.text).map_err(|_| {
            self.error_at(
                SyntaxErrorKind::InvalidLiteral,
                tok,
                format!("Not a valid number: {}", tok.text),
            )
        })
    }

    fn parse_literal_array(&mut self) -> SyntaxResult<Literal> {
        let mut items = Vec::new();
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::CloseBracket => return Ok(Literal::Array(items)),
                TokenKind::Comma | TokenKind::Newline => {}
                TokenKind::Eof => return Err(self.end_of_file_error()),
                _ => items.push(self.parse_literal(tok)?),
            }
        }
    }

    fn parse_literal_object(&mut self) -> SyntaxResult<Literal> {
        let mut fields = BTreeMap::new();
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::CloseBrace => return Ok(Literal::Object(fields)),
                TokenKind::Comma | TokenKind::Newline => {}
                TokenKind::String => {
                    self.expect(TokenKind::Colon)?;
                    let value = self.parse_literal_value()?;
                    fields.insert(tok.text, value);
                }
                _ => return Err(self.unexpected(&tok, "string key")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn literal(source: &str) -> SyntaxResult<Literal> {
        SadlParser::new(source).parse_literal_value()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(literal("true").unwrap(), Literal::Bool(true));
        assert_eq!(literal("null").unwrap(), Literal::Null);
        assert_eq!(literal("hello").unwrap(), Literal::String("hello".into()));
        assert_eq!(literal("\"a b\"").unwrap(), Literal::String("a b".into()));
        assert_eq!(literal("-42").unwrap(), Literal::Number(Decimal::from(-42)));
    }

    #[test]
    fn test_high_precision_number() {
        let text = "3.141592653589793238462643383279502884197169399375105819";
        let Literal::Number(n) = literal(text).unwrap() else {
            panic!("not a number");
        };
        assert_eq!(n.to_string(), text);
    }

    #[test]
    fn test_nested_structures() {
        let value = literal("{\"a\": [1, 2,\n 3], \"b\": {\"c\": \"d\"},\n \"e\": false}").unwrap();
        let Literal::Object(fields) = value else {
            panic!("not an object");
        };
        assert_eq!(fields.len(), 3);
        assert_matches!(fields.get("a"), Some(Literal::Array(items)) if items.len() == 3);
        assert_matches!(fields.get("b"), Some(Literal::Object(_)));
        assert_eq!(fields.get("e"), Some(&Literal::Bool(false)));
    }

    #[test]
    fn test_malformed() {
        assert!(literal("{a: 1}").is_err());
        assert!(literal("{\"a\" 1}").is_err());
        assert!(literal("[1, 2").is_err());
        assert!(literal(")").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = "[".repeat(200);
        let err = literal(&deep).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::MaxDepth);
    }
}
