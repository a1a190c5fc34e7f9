//! Parenthesized option lists: `(required, min=0, pattern="^a", x_foo="bar")`
//!
//! Which keys a list accepts depends on where it appears and on the type it
//! follows. `x_*` annotations are accepted everywhere.

use super::error::{SyntaxErrorKind, SyntaxResult};
use super::parser::SadlParser;
use crate::model::{Annotations, Literal, NumberKind, TypeSpec};
use crate::tokens::TokenKind;
use crate::values::Decimal;

/// Everything an option list can carry. Unset keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options {
    pub required: bool,
    pub default: Option<Literal>,
    pub pattern: Option<String>,
    pub values: Option<Vec<String>>,
    pub min_size: Option<i32>,
    pub max_size: Option<i32>,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub operation: Option<String>,
    /// Provider named by an extension directive
    pub action: Option<String>,
    pub reference: Option<String>,
    pub header: Option<String>,
    pub annotations: Annotations,
}

impl Options {
    /// Fold a later option list into this one; keys set in `other` win
    pub fn merge(&mut self, other: Options) {
        self.required |= other.required;
        if other.default.is_some() {
            self.default = other.default;
        }
        if other.pattern.is_some() {
            self.pattern = other.pattern;
        }
        if other.values.is_some() {
            self.values = other.values;
        }
        if other.min_size.is_some() {
            self.min_size = other.min_size;
        }
        if other.max_size.is_some() {
            self.max_size = other.max_size;
        }
        if other.min.is_some() {
            self.min = other.min;
        }
        if other.max.is_some() {
            self.max = other.max;
        }
        if other.operation.is_some() {
            self.operation = other.operation;
        }
        if other.action.is_some() {
            self.action = other.action;
        }
        if other.reference.is_some() {
            self.reference = other.reference;
        }
        if other.header.is_some() {
            self.header = other.header;
        }
        self.annotations.extend(other.annotations);
    }

    /// Copy the structural constraints onto the spec they were written for
    pub fn apply_constraints(&self, spec: &mut TypeSpec) {
        match spec {
            TypeSpec::Number { min, max, .. } => {
                if self.min.is_some() {
                    *min = self.min.clone();
                }
                if self.max.is_some() {
                    *max = self.max.clone();
                }
            }
            TypeSpec::String(s) => {
                if self.pattern.is_some() {
                    s.pattern = self.pattern.clone();
                }
                if self.values.is_some() {
                    s.values = self.values.clone();
                }
                if self.min_size.is_some() {
                    s.min_size = self.min_size;
                }
                if self.max_size.is_some() {
                    s.max_size = self.max_size;
                }
                if self.reference.is_some() {
                    s.reference = self.reference.clone();
                }
            }
            TypeSpec::Uuid { reference } => {
                if self.reference.is_some() {
                    *reference = self.reference.clone();
                }
            }
            TypeSpec::Bytes { min_size, max_size }
            | TypeSpec::Array {
                min_size, max_size, ..
            }
            | TypeSpec::Map {
                min_size, max_size, ..
            } => {
                if self.min_size.is_some() {
                    *min_size = self.min_size;
                }
                if self.max_size.is_some() {
                    *max_size = self.max_size;
                }
            }
            _ => {}
        }
    }
}

/// Where an option list appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    /// After a `type` directive's base type
    TypeDef,
    /// After a struct field
    Field,
    /// After an HTTP input or output parameter
    HttpParam,
}

impl OptionScope {
    /// Lower-case option keys accepted after a spec of `type_name`
    pub fn acceptable(&self, type_name: &str) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = match type_name {
            "String" if *self == OptionScope::TypeDef => {
                vec!["pattern", "values", "minsize", "maxsize"]
            }
            "String" => vec!["pattern", "values", "minsize", "maxsize", "reference"],
            "UUID" if *self != OptionScope::TypeDef => vec!["reference"],
            "Bytes" | "Array" | "Map" => vec!["minsize", "maxsize"],
            name if NumberKind::from_name(name).is_some() => vec!["min", "max"],
            _ => Vec::new(),
        };
        if *self != OptionScope::TypeDef {
            keys.extend(["required", "default"]);
        }
        if *self == OptionScope::HttpParam {
            keys.push("header");
        }
        keys
    }
}

impl SadlParser {
    /// Parse an option list if one follows. `context` names the construct
    /// in error messages; `acceptable` holds lower-case keys.
    pub fn parse_options(&mut self, context: &str, acceptable: &[&str]) -> SyntaxResult<Options> {
        let mut options = Options::default();
        let tok = self.next_token()?;
        if tok.kind != TokenKind::OpenParen {
            self.unget();
            return Ok(options);
        }

        let mut expect_key = true;
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Newline => continue,
                TokenKind::CloseParen => return Ok(options),
                TokenKind::Comma if !expect_key => {
                    expect_key = true;
                    continue;
                }
                TokenKind::Symbol if expect_key => expect_key = false,
                _ if expect_key => return Err(self.unexpected(&tok, "option name")),
                _ => return Err(self.unexpected(&tok, "',' or ')'")),
            }

            let key = tok.text.to_ascii_lowercase();
            if key.starts_with("x_") {
                let value = self.parse_annotation_value()?;
                options.annotations.insert(tok.text, value);
                continue;
            }
            if !acceptable.contains(&key.as_str()) {
                return Err(self.error_at(
                    SyntaxErrorKind::UnrecognizedOption,
                    &tok,
                    format!("Unrecognized option for {}: {}", context, tok.text),
                ));
            }

            match key.as_str() {
                "required" => options.required = true,
                "default" => options.default = Some(self.parse_equals_literal()?),
                "pattern" => options.pattern = Some(self.expect_equals_string()?),
                "values" => options.values = Some(self.expect_equals_string_array()?),
                "minsize" => options.min_size = Some(self.expect_equals_int32()?),
                "maxsize" => options.max_size = Some(self.expect_equals_int32()?),
                "min" => options.min = Some(self.expect_equals_number()?),
                "max" => options.max = Some(self.expect_equals_number()?),
                "operation" => options.operation = Some(self.expect_equals_identifier()?),
                "action" => options.action = Some(self.expect_equals_identifier()?),
                "reference" => options.reference = Some(self.expect_equals_identifier()?),
                "header" => options.header = Some(self.expect_equals_string()?),
                _ => {
                    return Err(self.error_at(
                        SyntaxErrorKind::UnrecognizedOption,
                        &tok,
                        format!("Unrecognized option for {}: {}", context, tok.text),
                    ))
                }
            }
        }
    }

    /// `= "value"`, or nothing for a bare flag
    fn parse_annotation_value(&mut self) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        if tok.kind == TokenKind::Equals {
            return self.expect_string();
        }
        self.unget();
        Ok(String::new())
    }

    fn expect_equals_string(&mut self) -> SyntaxResult<String> {
        self.expect(TokenKind::Equals)?;
        self.expect_string()
    }

    fn expect_equals_identifier(&mut self) -> SyntaxResult<String> {
        self.expect(TokenKind::Equals)?;
        self.expect_identifier()
    }

    fn expect_equals_int32(&mut self) -> SyntaxResult<i32> {
        self.expect(TokenKind::Equals)?;
        self.expect_int32()
    }

    fn expect_equals_number(&mut self) -> SyntaxResult<Decimal> {
        self.expect(TokenKind::Equals)?;
        self.expect_number()
    }

    /// `= ["a", "b", ...]`
    fn expect_equals_string_array(&mut self) -> SyntaxResult<Vec<String>> {
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::OpenBracket)?;
        let mut values = Vec::new();
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::CloseBracket => return Ok(values),
                TokenKind::Comma | TokenKind::Newline => {}
                TokenKind::String => values.push(tok.text),
                _ => return Err(self.unexpected(&tok, "string")),
            }
        }
    }
}
