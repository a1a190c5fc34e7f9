//! `http`, `action` and `example` directives

use super::error::{SyntaxErrorKind, SyntaxResult};
use super::options::OptionScope;
use super::parser::SadlParser;
use crate::model::http::{binding_for, check_path_template};
use crate::model::{
    ExampleDef, HttpDef, HttpExceptionSpec, HttpExpectedSpec, HttpMethod, HttpParamSpec,
    OperationDef, ParamBinding, TypeSpec,
};
use crate::tokens::TokenKind;
use crate::utils::merge_comment;

impl SadlParser {
    // ========================================================================
    // HTTP
    // ========================================================================

    /// `http <METHOD> "<path>" (operation=name) { params, expect, except }`
    pub(super) fn parse_http_directive(&mut self, comment: String) -> SyntaxResult<()> {
        let method_name = self.expect_identifier()?;
        let method = HttpMethod::parse(&method_name)
            .ok_or_else(|| self.error(format!("HTTP 'method' invalid: {}", method_name)))?;

        let path_tok = self.expect(TokenKind::String)?;
        if let Err(message) = check_path_template(&path_tok.text) {
            return Err(self.error_at(SyntaxErrorKind::InvalidPathTemplate, &path_tok, message));
        }

        let options = self.parse_options("http", &["operation"])?;
        let mut hd = HttpDef::new(method, path_tok.text);
        hd.name = options.operation;
        hd.annotations = options.annotations;

        self.expect(TokenKind::OpenBrace)?;
        let mut comment = self.parse_trailing_comment(comment)?;
        loop {
            let mut item_comment = String::new();
            if self.is_block_done(&mut item_comment)? {
                comment = merge_comment(&comment, &item_comment);
                break;
            }
            let tok = self.next_token()?;
            self.assert_identifier(&tok)?;
            match tok.text.as_str() {
                "expect" => {
                    if hd.expected.is_some() {
                        return Err(self.error_at(
                            SyntaxErrorKind::Syntax,
                            &tok,
                            "Only one 'expect' is allowed per http operation",
                        ));
                    }
                    hd.expected = Some(self.parse_http_expected(item_comment)?);
                }
                "except" => hd.exceptions.push(self.parse_http_exception(item_comment)?),
                _ => {
                    self.unget();
                    let param = self.parse_http_param(&hd.path, true, item_comment)?;
                    hd.inputs.push(param);
                }
            }
        }
        hd.comment = self.end_of_statement(comment)?;
        self.schema.http.push(hd);
        Ok(())
    }

    /// An input (`top`) or expected output parameter. Inputs bind to the path
    /// template; outputs bind to a header or the response body.
    fn parse_http_param(&mut self, path: &str, top: bool, comment: String) -> SyntaxResult<HttpParamSpec> {
        let tok = self.next_token()?;
        self.assert_identifier(&tok)?;
        if tok.text == "expect" || tok.text == "except" {
            return Err(self.syntax_error_at(&tok));
        }

        let parsed = self.parse_type_spec(OptionScope::HttpParam)?;
        let type_name = parsed.spec.type_name().to_string();
        let mut options = parsed.options;
        options.merge(self.parse_options(&type_name, &OptionScope::HttpParam.acceptable(&type_name))?);

        let binding = match options.header.take() {
            Some(header) => ParamBinding::Header(header),
            None if top => binding_for(path, &tok.text),
            None => ParamBinding::Body,
        };
        let mut spec = parsed.spec;
        options.apply_constraints(&mut spec);
        let mut param = HttpParamSpec::new(tok.text, spec, binding);
        param.required = options.required;
        param.default = options.default;
        param.annotations = options.annotations;
        param.comment = self.end_of_statement(merge_comment(&comment, &parsed.comment))?;
        Ok(param)
    }

    /// `expect <status> (opts)` followed by `{ outputs }`, a single body
    /// type, or nothing
    fn parse_http_expected(&mut self, comment: String) -> SyntaxResult<HttpExpectedSpec> {
        let status = self.expect_int32()?;
        let options = self.parse_options("expect", &[])?;
        let mut expected = HttpExpectedSpec {
            status,
            outputs: Vec::new(),
            comment,
            annotations: options.annotations,
        };

        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::OpenBrace => {
                self.enter()?;
                let mut comment = self.parse_trailing_comment(std::mem::take(&mut expected.comment))?;
                loop {
                    let mut item_comment = String::new();
                    if self.is_block_done(&mut item_comment)? {
                        comment = merge_comment(&comment, &item_comment);
                        break;
                    }
                    let output = self.parse_http_param("", false, item_comment)?;
                    expected.outputs.push(output);
                }
                self.leave();
                expected.comment = self.end_of_statement(comment)?;
            }
            TokenKind::Symbol => {
                let body = HttpParamSpec::new("body", TypeSpec::named(&tok.text), ParamBinding::Body);
                expected.outputs.push(body);
                expected.comment = self.end_of_statement(std::mem::take(&mut expected.comment))?;
            }
            _ => {
                self.unget();
                expected.comment = self.end_of_statement(std::mem::take(&mut expected.comment))?;
            }
        }
        Ok(expected)
    }

    /// `except [<status>] <Type> (opts)`; a missing status means any other
    fn parse_http_exception(&mut self, comment: String) -> SyntaxResult<HttpExceptionSpec> {
        let status = match self.peek_kind() {
            TokenKind::Number => self.expect_int32()?,
            _ => 0,
        };
        let type_name = self.expect_identifier()?;
        let options = self.parse_options("except", &[])?;
        Ok(HttpExceptionSpec {
            status,
            type_name,
            annotations: options.annotations,
            comment: self.end_of_statement(comment)?,
        })
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// `action Name([Input]) [Output] [except E1, E2] (opts)`
    pub(super) fn parse_action_directive(&mut self, comment: String) -> SyntaxResult<()> {
        let mut action = OperationDef {
            name: self.expect_identifier()?,
            ..OperationDef::default()
        };

        self.expect(TokenKind::OpenParen)?;
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::CloseParen => {}
            TokenKind::Symbol => {
                action.input = Some(tok.text);
                self.expect(TokenKind::CloseParen)?;
            }
            _ => return Err(self.unexpected(&tok, "input type or ')'")),
        }

        let mut tok = self.next_token()?;
        if tok.kind == TokenKind::Symbol && tok.text != "except" {
            action.output = Some(tok.text);
            tok = self.next_token()?;
        }
        if tok.is_symbol("except") {
            loop {
                action.exceptions.push(self.expect_identifier()?);
                let next = self.next_token()?;
                if next.kind != TokenKind::Comma {
                    self.unget();
                    break;
                }
            }
        } else {
            self.unget();
        }

        let options = self.parse_options("action", &[])?;
        action.annotations = options.annotations;
        action.comment = self.end_of_statement(comment)?;
        self.schema.actions.push(action);
        Ok(())
    }

    // ========================================================================
    // EXAMPLES
    // ========================================================================

    /// `example <Type> <literal>`
    pub(super) fn parse_example_directive(&mut self, comment: String) -> SyntaxResult<()> {
        let target = self.expect_identifier()?;
        let example = self.parse_literal_value()?;
        let comment = self.end_of_statement(comment)?;
        self.schema.examples.push(ExampleDef {
            target,
            example,
            comment,
        });
        Ok(())
    }
}
