//! Type specifications: `type` directives, generic parameters, and inline
//! Struct and Enum bodies

use super::error::{SyntaxErrorKind, SyntaxResult};
use super::options::{OptionScope, Options};
use super::parser::SadlParser;
use crate::model::{
    is_base_type, EnumElementDef, StructFieldDef, TypeDef, TypeSpec, UnionVariantDef,
};
use crate::tokens::TokenKind;
use crate::utils::merge_comment;

/// A type specification as written, before the trailing option list
pub struct ParsedTypeSpec {
    pub spec: TypeSpec,
    /// Options written between `Struct`/`Enum` and the opening brace
    pub options: Options,
    /// Comment trailing the opening brace of a body
    pub comment: String,
}

impl SadlParser {
    /// `type <Name> <TypeSpec> (options)`
    pub(super) fn parse_type_directive(&mut self, comment: String) -> SyntaxResult<()> {
        let name = self.expect_identifier()?;
        let parsed = self.parse_type_spec(OptionScope::TypeDef)?;
        let super_name = parsed.spec.type_name().to_string();
        if !is_base_type(&super_name) {
            return Err(self.error(format!("Super type must be a base type: {}", super_name)));
        }

        let mut options = parsed.options;
        options.merge(self.parse_options(&super_name, &OptionScope::TypeDef.acceptable(&super_name))?);

        let mut spec = parsed.spec;
        options.apply_constraints(&mut spec);
        let mut td = TypeDef::new(name, spec);
        td.annotations = options.annotations;
        td.comment = self.end_of_statement(merge_comment(&comment, &parsed.comment))?;
        self.schema.types.push(td);
        Ok(())
    }

    /// Parse `Name`, `Name<P1,...>`, or `Struct`/`Enum` with an optional
    /// option list and body. Struct and Enum bodies are consumed through the
    /// closing brace; the caller parses trailing options and the end of the
    /// statement.
    pub fn parse_type_spec(&mut self, scope: OptionScope) -> SyntaxResult<ParsedTypeSpec> {
        let type_name = self.expect_identifier()?;
        let mut parsed = ParsedTypeSpec {
            spec: TypeSpec::named(&type_name),
            options: Options::default(),
            comment: String::new(),
        };

        let mut tok = self.next_token()?;
        if tok.kind == TokenKind::OpenAngle {
            let params = self.parse_type_params(&type_name)?;
            parsed.spec = spec_with_params(&type_name, params);
            return Ok(parsed);
        }
        if type_name != "Struct" && type_name != "Enum" {
            self.unget();
            return Ok(parsed);
        }

        if tok.kind == TokenKind::OpenParen {
            self.unget();
            parsed.options = self.parse_options(&type_name, &scope.acceptable(&type_name))?;
            tok = self.next_token()?;
        }
        if tok.kind != TokenKind::OpenBrace {
            // no body: an empty Struct or Enum
            self.unget();
            return Ok(parsed);
        }

        self.enter()?;
        parsed.comment = self.parse_trailing_comment(String::new())?;
        parsed.spec = if type_name == "Struct" {
            TypeSpec::Struct {
                fields: self.parse_struct_fields()?,
            }
        } else {
            TypeSpec::Enum {
                elements: self.parse_enum_elements()?,
            }
        };
        self.leave();
        Ok(parsed)
    }

    /// Identifiers between `<` and `>`, checked against the arity the
    /// generic type expects
    fn parse_type_params(&mut self, type_name: &str) -> SyntaxResult<Vec<String>> {
        let expected: Option<usize> = match type_name {
            "Array" => Some(1),
            "Map" | "UnitValue" => Some(2),
            "Union" => None,
            _ => return Err(self.syntax_error()),
        };
        let mut params = Vec::new();
        let mut expect_param = true;
        loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Symbol if expect_param => {
                    params.push(tok.text);
                    expect_param = false;
                }
                TokenKind::Comma if !expect_param => expect_param = true,
                TokenKind::CloseAngle if !expect_param || params.is_empty() => {
                    if expected.map_or(false, |n| n != params.len()) {
                        return Err(self.syntax_error_at(&tok));
                    }
                    return Ok(params);
                }
                _ => return Err(self.syntax_error_at(&tok)),
            }
        }
    }

    fn parse_struct_fields(&mut self) -> SyntaxResult<Vec<StructFieldDef>> {
        let mut fields = Vec::new();
        while let Some(field) = self.parse_struct_field()? {
            fields.push(field);
        }
        Ok(fields)
    }

    /// One field, or `None` once the closing brace is consumed
    fn parse_struct_field(&mut self) -> SyntaxResult<Option<StructFieldDef>> {
        let mut comment = String::new();
        if self.is_block_done(&mut comment)? {
            return Ok(None);
        }

        let name = self.expect_identifier()?;
        let parsed = self.parse_type_spec(OptionScope::Field)?;
        let type_name = parsed.spec.type_name().to_string();
        let mut options = parsed.options;
        options.merge(self.parse_options(&type_name, &OptionScope::Field.acceptable(&type_name))?);

        let mut spec = parsed.spec;
        options.apply_constraints(&mut spec);
        let mut field = StructFieldDef::new(name, spec);
        field.required = options.required;
        field.default = options.default;
        field.annotations = options.annotations;
        field.comment = self.end_of_statement(merge_comment(&comment, &parsed.comment))?;
        Ok(Some(field))
    }

    fn parse_enum_elements(&mut self) -> SyntaxResult<Vec<EnumElementDef>> {
        let mut elements = Vec::new();
        while let Some(element) = self.parse_enum_element()? {
            elements.push(element);
        }
        Ok(elements)
    }

    /// One enum symbol with its annotations and same-line comment, or `None`
    /// once the closing brace is consumed
    fn parse_enum_element(&mut self) -> SyntaxResult<Option<EnumElementDef>> {
        let mut comment = String::new();
        let symbol = loop {
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::CloseBrace => return Ok(None),
                TokenKind::LineComment => comment = merge_comment(&comment, &tok.text),
                TokenKind::Semicolon | TokenKind::Newline | TokenKind::Comma => {}
                TokenKind::Eof => return Err(self.end_of_file_error()),
                _ => {
                    self.assert_identifier(&tok)?;
                    break tok.text;
                }
            }
        };
        let options = self.parse_options("Enum", &[])?;
        let mut element = EnumElementDef::new(symbol);
        element.annotations = options.annotations;
        element.comment = self.parse_trailing_comment(comment)?;
        Ok(Some(element))
    }

    /// Used by extensions that need a bare type reference
    pub fn expect_type_name(&mut self) -> SyntaxResult<String> {
        let tok = self.next_token()?;
        if tok.kind != TokenKind::Symbol {
            return Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                &tok,
                format!("Expected type name, found {}", tok.kind),
            ));
        }
        Ok(tok.text)
    }
}

fn spec_with_params(type_name: &str, mut params: Vec<String>) -> TypeSpec {
    match type_name {
        "Array" => TypeSpec::Array {
            items: params.remove(0),
            min_size: None,
            max_size: None,
        },
        "Map" => {
            let items = params.remove(1);
            TypeSpec::Map {
                keys: params.remove(0),
                items,
                min_size: None,
                max_size: None,
            }
        }
        "UnitValue" => {
            let unit = params.remove(1);
            TypeSpec::UnitValue {
                value: params.remove(0),
                unit,
            }
        }
        _ => TypeSpec::Union {
            variants: params.iter().map(|p| UnionVariantDef::named(p)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Literal, NumberKind, Schema};
    use crate::syntax::SyntaxError;
    use crate::values::Decimal;

    fn parse(source: &str) -> Result<Schema, SyntaxError> {
        SadlParser::new(source).parse()
    }

    fn field_names(spec: &TypeSpec) -> Vec<&str> {
        match spec {
            TypeSpec::Struct { fields } => fields.iter().map(|f| f.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_generic_params() {
        let schema = parse(
            "type Money UnitValue<Decimal,String>\ntype Foo Array<String> (maxsize=2)\ntype Bar Union<Int32,String>\ntype Dict Map<String,Int64>\n",
        )
        .unwrap();
        assert_eq!(schema.types[0].spec.to_string(), "UnitValue<Decimal,String>");
        assert_eq!(
            schema.types[1].spec,
            TypeSpec::Array {
                items: "String".into(),
                min_size: None,
                max_size: Some(2)
            }
        );
        assert_eq!(schema.types[2].spec.to_string(), "Union<Int32,String>");
        assert_eq!(schema.types[3].spec.to_string(), "Map<String,Int64>");
    }

    #[test]
    fn test_param_defaults_and_arity() {
        let schema = parse("type List Array\ntype Dict Map\ntype Amount UnitValue\n").unwrap();
        assert_eq!(schema.types[0].spec.to_string(), "Array<Any>");
        assert_eq!(schema.types[1].spec.to_string(), "Map<String,Any>");
        assert_eq!(schema.types[2].spec.to_string(), "UnitValue<Decimal,String>");

        assert!(parse("type Foo Array<String,Int32>\n").is_err());
        assert!(parse("type Foo Map<String>\n").is_err());
        assert!(parse("type Foo Map<String Int32>\n").is_err());
        assert!(parse("type Foo Array<,String>\n").is_err());
        assert!(parse("type Foo Map<String,,Int32>\n").is_err());
        assert!(parse("type Foo Union<Int32,String,>\n").is_err());
        assert!(parse("type Foo String<Int32>\n").is_err());
    }

    #[test]
    fn test_super_type_must_be_base() {
        let err = parse("type Foo Bar\n").unwrap_err();
        assert_eq!(err.message, "Super type must be a base type: Bar");
    }

    #[test]
    fn test_struct_with_constraints() {
        let schema = parse(
            "type Foo Struct {\n    s String (pattern=\"y*\")\n    n Int32 (min=0, max=100)\n    a Array<Int32> (maxsize=100)\n    r Bar (required)\n}\n",
        )
        .unwrap();
        let TypeSpec::Struct { fields } = &schema.types[0].spec else {
            panic!("not a struct");
        };
        assert_eq!(fields.len(), 4);
        assert_eq!(
            fields[0].spec.string_spec().and_then(|s| s.pattern.as_deref()),
            Some("y*")
        );
        assert_eq!(
            fields[1].spec,
            TypeSpec::Number {
                kind: NumberKind::Int32,
                min: Some(Decimal::from(0)),
                max: Some(Decimal::from(100))
            }
        );
        assert_eq!(fields[3].spec, TypeSpec::named("Bar"));
        assert!(fields[3].required);
    }

    #[test]
    fn test_nested_struct_with_default() {
        let schema = parse(
            "type Test Struct {\n    // the nested one\n    mynestedstruct Struct { something String; oranother Int32 } (x_foo=\"bar\", default={\"something\": \"Hey\", \"oranother\": 23})\n}\n",
        )
        .unwrap();
        let TypeSpec::Struct { fields } = &schema.types[0].spec else {
            panic!("not a struct");
        };
        let nested = &fields[0];
        assert_eq!(nested.comment, "the nested one");
        assert_eq!(field_names(&nested.spec), vec!["something", "oranother"]);
        assert_eq!(nested.annotations.get("x_foo").map(String::as_str), Some("bar"));
        let Some(Literal::Object(default)) = &nested.default else {
            panic!("expected an object default");
        };
        assert_eq!(default.get("oranother"), Some(&Literal::Number(Decimal::from(23))));
    }

    #[test]
    fn test_field_comments() {
        let schema = parse(
            "type Point Struct { // a point\n    // horizontal\n    x Int32 (required) // pixels\n    y Int32 (required)\n}\n",
        )
        .unwrap();
        let td = &schema.types[0];
        assert_eq!(td.comment, "a point");
        let TypeSpec::Struct { fields } = &td.spec else {
            panic!("not a struct");
        };
        assert_eq!(fields[0].comment, "horizontal pixels");
        assert_eq!(fields[1].comment, "");
    }

    #[test]
    fn test_enums() {
        let schema = parse(
            "type Units Enum {in ft yd mi cm m km}\ntype Color Enum {\n    RED // warm\n    GREEN (x_hex=\"00ff00\")\n    BLUE\n}\n",
        )
        .unwrap();
        let TypeSpec::Enum { elements } = &schema.types[0].spec else {
            panic!("not an enum");
        };
        assert_eq!(elements.len(), 7);
        assert_eq!(elements[6].symbol, "km");

        let TypeSpec::Enum { elements } = &schema.types[1].spec else {
            panic!("not an enum");
        };
        assert_eq!(elements[0].comment, "warm");
        assert_eq!(
            elements[1].annotations.get("x_hex").map(String::as_str),
            Some("00ff00")
        );
        assert_eq!(elements[2].symbol, "BLUE");
    }

    #[test]
    fn test_bodiless_struct_and_enum() {
        let schema = parse("type JSONObject Struct\ntype Nothing Enum\n").unwrap();
        assert_eq!(schema.types[0].spec, TypeSpec::Struct { fields: vec![] });
        assert_eq!(schema.types[1].spec, TypeSpec::Enum { elements: vec![] });
    }

    #[test]
    fn test_struct_options_before_body() {
        let schema = parse("type Foo Struct (x_table=\"foo\") {\n    id UUID (reference=Bar)\n}\n").unwrap();
        let td = &schema.types[0];
        assert_eq!(td.annotations.get("x_table").map(String::as_str), Some("foo"));
        let TypeSpec::Struct { fields } = &td.spec else {
            panic!("not a struct");
        };
        assert_eq!(
            fields[0].spec,
            TypeSpec::Uuid {
                reference: Some("Bar".into())
            }
        );
    }

    #[test]
    fn test_unclosed_struct() {
        let err = parse("type Foo Struct {\n    a String\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_type_level_option_sets() {
        assert!(parse("type Code String (pattern=\"^[A-Z]+$\", minsize=1, maxsize=8)\n").is_ok());
        let err = parse("type Code String (reference=Foo)\n").unwrap_err();
        assert_eq!(err.message, "Unrecognized option for String: reference");
        let err = parse("type Flag Bool (min=1)\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnrecognizedOption);
    }
}
