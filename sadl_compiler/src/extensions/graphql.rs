//! `graphql` directive: GraphQL queries backed by declared operations
//!
//! ```text
//! graphql "/graphql" {
//!     movie(id String) Movie (action=getMovie)
//! }
//! ```

use super::{Extension, ExtensionError};
use crate::model::{Annotations, Model, TypeSpec};
use crate::syntax::{OptionScope, SadlParser, SyntaxErrorKind, SyntaxResult};
use crate::tokens::TokenKind;
use crate::utils::merge_comment;
use crate::log_debug;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphqlModel {
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<GraphqlQuery>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlQuery {
    pub name: String,
    pub params: Vec<GraphqlParam>,
    #[serde(rename = "return")]
    pub returns: TypeSpec,
    /// Name of the http operation or action that answers the query
    pub provider: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Default)]
pub struct GraphqlExtension {
    model: GraphqlModel,
    /// A schema holds at most one `graphql` directive
    seen: bool,
}

impl GraphqlExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&self) -> &GraphqlModel {
        &self.model
    }

    fn parse_query(&mut self, parser: &mut SadlParser, comment: String) -> SyntaxResult<()> {
        let name = parser.expect_identifier()?;
        let params = parse_params(parser)?;
        let parsed = parser.parse_type_spec(OptionScope::Field)?;
        let options = parser.parse_options("graphql", &["action"])?;
        let comment = parser.end_of_statement(merge_comment(&comment, &parsed.comment))?;
        self.model.queries.push(GraphqlQuery {
            name,
            params,
            returns: parsed.spec,
            provider: options.action.unwrap_or_default(),
            comment,
        });
        Ok(())
    }
}

/// `(name Type, ...)`, or nothing
fn parse_params(parser: &mut SadlParser) -> SyntaxResult<Vec<GraphqlParam>> {
    let mut params = Vec::new();
    let tok = parser.next_token()?;
    if tok.kind != TokenKind::OpenParen {
        parser.unget();
        return Ok(params);
    }
    loop {
        let tok = parser.next_token()?;
        match tok.kind {
            TokenKind::CloseParen => return Ok(params),
            TokenKind::Comma => {}
            TokenKind::Symbol => params.push(GraphqlParam {
                name: tok.text,
                type_name: parser.expect_type_name()?,
            }),
            _ => return Err(parser.syntax_error_at(&tok)),
        }
    }
}

impl Extension for GraphqlExtension {
    fn name(&self) -> &str {
        "graphql"
    }

    fn parse_directive(&mut self, parser: &mut SadlParser) -> SyntaxResult<()> {
        if self.seen {
            let tok = parser.next_token()?;
            return Err(parser.error_at(
                SyntaxErrorKind::Syntax,
                &tok,
                "Only one graphql directive is allowed per schema",
            ));
        }
        self.seen = true;
        self.model.path = parser.expect_string()?;
        let options = parser.parse_options("graphql", &[])?;
        self.model.annotations = options.annotations;
        let mut comment = parser.current_comment().to_string();

        let tok = parser.next_token()?;
        if tok.kind == TokenKind::OpenBrace {
            comment = parser.parse_trailing_comment(comment)?;
            loop {
                let mut item_comment = String::new();
                if parser.is_block_done(&mut item_comment)? {
                    comment = merge_comment(&comment, &item_comment);
                    break;
                }
                self.parse_query(parser, item_comment)?;
            }
        } else {
            parser.unget();
        }
        self.model.comment = parser.end_of_statement(comment)?;

        log_debug!("Parsed graphql directive",
            "path" => &self.model.path,
            "queries" => self.model.queries.len()
        );
        Ok(())
    }

    fn validate(&self, model: &Model) -> Result<(), ExtensionError> {
        for query in &self.model.queries {
            if model.find_http(&query.provider).is_none() && model.find_action(&query.provider).is_none() {
                return Err(ExtensionError::validation(
                    self.name(),
                    format!(
                        "GraphQL query action '{}' has an undefined HTTP action: {:?}",
                        query.name, query.provider
                    ),
                ));
            }
            let undefined = query
                .params
                .iter()
                .map(|p| p.type_name.as_str())
                .chain(query.returns.referenced_names())
                .find(|name| model.find_type(name).is_none());
            if let Some(name) = undefined {
                return Err(ExtensionError::validation(
                    self.name(),
                    format!("GraphQL query '{}' uses an undefined type: {}", query.name, name),
                ));
            }
        }
        Ok(())
    }

    fn result(&self) -> Option<serde_json::Value> {
        serde_json::to_value(&self.model).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
type Movie Struct {
    id String
    title String
}

http GET "/movies/{id}" (operation=getMovie) {
    id String
    expect 200 Movie
}

// movie lookups
graphql "/graphql" (x_public) { // queries
    movie(id String) Movie (action=getMovie) // by id
}
"#;

    #[test]
    fn test_parse_and_validate() {
        let mut parser = SadlParser::new(SOURCE);
        parser.register_extension(Box::new(GraphqlExtension::new())).unwrap();
        let schema = parser.parse().unwrap();
        let model = Model::new(schema).unwrap();

        let extension = &parser.extensions()[0];
        assert!(extension.validate(&model).is_ok());

        let value = extension.result().unwrap();
        assert_eq!(value["path"], "/graphql");
        assert_eq!(value["comment"], "movie lookups queries");
        assert_eq!(value["annotations"]["x_public"], "");
        let query = &value["queries"][0];
        assert_eq!(query["name"], "movie");
        assert_eq!(query["params"][0]["name"], "id");
        assert_eq!(query["params"][0]["type"], "String");
        assert_eq!(query["return"]["type"], "Ref");
        assert_eq!(query["return"]["ref"], "Movie");
        assert_eq!(query["provider"], "getMovie");
        assert_eq!(query["comment"], "by id");
    }

    #[test]
    fn test_undefined_provider() {
        let source = SOURCE.replace("action=getMovie", "action=findMovie");
        let mut parser = SadlParser::new(&source);
        parser.register_extension(Box::new(GraphqlExtension::new())).unwrap();
        let model = Model::new(parser.parse().unwrap()).unwrap();
        let err = parser.extensions()[0].validate(&model).unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL query action 'movie' has an undefined HTTP action: \"findMovie\""
        );
    }

    #[test]
    fn test_action_provider() {
        let source = "type Movie Struct\naction findMovie() Movie\ngraphql \"/gql\" {\n    movie Movie (action=findMovie)\n}\n";
        let mut parser = SadlParser::new(source);
        parser.register_extension(Box::new(GraphqlExtension::new())).unwrap();
        let model = Model::new(parser.parse().unwrap()).unwrap();
        assert!(parser.extensions()[0].validate(&model).is_ok());
    }

    #[test]
    fn test_second_directive_rejected() {
        let source = format!("{}graphql \"/other\" {{\n    movie Movie (action=getMovie)\n}}\n", SOURCE);
        let mut parser = SadlParser::new(&source);
        parser.register_extension(Box::new(GraphqlExtension::new())).unwrap();
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Syntax);
        assert_eq!(err.message, "Only one graphql directive is allowed per schema");
    }

    #[test]
    fn test_bad_query_params() {
        let mut parser = SadlParser::new("graphql \"/gql\" {\n    movie(id) Movie\n}\n");
        parser.register_extension(Box::new(GraphqlExtension::new())).unwrap();
        assert!(parser.parse().is_err());
    }
}
