//! Directive extensions
//!
//! An extension claims a top-level directive keyword. The parser hands it the
//! live [`SadlParser`] whenever that keyword starts a statement, and once the
//! model is built the extension validates what it collected against it.

pub mod graphql;

pub use graphql::GraphqlExtension;

use crate::logging::{codes, Code};
use crate::model::Model;
use crate::syntax::{SadlParser, SyntaxResult};

pub trait Extension {
    /// The directive keyword this extension handles
    fn name(&self) -> &str;

    /// Consume one directive, starting after the keyword. Must leave the
    /// parser at the end of the statement.
    fn parse_directive(&mut self, parser: &mut SadlParser) -> SyntaxResult<()>;

    /// Check the collected directives against the built model
    fn validate(&self, model: &Model) -> Result<(), ExtensionError>;

    /// Data to attach to the model output, keyed by [`Extension::name`]
    fn result(&self) -> Option<serde_json::Value> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtensionError {
    #[error("Extension already exists: {0}")]
    AlreadyExists(String),

    #[error("{message}")]
    Validation { extension: String, message: String },
}

impl ExtensionError {
    pub fn validation(extension: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            extension: extension.to_string(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::AlreadyExists(_) => codes::extension::EXTENSION_ALREADY_EXISTS,
            Self::Validation { .. } => codes::extension::EXTENSION_VALIDATION_FAILED,
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }
}

/// Every bundled extension, ready to register with a parser
pub fn bundled() -> Vec<Box<dyn Extension>> {
    vec![Box::new(GraphqlExtension::new())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    struct Marker {
        seen: Vec<String>,
    }

    impl Extension for Marker {
        fn name(&self) -> &str {
            "marker"
        }

        fn parse_directive(&mut self, parser: &mut SadlParser) -> SyntaxResult<()> {
            let label = parser.expect_identifier()?;
            self.seen.push(format!("{}:{}", label, parser.current_comment()));
            parser.end_of_statement(String::new()).map(|_| ())
        }

        fn validate(&self, model: &Model) -> Result<(), ExtensionError> {
            for label in &self.seen {
                let name = label.split(':').next().unwrap_or_default();
                if model.find_type(name).is_none() {
                    return Err(ExtensionError::validation("marker", format!("No such type: {}", name)));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_registration() {
        let mut parser = SadlParser::new("");
        parser.register_extension(Box::new(Marker { seen: vec![] })).unwrap();
        let err = parser
            .register_extension(Box::new(Marker { seen: vec![] }))
            .unwrap_err();
        assert_eq!(err.to_string(), "Extension already exists: marker");
        assert_eq!(err.error_code(), codes::extension::EXTENSION_ALREADY_EXISTS);
    }

    #[test]
    fn test_directive_dispatch() {
        let mut parser = SadlParser::new("type Foo String\n// tagged\nmarker Foo\n");
        parser.register_extension(Box::new(Marker { seen: vec![] })).unwrap();
        let schema = parser.parse().unwrap();
        assert_eq!(schema.types.len(), 1);

        let model = Model::new(schema).unwrap();
        for extension in parser.extensions() {
            assert!(extension.validate(&model).is_ok());
        }
    }

    #[test]
    fn test_unknown_directive_lists_extensions() {
        let mut parser = SadlParser::new("bogus Foo\n");
        parser.register_extension(Box::new(Marker { seen: vec![] })).unwrap();
        let err = parser.parse().unwrap_err();
        assert!(err.message.ends_with("'example', 'marker'"), "{}", err.message);
    }

    #[test]
    fn test_validation_error() {
        let mut parser = SadlParser::new("marker Missing\n");
        parser.register_extension(Box::new(Marker { seen: vec![] })).unwrap();
        let model = Model::new(parser.parse().unwrap()).unwrap();
        let err = parser.extensions()[0].validate(&model).unwrap_err();
        assert_matches!(err, ExtensionError::Validation { ref extension, .. } if extension == "marker");
        assert_eq!(err.to_string(), "No such type: Missing");
    }
}
