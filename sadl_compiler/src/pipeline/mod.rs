//! The compile pipeline: file -> tokens -> schema -> model -> validation ->
//! extension validation
//!
//! Every stage aborts on its first error; there is no partial result.

mod error;
pub mod output;
mod result;
mod validation;

pub use error::PipelineError;
pub use output::PipelineOutput;
pub use result::PipelineResult;
pub use validation::validate_pipeline;

use crate::extensions::{self, Extension};
use crate::logging::{self, codes};
use crate::model::Model;
use crate::syntax::SadlParser;
use crate::utils::SourceMap;
use crate::validation::ValidationSummary;
use crate::{log_debug, log_error, log_info, log_success};
use std::path::PathBuf;
use std::time::Instant;

/// Compile source text with the bundled extensions. `name` labels error
/// excerpts and supplies the default schema name.
pub fn compile_source(source: &str, name: Option<&str>) -> Result<Model, PipelineError> {
    compile_with_extensions(source, name, extensions::bundled())
}

/// Compile source text with a caller-chosen set of extensions
pub fn compile_with_extensions(
    source: &str,
    name: Option<&str>,
    extensions: Vec<Box<dyn Extension>>,
) -> Result<Model, PipelineError> {
    let parser = SadlParser::new(source);
    let parser = match name {
        Some(name) => parser.with_name(name),
        None => parser,
    };
    build_model(parser, extensions).map(|(model, _)| model)
}

/// Parse, index and validate. Extensions validate after the core checks
/// pass, and their results are attached to the model.
fn build_model(
    mut parser: SadlParser,
    extensions: Vec<Box<dyn Extension>>,
) -> Result<(Model, ValidationSummary), PipelineError> {
    for extension in extensions {
        parser.register_extension(extension)?;
    }
    let schema = parser.parse()?;
    let extensions = parser.into_extensions();

    let mut model = Model::new(schema)?;
    let summary = crate::validation::validate(&model)?;

    for extension in &extensions {
        if let Err(error) = extension.validate(&model) {
            log_error!(error.error_code(), "Extension validation failed",
                "extension" => extension.name(),
                "error" => &error);
            return Err(error.into());
        }
        log_success!(codes::success::EXTENSION_VALIDATION_COMPLETE, "Extension validated",
            "extension" => extension.name());
        if let Some(value) = extension.result() {
            model.set_extension_result(extension.name(), value);
        }
    }
    Ok((model, summary))
}

/// Compile one schema file through every stage
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_id(file_path, 0)
}

/// Compile one schema file, tagging its log events with `file_id`
pub fn process_file_with_id(file_path: &str, file_id: usize) -> Result<PipelineResult, PipelineError> {
    let start = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), file_id, || {
        log_info!("Compiling schema file", "file" => file_path);

        let file_result = crate::file_processor::process_file(file_path)?;

        let mut analyzer = crate::lexical::create_analyzer();
        let tokens = analyzer.tokenize_file_result(&file_result)?;
        let lexical_metrics = analyzer.metrics().clone();
        log_debug!("Tokens buffered", "count" => lexical_metrics.total_tokens);

        let source = SourceMap::new(file_result.source.clone());
        let parser = SadlParser::from_tokens(tokens, source).with_name(file_path);
        let (model, summary) = build_model(parser, extensions::bundled())?;

        let result = PipelineResult {
            model,
            summary,
            file_metadata: file_result.metadata,
            token_count: lexical_metrics.total_tokens,
            lexical_metrics,
            processing_duration: start.elapsed(),
        };
        result.log_success(file_path);
        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::GraphqlExtension;
    use crate::syntax::SyntaxErrorKind;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const SCHEMA: &str = r#"// Movie catalog
name catalog
version 2

type Movie Struct {
    id String (pattern="^[a-z0-9]+$")
    title String
    year Int32 (min=1888)
}

http GET "/movies/{id}" (operation=getMovie) {
    id String
    expect 200 Movie
}

graphql "/graphql" {
    movie(id String) Movie (action=getMovie)
}
"#;

    #[test]
    fn test_validate_pipeline() {
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_compile_source() {
        let model = compile_source(SCHEMA, None).unwrap();
        assert_eq!(model.name, "catalog");
        assert_eq!(model.version, "2");
        assert!(model.find_type("Movie").is_some());
        assert!(model.find_http("getMovie").is_some());
        assert_eq!(model.extensions["graphql"]["path"], "/graphql");
    }

    #[test]
    fn test_compile_without_extensions() {
        let err = compile_with_extensions(SCHEMA, None, Vec::new()).unwrap_err();
        assert_matches!(&err, PipelineError::Syntax(e) if e.kind == SyntaxErrorKind::UnknownDirective);
        assert_eq!(err.stage(), "syntax");
        assert!(err.to_string().starts_with("*** "));
    }

    #[test]
    fn test_duplicate_extension() {
        let extensions: Vec<Box<dyn Extension>> = vec![
            Box::new(GraphqlExtension::new()),
            Box::new(GraphqlExtension::new()),
        ];
        let err = compile_with_extensions("name x\n", None, extensions).unwrap_err();
        assert_eq!(err.to_string(), "Extension already exists: graphql");
    }

    #[test]
    fn test_stage_errors() {
        let err = compile_source("type A String\ntype A Int32\n", None).unwrap_err();
        assert_matches!(err, PipelineError::Model(_));
        assert_eq!(err.error_code().as_str(), "E040");

        let err = compile_source("type A Struct {\n    b Bar\n}\n", None).unwrap_err();
        assert_matches!(err, PipelineError::Validation(_));
        assert_eq!(err.to_string(), "Undefined type 'Bar' in struct field 'A.b'");

        let source = SCHEMA.replace("action=getMovie", "action=findMovie");
        let err = compile_source(&source, None).unwrap_err();
        assert_matches!(err, PipelineError::Extension(_));
        assert_eq!(
            err.to_string(),
            "GraphQL query action 'movie' has an undefined HTTP action: \"findMovie\""
        );
    }

    #[test]
    fn test_process_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.sadl");
        fs::write(&path, SCHEMA).unwrap();

        let result = process_file(path.to_str().unwrap()).unwrap();
        assert_eq!(result.model.name, "catalog");
        assert_eq!(result.summary.types, 1);
        assert_eq!(result.summary.http, 1);
        assert!(result.token_count > 0);
        assert!(result.file_metadata.is_sadl_file);

        let json = PipelineOutput::from_result(&result).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["model"]["name"], "catalog");
        assert_eq!(value["model"]["types"][0]["name"], "Movie");
        assert_eq!(value["summary"]["types"], 1);
    }

    #[test]
    fn test_file_stem_names_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.sadl");
        fs::write(&path, "type Sku String\n").unwrap();

        let result = process_file(path.to_str().unwrap()).unwrap();
        assert_eq!(result.model.name, "inventory");
    }

    #[test]
    fn test_process_missing_file() {
        let err = process_file("does/not/exist.sadl").unwrap_err();
        assert_matches!(err, PipelineError::FileProcessing(_));
        assert_eq!(err.stage(), "file_processing");
        assert!(err.requires_halt());
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("worker stopped");
        assert_matches!(&error, PipelineError::Pipeline { message } if message == "worker stopped");
        assert_eq!(error.error_code().as_str(), "E070");
    }
}
