//! SADL schema compiler
//!
//! Source text is scanned into tokens, parsed into a [`model::Schema`],
//! indexed into a [`model::Model`] and validated. Extensions may claim extra
//! top-level directives. A validated model can be serialized to JSON or
//! rendered back to SADL with [`unparse::decompile`].

// Internal modules
pub mod batch;
pub mod config;
pub mod extensions;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod unparse;
pub mod utils;
pub mod validation;
pub mod values;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use model::{Model, Schema};
pub use pipeline::{PipelineError, PipelineOutput, PipelineResult};

/// Compile SADL source text into a validated model using the bundled extensions
pub fn parse_string(source: &str) -> Result<Model, PipelineError> {
    pipeline::compile_source(source, None)
}

/// Compile a SADL file into a validated model
pub fn parse_file(path: &str) -> Result<Model, PipelineError> {
    pipeline::process_file(path).map(|result| result.model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string() {
        let model = parse_string("name demo\ntype Count Int32 (min=0)\n").unwrap();
        assert_eq!(model.name, "demo");
        assert!(model.find_type("Count").is_some());
        assert!(parse_string("type Count Int32 (min=10, max=1)\n").is_err());
    }
}
