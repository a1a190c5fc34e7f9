use crate::extensions::ExtensionError;
use crate::file_processor::FileProcessorError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::model::ModelError;
use crate::syntax::SyntaxError;
use crate::validation::ValidationError;

/// Any failure between reading a schema file and emitting its model. The
/// compile-stage variants display the stage error unchanged so that callers
/// can print it verbatim.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("{0}")]
    Syntax(#[from] SyntaxError),

    #[error("{0}")]
    Model(#[from] ModelError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Extension(#[from] ExtensionError),

    #[error("Cannot serialize model: {message}")]
    Output { message: String },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::Syntax(e) => e.error_code(),
            Self::Model(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Extension(e) => e.error_code(),
            Self::Output { .. } => codes::pipeline::OUTPUT_SERIALIZATION_FAILED,
            Self::Pipeline { .. } => codes::pipeline::PIPELINE_FAILURE,
        }
    }

    /// Name of the stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileProcessing(_) => "file_processing",
            Self::LexicalAnalysis(_) => "lexical",
            Self::Syntax(_) => "syntax",
            Self::Model(_) => "model",
            Self::Validation(_) => "validation",
            Self::Extension(_) => "extension",
            Self::Output { .. } => "output",
            Self::Pipeline { .. } => "pipeline",
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}
