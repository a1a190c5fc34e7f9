//! JSON rendering of compiled models

use super::{PipelineError, PipelineResult};
use crate::logging::codes;
use crate::model::Model;
use crate::validation::ValidationSummary;
use serde::Serialize;

/// What `--json` prints for one compiled file
#[derive(Debug, Serialize)]
pub struct PipelineOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub model: &'a Model,
    pub summary: &'a ValidationSummary,
}

impl<'a> PipelineOutput<'a> {
    pub fn new(model: &'a Model, summary: &'a ValidationSummary) -> Self {
        Self {
            file: None,
            model,
            summary,
        }
    }

    pub fn from_result(result: &'a PipelineResult) -> Self {
        Self {
            file: Some(result.file_metadata.path.display().to_string()),
            model: &result.model,
            summary: &result.summary,
        }
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(self).map_err(output_error)
    }
}

/// The model alone, pretty-printed
pub fn model_to_json(model: &Model) -> Result<String, PipelineError> {
    serde_json::to_string_pretty(model).map_err(output_error)
}

fn output_error(e: serde_json::Error) -> PipelineError {
    crate::log_error!(codes::pipeline::OUTPUT_SERIALIZATION_FAILED, "Model serialization failed",
        "error" => e);
    PipelineError::Output {
        message: e.to_string(),
    }
}
