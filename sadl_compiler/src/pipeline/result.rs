use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::logging::codes;
use crate::model::Model;
use crate::validation::ValidationSummary;
use std::time::Duration;

/// A schema file taken through every stage
#[derive(Debug)]
pub struct PipelineResult {
    pub model: Model,
    pub summary: ValidationSummary,
    pub file_metadata: FileMetadata,
    pub lexical_metrics: LexicalMetrics,
    pub token_count: usize,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn tokens_per_second(&self) -> f64 {
        let secs = self.processing_duration.as_secs_f64();
        if secs > 0.0 {
            self.token_count as f64 / secs
        } else {
            0.0
        }
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            codes::success::PIPELINE_COMPLETE,
            "Schema compiled",
            "file" => file_path,
            "schema" => &self.model.name,
            "types" => self.summary.types,
            "http" => self.summary.http,
            "actions" => self.summary.actions,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0),
            "tokens_per_sec" => format!("{:.0}", self.tokens_per_second())
        );
    }
}
