/// Check that every stage has its error codes registered
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;
    crate::lexical::init_lexical_analysis_logging()?;
    crate::syntax::init_syntax_logging()?;
    crate::validation::init_validation_logging()?;

    for code in [
        crate::logging::codes::model::DUPLICATE_TYPE,
        crate::logging::codes::extension::EXTENSION_VALIDATION_FAILED,
        crate::logging::codes::pipeline::PIPELINE_FAILURE,
        crate::logging::codes::pipeline::OUTPUT_SERIALIZATION_FAILED,
    ] {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Pipeline error code {} not found in metadata registry", code));
        }
    }

    crate::log_success!(
        crate::logging::codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "stages_validated" => 6
    );
    Ok(())
}
