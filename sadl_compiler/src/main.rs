use sadl_compiler::config::{self, RuntimeConfig};
use sadl_compiler::pipeline::{self, output, PipelineOutput};
use sadl_compiler::logging::codes;
use sadl_compiler::{batch, logging, unparse};
use std::env;
use std::path::Path;
use std::process;

/// Command line options. The first argument that is not an option is the input.
#[derive(Debug, Default)]
struct CliOptions {
    input: Option<String>,
    config_file: Option<String>,
    decompile: bool,
    json: bool,
    diagnostics: bool,
    help: bool,
    batch: batch::BatchConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("sadl");
    let options = parse_options(&args[1.min(args.len())..]);

    if options.help {
        print_help(program);
        return Ok(());
    }
    let Some(input) = options.input.as_deref() else {
        eprintln!("Usage: {} [options] <file.sadl|directory>", program);
        eprintln!("       {} --help", program);
        process::exit(1);
    };

    if let Some(path) = &options.config_file {
        if let Err(error) = RuntimeConfig::load(path).and_then(config::init_runtime_config) {
            logging::safe_log_error(codes::system::CONFIGURATION_ERROR, &error.to_string());
            process::exit(1);
        }
    }
    logging::init_global_logging()?;
    pipeline::validate_pipeline()?;

    let input_path = Path::new(input);
    if input_path.is_dir() {
        process_directory_batch(input_path, &options)
    } else {
        process_single_file(input, &options)
    }
}

fn print_help(program: &str) {
    println!("SADL Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Parses and validates SADL service schemas");
    println!();
    println!("USAGE:");
    println!("    {} [options] <file.sadl>         # Compile one schema", program);
    println!("    {} [options] <directory>         # Compile every .sadl file", program);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print the validated model as JSON");
    println!("    --decompile         Print the model rendered back to SADL (single file)");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --diagnostics       Print logging diagnostics to stderr when done");
    println!("    --sequential        Compile directory files one at a time");
    println!("    --threads N         Worker threads for directories (default: auto)");
    println!("    --no-recursive      Don't search subdirectories");
    println!("    --max-files N       Limit the number of files compiled");
    println!("    --fail-fast         Stop at the first failing file");
    println!("    --quiet             Suppress progress reporting");
    println!();
    println!("EXAMPLES:");
    println!("    {} petstore.sadl --json", program);
    println!("    {} schemas/ --threads 4 --fail-fast", program);
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--json" => options.json = true,
            "--decompile" => options.decompile = true,
            "--diagnostics" => options.diagnostics = true,
            "--config" => match args.next() {
                Some(path) => options.config_file = Some(path.clone()),
                None => eprintln!("Warning: --config requires a file path"),
            },
            "--sequential" => options.batch.max_threads = 1,
            "--threads" => match args.next().map(|n| n.parse::<usize>()) {
                Some(Ok(threads)) => options.batch.max_threads = threads.max(1),
                Some(Err(_)) => eprintln!("Warning: Invalid thread count, using default"),
                None => eprintln!("Warning: --threads requires a number"),
            },
            "--no-recursive" => options.batch.recursive = false,
            "--max-files" => match args.next().map(|n| n.parse::<usize>()) {
                Some(Ok(max_files)) => options.batch.max_files = Some(max_files),
                Some(Err(_)) => eprintln!("Warning: Invalid max files, ignoring"),
                None => eprintln!("Warning: --max-files requires a number"),
            },
            "--fail-fast" => options.batch.fail_fast = true,
            "--quiet" => options.batch.progress_reporting = false,
            other if other.starts_with("--") => eprintln!("Warning: Unknown option '{}'", other),
            other => {
                if options.input.is_none() {
                    options.input = Some(other.to_string());
                } else {
                    eprintln!("Warning: Extra argument '{}' ignored", other);
                }
            }
        }
    }
    options
}

fn process_single_file(file_path: &str, options: &CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    let result = match pipeline::process_file(file_path) {
        Ok(result) => result,
        Err(error) => {
            eprintln!("{}", error);
            logging::print_cargo_style_summary();
            exit_failure(options);
        }
    };

    if options.decompile {
        print!("{}", unparse::decompile(&result.model));
    } else if options.json {
        println!("{}", output::model_to_json(&result.model)?);
    } else if options.batch.progress_reporting {
        let summary = &result.summary;
        println!(
            "{}: schema '{}' is valid ({} types, {} http operations, {} actions, {} examples)",
            file_path, result.model.name, summary.types, summary.http, summary.actions, summary.examples
        );
    }
    print_diagnostics(options);
    Ok(())
}

fn process_directory_batch(dir_path: &Path, options: &CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config = &batch::BatchConfig {
        progress_reporting: options.batch.progress_reporting && !options.json,
        ..options.batch.clone()
    };
    if options.decompile {
        eprintln!("Warning: --decompile applies to single files only");
    }
    if config.progress_reporting {
        println!("Starting batch compile: {}", dir_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.worker_count(),
            config.recursive,
            config.fail_fast
        );
    }

    let results = match batch::process_directory_with_config(dir_path, config) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("{}", error);
            logging::print_cargo_style_summary();
            exit_failure(options);
        }
    };

    if options.json {
        let outputs: Vec<PipelineOutput> = results
            .successful_files
            .iter()
            .map(|(_, result)| PipelineOutput::from_result(result))
            .collect();
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else if config.progress_reporting {
        print_batch_results(&results);
    }
    for (file_path, error) in &results.failed_files {
        eprintln!("{}: {}", file_path.display(), error);
    }
    logging::print_cargo_style_summary();

    if results.failure_count() > 0 {
        exit_failure(options);
    }
    print_diagnostics(options);
    Ok(())
}

fn print_diagnostics(options: &CliOptions) {
    if options.diagnostics {
        eprintln!("{}", logging::get_system_diagnostics());
    }
}

fn exit_failure(options: &CliOptions) -> ! {
    print_diagnostics(options);
    process::exit(1);
}

fn print_batch_results(results: &batch::BatchResults) {
    println!();
    println!("{}", results.summary());
    println!("  Files discovered: {}", results.files_discovered);
    let diagnostics = logging::get_processing_summary();
    println!(
        "  Diagnostics: {} errors, {} warnings",
        diagnostics.total_errors, diagnostics.total_warnings
    );

    if !results.successful_files.is_empty() && results.processing_duration.as_secs_f64() > 0.0 {
        let total_tokens: usize = results
            .successful_files
            .iter()
            .map(|(_, result)| result.token_count)
            .sum();
        println!(
            "  Processing rate: {:.0} tokens/sec",
            total_tokens as f64 / results.processing_duration.as_secs_f64()
        );
    }

    for (file_path, result) in results.successful_files.iter().take(10) {
        println!(
            "  {}: {} types, {} tokens",
            file_path.display(),
            result.summary.types,
            result.token_count
        );
    }
    if results.success_count() > 10 {
        println!("  ... and {} more", results.success_count() - 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_batch_options() {
        let options = parse_options(&strings(&[
            "schemas",
            "--threads",
            "4",
            "--fail-fast",
            "--no-recursive",
            "--max-files",
            "20",
            "--quiet",
        ]));
        assert_eq!(options.input.as_deref(), Some("schemas"));
        assert_eq!(options.batch.max_threads, 4);
        assert!(options.batch.fail_fast);
        assert!(!options.batch.recursive);
        assert_eq!(options.batch.max_files, Some(20));
        assert!(!options.batch.progress_reporting);
    }

    #[test]
    fn test_parse_output_options() {
        let options = parse_options(&strings(&[
            "--json",
            "--config",
            "sadl.toml",
            "api.sadl",
            "--decompile",
            "--diagnostics",
        ]));
        assert!(options.json);
        assert!(options.diagnostics);
        assert!(options.decompile);
        assert_eq!(options.config_file.as_deref(), Some("sadl.toml"));
        assert_eq!(options.input.as_deref(), Some("api.sadl"));
    }

    #[test]
    fn test_parse_options_invalid() {
        let options = parse_options(&strings(&["--threads", "many", "--unknown", "--sequential"]));
        assert_eq!(options.batch.max_threads, 1);
        assert!(options.input.is_none());
        assert!(!options.help);
    }
}
