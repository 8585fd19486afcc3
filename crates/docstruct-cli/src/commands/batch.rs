//! Batch processing command for multiple OCR dumps.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, warn};

use docstruct_core::{EngineConfig, ExtractionOutput, OcrInput, StructuringEngine};

use super::extract::{format_output, KindArg, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Document kind for all files
    #[arg(short, long, value_enum, default_value = "invoice")]
    kind: KindArg,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    output: Option<ExtractionOutput>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        EngineConfig::from_file(std::path::Path::new(path))?
    } else {
        EngineConfig::default()
    };

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "txt" | "text" | "ocr" | "json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let engine = StructuringEngine::with_config(config);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &engine, &args);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                results.push(ProcessResult {
                    path: path.clone(),
                    output: Some(output),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path: path.clone(),
                        output: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        progress.inc(1);
    }

    progress.finish_with_message("Complete");

    if args.summary {
        let summary = build_summary(&results)?;
        let summary_path = args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("summary.csv");
        fs::write(&summary_path, summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let succeeded = results.iter().filter(|r| r.output.is_some()).count();
    println!(
        "{} Processed {}/{} files in {:.1}s",
        style("✓").green(),
        succeeded,
        results.len(),
        start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn process_single_file(
    path: &PathBuf,
    engine: &StructuringEngine,
    args: &BatchArgs,
) -> anyhow::Result<ExtractionOutput> {
    let input = OcrInput::from_file(path)?;
    let result = engine.extract(&input, args.kind.into());

    if let Some(ref output_dir) = args.output_dir {
        let extension = match args.format {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let out_path = output_dir.join(format!("{}.{}", stem, extension));
        fs::write(&out_path, format_output(&result, args.format)?)?;
    }

    Ok(result)
}

fn build_summary(results: &[ProcessResult]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["file", "status", "rows_or_items", "confidence", "time_ms"])?;

    for result in results {
        let (status, count, confidence) = match (&result.output, &result.error) {
            (Some(ExtractionOutput::Table(table)), _) => (
                "ok".to_string(),
                table.row_count.to_string(),
                format!("{:.1}", table.confidence),
            ),
            (Some(ExtractionOutput::Document(document)), _) => (
                "ok".to_string(),
                document.items.len().to_string(),
                format!("{:.1}", document.confidence),
            ),
            (None, Some(e)) => (format!("error: {}", e), String::new(), String::new()),
            (None, None) => ("unknown".to_string(), String::new(), String::new()),
        };

        writer.write_record([
            result.path.display().to_string(),
            status,
            count,
            confidence,
            result.processing_time_ms.to_string(),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}
