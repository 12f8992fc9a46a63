//! Batch processing command for multiple receipt files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use recibo_core::{ReceiptParser, ReceiptRecord};

use super::config::load_config;
use super::input::{InputKind, ReceiptReader};
use super::process::{csv_header, csv_row, format_failure, format_record, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (images or .txt)
    #[arg(required = true)]
    input: String,

    /// Output directory (default: one JSON line per file on stdout)
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

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Leave the recognized text out of JSON output
    #[arg(long)]
    no_ocr_text: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<ReceiptRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && InputKind::is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = ReceiptParser::from_config(&config.extraction)?;
    let mut reader = ReceiptReader::new(&config, args.model_dir.clone());
    let include_text = config.output.include_ocr_text && !args.no_ocr_text;

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();

        let outcome = reader.read(&path).and_then(|text| {
            let result = parser.parse(&text);
            let output = format_record(&result.record, &text, args.format, include_text, &config)?;
            emit(&path, &output, &args)?;
            Ok(result.record)
        });

        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(record) => {
                results.push(ProcessResult {
                    path,
                    record: Some(record),
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if let OutputFormat::Json = args.format {
                    emit(&path, &format_failure(&error_msg, &config)?, &args)?;
                }
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    pb.finish_and_clear();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let degraded = results
        .iter()
        .filter_map(|r| r.record.as_ref())
        .filter(|r| r.extraction_error.is_some())
        .count();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful ({} degraded), {} failed",
        style(results.len() - failed.len()).green(),
        style(degraded).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Write one file's output next to the others, or to stdout.
fn emit(path: &Path, output: &str, args: &BatchArgs) -> anyhow::Result<()> {
    match &args.output_dir {
        Some(output_dir) => {
            let output_name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt");
            let output_path =
                output_dir.join(format!("{}.{}", output_name, args.format.extension()));

            fs::write(&output_path, output)?;
            debug!("Wrote output to {}", output_path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(csv_header());
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &result.record {
            Some(record) => {
                let status = if record.extraction_error.is_some() {
                    "degraded"
                } else {
                    "success"
                };
                row.push(status.to_string());
                row.extend(csv_row(record));
            }
            None => {
                row.push("error".to_string());
                row.extend(std::iter::repeat_n(String::new(), csv_header().len()));
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());

        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
