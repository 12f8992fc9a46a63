//! Process command - extract data from a single transfer receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use recibo_core::models::config::ReciboConfig;
use recibo_core::receipt::rules::format_brl_amount;
use recibo_core::{ExtractionResponse, FieldKey, ReceiptParser, ReceiptRecord};

use super::config::load_config;
use super::input::{InputKind, ReceiptReader};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (image or .txt with recognized text), or "-" for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Leave the recognized text out of JSON output
    #[arg(long)]
    no_ocr_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs written in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    info!("Processing input: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);

    pb.set_message(match InputKind::detect(&args.input) {
        Ok(InputKind::Image) => "Running OCR...",
        _ => "Reading text...",
    });

    let mut reader = ReceiptReader::new(&config, args.model_dir.clone());
    let text = match reader.read(&args.input) {
        Ok(text) => text,
        Err(e) => {
            pb.finish_and_clear();
            // JSON consumers still get a response body
            if let OutputFormat::Json = args.format {
                write_output(&format_failure(&e.to_string(), &config)?, args.output.as_ref())?;
            }
            return Err(e);
        }
    };

    if text.trim().is_empty() {
        warn!("No text found in {}", args.input.display());
    }

    pb.set_message("Extracting receipt data...");

    let parser = ReceiptParser::from_config(&config.extraction)?;
    let result = parser.parse(&text);

    pb.finish_and_clear();

    if !result.failures.is_empty() {
        eprintln!(
            "{} Extraction degraded: {}",
            style("⚠").yellow(),
            result.record.extraction_error.as_deref().unwrap_or_default()
        );
    }

    let include_text = config.output.include_ocr_text && !args.no_ocr_text;
    let output = format_record(&result.record, &text, args.format, include_text, &config)?;
    write_output(&output, args.output.as_ref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn write_output(output: &str, path: Option<&PathBuf>) -> anyhow::Result<()> {
    match path {
        Some(output_path) => {
            fs::write(output_path, output)?;
            eprintln!(
                "{} Output written to {}",
                style("✓").green(),
                output_path.display()
            );
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// The `{"success": false, "error": ...}` body for an input that could not be read.
pub fn format_failure(error: &str, config: &ReciboConfig) -> anyhow::Result<String> {
    let response = ExtractionResponse::failure(error);
    if config.output.pretty {
        Ok(serde_json::to_string_pretty(&response)?)
    } else {
        Ok(serde_json::to_string(&response)?)
    }
}

/// Render an extracted record in the requested format.
pub fn format_record(
    record: &ReceiptRecord,
    text: &str,
    format: OutputFormat,
    include_text: bool,
    config: &ReciboConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let response =
                ExtractionResponse::success(record.clone(), include_text.then(|| text.to_string()));
            if config.output.pretty {
                Ok(serde_json::to_string_pretty(&response)?)
            } else {
                Ok(serde_json::to_string(&response)?)
            }
        }
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

/// CSV column names: every record field, then the extraction error.
pub fn csv_header() -> Vec<&'static str> {
    let mut header: Vec<&'static str> = FieldKey::ALL.iter().map(FieldKey::as_str).collect();
    header.push("erro_extracao");
    header
}

/// One CSV row in `csv_header` order.
pub fn csv_row(record: &ReceiptRecord) -> Vec<String> {
    let mut row: Vec<String> = FieldKey::ALL
        .iter()
        .map(|key| field_value(record, *key).unwrap_or_default())
        .collect();
    row.push(record.extraction_error.clone().unwrap_or_default());
    row
}

fn field_value(record: &ReceiptRecord, key: FieldKey) -> Option<String> {
    match key {
        FieldKey::Amount => record.amount.map(|a| a.to_string()),
        FieldKey::RecipientName => record.recipient_name.clone(),
        FieldKey::Institution => record.institution.clone(),
        FieldKey::InstitutionType => record.institution_type.map(|t| t.to_string()),
        FieldKey::Branch => record.branch.clone(),
        FieldKey::Account => record.account.clone(),
        FieldKey::AccountType => record.account_type.clone(),
        FieldKey::TransactionId => record.transaction_id.clone(),
    }
}

fn format_csv(record: &ReceiptRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(csv_header())?;
    wtr.write_record(csv_row(record))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ReceiptRecord) -> String {
    let mut output = String::new();

    if let Some(amount) = record.amount {
        output.push_str(&format!("Valor: R$ {}\n", format_brl_amount(amount)));
    }

    output.push_str("\nDestino:\n");
    if let Some(name) = &record.recipient_name {
        output.push_str(&format!("  Nome:         {}\n", name));
    }
    if let Some(institution) = &record.institution {
        match record.institution_type {
            Some(category) => {
                output.push_str(&format!("  Instituição:  {} ({})\n", institution, category))
            }
            None => output.push_str(&format!("  Instituição:  {}\n", institution)),
        }
    }
    if let Some(branch) = &record.branch {
        output.push_str(&format!("  Agência:      {}\n", branch));
    }
    if let Some(account) = &record.account {
        output.push_str(&format!("  Conta:        {}\n", account));
    }
    if let Some(account_type) = &record.account_type {
        output.push_str(&format!("  Tipo de conta: {}\n", account_type));
    }

    if let Some(id) = &record.transaction_id {
        output.push_str(&format!("\nID da transação: {}\n", id));
    }

    let missing = record.missing_fields();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(FieldKey::as_str).collect();
        output.push_str(&format!("\nNot found: {}\n", names.join(", ")));
    }

    if let Some(error) = &record.extraction_error {
        output.push_str(&format!("\nErro: {}\n", error));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use recibo_core::extract;

    const RECEIPT: &str = "Valor R$ 1.234,56\nDestino Ana Lima\nAgência 0001\n";

    #[test]
    fn test_json_envelope() {
        let record = extract(RECEIPT);
        let config = ReciboConfig::default();

        let json = format_record(&record, RECEIPT, OutputFormat::Json, true, &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["dados_extraidos"]["destino_agencia"], "0001");
        assert_eq!(value["ocr_text"], RECEIPT);

        let json = format_record(&record, RECEIPT, OutputFormat::Json, false, &config).unwrap();
        assert!(!json.contains("ocr_text"));
    }

    #[test]
    fn test_failure_envelope() {
        let json = format_failure("Unsupported file format: a.pdf", &ReciboConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Unsupported file format: a.pdf");
        assert!(value.get("dados_extraidos").is_none());
    }

    #[test]
    fn test_csv_row_matches_header() {
        let record = extract(RECEIPT);
        let row = csv_row(&record);
        assert_eq!(row.len(), csv_header().len());
        assert_eq!(row[0], "1234.56");
        assert_eq!(row[1], "Ana Lima");
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(&extract(RECEIPT));
        assert!(text.contains("Valor: R$ 1.234,56"));
        assert!(text.contains("Agência:      0001"));
        assert!(text.contains("Not found:"));
    }
}
