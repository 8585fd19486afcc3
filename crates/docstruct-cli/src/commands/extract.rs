//! Extract command - structure a single OCR dump.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use docstruct_core::{
    DocumentKind, EngineConfig, ExtractionOutput, OcrInput, StructuringEngine,
};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.txt for plain OCR text, .json for a spatial result)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Document kind
    #[arg(short, long, value_enum, default_value = "invoice")]
    pub kind: KindArg,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Show extraction confidence scores
    #[arg(long)]
    pub show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum KindArg {
    /// Tabular line-item invoice
    Invoice,
    /// Pharmacy/hospital bill
    Medical,
    /// Salary slip
    Payslip,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Invoice => DocumentKind::Invoice,
            KindArg::Medical => DocumentKind::MedicalBill,
            KindArg::Payslip => DocumentKind::Payslip,
        }
    }
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

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        EngineConfig::from_file(std::path::Path::new(path))?
    } else {
        EngineConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let input = OcrInput::from_file(&args.input)?;
    let engine = StructuringEngine::with_config(config);
    let result = engine.extract(&input, args.kind.into());

    let output = format_output(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render an extraction result in the requested format.
pub fn format_output(result: &ExtractionOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.to_json())?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionOutput) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match result {
        ExtractionOutput::Table(table) => {
            writer.write_record(&table.headers)?;
            for row in &table.rows {
                let record: Vec<String> = table
                    .headers
                    .iter()
                    .map(|h| value_to_cell(row.get(h)))
                    .collect();
                writer.write_record(&record)?;
            }
        }
        ExtractionOutput::Document(document) => {
            writer.write_record(["field", "value"])?;
            for (field, value) in &document.fields {
                writer.write_record([field.as_str(), &value_to_cell(Some(value))])?;
            }
        }
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

fn format_text(result: &ExtractionOutput) -> String {
    let mut out = String::new();

    match result {
        ExtractionOutput::Table(table) => {
            out.push_str(&format!(
                "Table: {} rows x {} columns (confidence {:.1}%)\n",
                table.row_count, table.column_count, table.confidence
            ));
            for (i, row) in table.rows.iter().enumerate() {
                let cells: Vec<String> = table
                    .headers
                    .iter()
                    .map(|h| format!("{}={}", h, value_to_cell(row.get(h))))
                    .collect();
                out.push_str(&format!("{:>3}. {}\n", i + 1, cells.join("  ")));
            }
        }
        ExtractionOutput::Document(document) => {
            out.push_str(&format!(
                "Document (confidence {:.1}%)\n",
                document.confidence
            ));
            for (field, value) in &document.fields {
                out.push_str(&format!("  {}: {}\n", field, value_to_cell(Some(value))));
            }
            if !document.items.is_empty() {
                out.push_str(&format!("  items: {}\n", document.items.len()));
            }
        }
    }

    out
}

fn value_to_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Array(a)) => a
            .iter()
            .map(|v| value_to_cell(Some(v)))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
