//! Process command - extract data from a single document text file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use ddtft_core::document::rules::format_italian_amount;
use ddtft_core::document::DocumentParser;
use ddtft_core::models::config::EngineConfig;
use ddtft_core::models::document::{DocumentRecord, DocumentType};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input text file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// File name used as the classification hint (default: the input's name)
    #[arg(long)]
    file_name: Option<String>,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
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

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        EngineConfig::from_file(Path::new(path))?
    } else {
        EngineConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = fs::read_to_string(&args.input)?;

    let file_name = args.file_name.clone().unwrap_or_else(|| {
        args.input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string()
    });

    let parser = DocumentParser::with_config(config);
    let record = parser.extract(&text, &file_name);

    // Validate if requested
    if args.validate {
        let issues = record.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_record(&record, args.format)?;

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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render a record in the requested output format.
pub fn format_record(record: &DocumentRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

/// Document family label matching the serialized form.
pub fn type_label(record: &DocumentRecord) -> &'static str {
    match record.document_type {
        DocumentType::DeliveryNote => "delivery_note",
        DocumentType::Invoice => "invoice",
    }
}

fn format_csv(record: &DocumentRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Write header
    wtr.write_record([
        "document_type",
        "document_number",
        "date",
        "client_code",
        "client_name",
        "vat_number",
        "fiscal_code",
        "order_reference",
        "order_date",
        "delivery_address",
        "delivery_date",
        "subtotal",
        "vat4",
        "vat10",
        "vat",
        "total",
        "source_file_name",
    ])?;

    // Write data
    wtr.write_record([
        type_label(record),
        &record.document_number,
        &record.date,
        &record.client_code,
        &record.client_name,
        &record.vat_number,
        &record.fiscal_code,
        &record.order_reference,
        &record.order_date,
        &record.delivery_address,
        &record.delivery_date,
        &record.subtotal.to_string(),
        &record.vat4.to_string(),
        &record.vat10.to_string(),
        &record.vat.to_string(),
        &record.total.to_string(),
        &record.source_file_name,
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &DocumentRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Document: {} ({})\n",
        record.document_number,
        type_label(record)
    ));
    output.push_str(&format!("Date: {}\n", record.date));
    output.push_str("\n");

    output.push_str("Client:\n");
    output.push_str(&format!("  {}\n", record.client_name));
    if !record.client_code.is_empty() {
        output.push_str(&format!("  Code: {}\n", record.client_code));
    }
    if !record.vat_number.is_empty() {
        output.push_str(&format!("  VAT: {}\n", record.vat_number));
    }
    output.push_str("\n");

    if !record.order_reference.is_empty() {
        output.push_str(&format!("Order: {}", record.order_reference));
        if !record.order_date.is_empty() {
            output.push_str(&format!(" of {}", record.order_date));
        }
        output.push_str("\n\n");
    }

    output.push_str("Delivery:\n");
    output.push_str(&format!("  {}\n", record.delivery_address));
    if !record.delivery_date.is_empty() {
        output.push_str(&format!("  Date: {}\n", record.delivery_date));
    }
    output.push_str("\n");

    output.push_str(&format!("Items: {}\n", record.items.len()));
    for item in &record.items {
        output.push_str(&format!(
            "  {} {} - {} {} @ {} = {} (VAT {})\n",
            item.code,
            item.description,
            item.quantity,
            item.unit,
            format_italian_amount(item.price),
            format_italian_amount(item.total),
            item.vat_rate.display()
        ));
    }
    output.push_str("\n");

    output.push_str("Totals:\n");
    output.push_str(&format!(
        "  Subtotal: {}\n",
        format_italian_amount(record.subtotal)
    ));
    output.push_str(&format!("  VAT 4%:   {}\n", format_italian_amount(record.vat4)));
    output.push_str(&format!("  VAT 10%:  {}\n", format_italian_amount(record.vat10)));
    output.push_str(&format!("  Total:    {}\n", format_italian_amount(record.total)));

    output
}
