//! Converter Service - Groups the measurement spreadsheet into medicoes.json
//!
//! Responsibilities:
//! - Read the first sheet of the workbook (or a CSV export of it)
//! - Normalize execution/submission dates and status labels
//! - Group rows by project + execution date + sheet number
//! - Write the grouped records as the dashboard's static JSON
//!
//! Usage:
//!   cargo run --bin converter -- --input tecnica_dados_fm.xlsx --output public/medicoes.json
//!
//! CRITICAL: This service must be DETERMINISTIC
//! Same spreadsheet = byte-identical medicoes.json

use anyhow::{Context, Result};
use clap::Parser;
use converter::{group_rows, load_rows, write_json, Config, GroupOptions, Summary};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "converter", about = "Groups measurement rows into the dashboard JSON")]
struct Args {
    /// Spreadsheet to read (xlsx, xls, xlsb, ods or csv) [env: MEDICOES_INPUT]
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON file to write [env: MEDICOES_OUTPUT]
    #[arg(long)]
    output: Option<PathBuf>,

    /// Dry run - group and print the summary, write nothing
    #[arg(long, default_value = "false")]
    dry_run: bool,

    /// Copy columns without a dedicated field into each record
    #[arg(long, default_value = "false")]
    keep_extra_columns: bool,
}

fn print_summary(summary: &Summary) {
    println!("\n=== Summary ===");
    println!("Rows read:        {}", summary.rows);
    println!("Records:          {}", summary.records);
    println!("Line items:       {}", summary.line_items);
    println!("Total value:      {:.2}", summary.total_value);
    println!("Without date:     {}", summary.without_date);
    for (status, count) in &summary.by_status {
        println!("  {:<22} {}", status.code(), count);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::from_env().with_overrides(
        args.input,
        args.output,
        args.dry_run,
        args.keep_extra_columns,
    );

    println!("=== Medições Converter ===");
    println!("Input: {}", config.input.display());
    println!("Output: {}", config.output.display());
    println!("Mode: {}", if config.dry_run { "dry-run" } else { "live" });

    let rows = load_rows(&config.input)
        .await
        .with_context(|| format!("Failed to load rows from {}", config.input.display()))?;
    println!("Loaded {} rows", rows.len());

    if rows.is_empty() {
        eprintln!("Warning: no data rows found - writing an empty list");
    }

    let options = GroupOptions {
        keep_extra_columns: config.keep_extra_columns,
    };
    let records = group_rows(&rows, &options);

    // Print sample records
    for (i, record) in records.iter().take(3).enumerate() {
        println!(
            "  [{}] {} | {} | {} items | {:.2} | {}",
            i + 1,
            record.grouping_key,
            record.client,
            record.items.len(),
            record.total_value,
            record.status.code()
        );
    }
    if records.len() > 3 {
        println!("  ... and {} more", records.len() - 3);
    }

    print_summary(&Summary::from_records(rows.len(), &records));

    if config.dry_run {
        println!("\nDry run - nothing written");
        return Ok(());
    }

    write_json(&config.output, &records)
        .await
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    println!("\n✅ Grouped records saved to: {}", config.output.display());
    Ok(())
}
