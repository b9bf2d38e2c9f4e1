//! Batch command - tax for every row of an uploaded CSV table

use crate::cmd::{format_amount, open_input, DeductionSource};
use crate::core::{calculate_batch, BatchEntry};
use crate::input::read_csv_requests;
use anyhow::Context;
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV file with totalIncome,wht,donation columns. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    deductions: DeductionSource,

    /// Output as JSON instead of formatted table
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Tabled)]
struct BatchRow {
    #[tabled(rename = "#")]
    row_num: usize,
    #[tabled(rename = "Total Income")]
    total_income: String,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Refund")]
    refund: String,
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let requests = read_csv_requests(open_input(&self.file)?)
            .with_context(|| format!("invalid tax upload {}", self.file.display()))?;

        let provider = self.deductions.provider();
        let report = calculate_batch(&requests, provider.as_ref())
            .context("failed to calculate tax for upload")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if self.csv {
            self.write_csv(&report.taxes)?;
        } else {
            self.print_table(&report.taxes);
        }
        Ok(())
    }

    fn print_table(&self, entries: &[BatchEntry]) {
        let rows: Vec<BatchRow> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| BatchRow {
                row_num: i + 1,
                total_income: format_amount(e.total_income),
                tax: format_amount(e.payable_tax),
                refund: format_amount(e.refund),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, entries: &[BatchEntry]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for entry in entries {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
