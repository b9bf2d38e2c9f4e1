//! Calculate command - tax for a single JSON request with a per-bracket breakdown

use crate::cmd::{format_amount, open_input, DeductionSource};
use crate::core::{calculate_tax, TaxRequest, TaxResult};
use crate::input::read_json_request;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON file containing the tax request. Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    #[command(flatten)]
    deductions: DeductionSource,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct BracketRow {
    #[tabled(rename = "Net Income")]
    level: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let request = read_json_request(open_input(&self.file)?)
            .with_context(|| format!("invalid tax request in {}", self.file.display()))?;

        let provider = self.deductions.provider();
        let result = calculate_tax(&request, provider.as_ref()).context("failed to calculate tax")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            self.print_result(&request, &result);
        }
        Ok(())
    }

    fn print_result(&self, request: &TaxRequest, result: &TaxResult) {
        let rows: Vec<BracketRow> = result
            .brackets
            .iter()
            .map(|b| BracketRow {
                level: b.label.clone(),
                tax: format_amount(b.tax),
            })
            .collect();

        println!();
        println!("TAX CALCULATION");
        println!();
        println!("  Total income: {}", format_amount(request.total_income));
        println!();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        println!("  Tax before withholding: {}", format_amount(result.liability()));
        println!("  Withheld: {}", format_amount(request.wht));
        println!("  Tax payable: {}", format_amount(result.payable_tax));
        println!("  Refund: {}", format_amount(result.refund));
    }
}
