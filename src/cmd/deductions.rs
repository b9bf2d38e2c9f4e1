//! Deductions command - view and administer the configurable deduction caps

use crate::cmd::format_amount;
use crate::core::{set_deduction, DeductionKind, DONATION_CAP};
use crate::store::JsonDeductionStore;
use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DeductionsCommand {
    /// JSON file holding the configured deduction caps
    #[arg(long, env = "PITC_STORE", default_value = "deductions.json", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    action: DeductionsAction,
}

#[derive(Subcommand, Debug)]
enum DeductionsAction {
    /// Show the caps currently in force
    Show {
        /// Output as JSON instead of formatted table
        #[arg(long)]
        json: bool,
    },
    /// Seed default caps for any that have not been set
    Init,
    /// Update a cap
    Set {
        #[arg(value_enum)]
        kind: DeductionKindArg,
        #[arg(allow_negative_numbers = true)]
        amount: Decimal,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeductionKindArg {
    Personal,
    KReceipt,
}

impl From<DeductionKindArg> for DeductionKind {
    fn from(arg: DeductionKindArg) -> Self {
        match arg {
            DeductionKindArg::Personal => DeductionKind::Personal,
            DeductionKindArg::KReceipt => DeductionKind::KReceipt,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct CapRow {
    #[tabled(rename = "Deduction")]
    deduction: String,
    #[tabled(rename = "Cap")]
    cap: String,
    #[tabled(rename = "Allowed Range")]
    allowed_range: String,
    #[tabled(rename = "Updated")]
    updated_at: String,
}

impl DeductionsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut store = JsonDeductionStore::new(&self.store);
        match &self.action {
            DeductionsAction::Show { json } => self.show(&store, *json),
            DeductionsAction::Init => {
                let seeded = store
                    .init()
                    .with_context(|| format!("failed to initialise {}", self.store.display()))?;
                if seeded.is_empty() {
                    println!("All deductions already configured in {}", self.store.display());
                }
                for kind in seeded {
                    println!("{}: {}", kind, format_amount(kind.default_value()));
                }
                Ok(())
            }
            DeductionsAction::Set { kind, amount } => {
                let kind = DeductionKind::from(*kind);
                let value = set_deduction(&mut store, kind, *amount)
                    .with_context(|| format!("failed to update {} deduction", kind))?;
                println!("{}: {}", kind, format_amount(value));
                Ok(())
            }
        }
    }

    fn show(&self, store: &JsonDeductionStore, json: bool) -> anyhow::Result<()> {
        let entries = store
            .entries()
            .with_context(|| format!("failed to read {}", self.store.display()))?;

        let mut rows: Vec<CapRow> = DeductionKind::ALL
            .iter()
            .map(|kind| {
                let (min, max) = kind.limits();
                let stored = entries.get(kind);
                CapRow {
                    deduction: kind.to_string(),
                    cap: stored.map_or("not set".to_string(), |s| format_amount(s.value)),
                    allowed_range: format!("{} - {}", format_amount(min), format_amount(max)),
                    updated_at: stored.map_or(String::new(), |s| {
                        s.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()
                    }),
                }
            })
            .collect();
        rows.push(CapRow {
            deduction: "donation".to_string(),
            cap: format_amount(DONATION_CAP),
            allowed_range: "fixed".to_string(),
            updated_at: String::new(),
        });

        if json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else {
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }
        Ok(())
    }
}
