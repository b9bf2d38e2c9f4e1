pub mod batch;
pub mod calculate;
pub mod deductions;
pub mod schema;

use crate::core::{DeductionProvider, StaticDeductions};
use crate::store::JsonDeductionStore;
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Where calculations read the deduction caps from
#[derive(Args, Debug)]
pub struct DeductionSource {
    /// JSON file holding the configured deduction caps
    #[arg(long, env = "PITC_STORE", default_value = "deductions.json")]
    store: PathBuf,

    /// Ignore the store and use the default caps (personal 60,000, k-receipt 50,000)
    #[arg(long)]
    default_caps: bool,
}

impl DeductionSource {
    pub fn provider(&self) -> Box<dyn DeductionProvider> {
        if self.default_caps {
            log::debug!("Using default deduction caps");
            Box::new(StaticDeductions::defaults())
        } else {
            log::debug!("Reading deduction caps from {}", self.store.display());
            Box::new(JsonDeductionStore::new(&self.store))
        }
    }
}

/// Open a file for reading, or stdin with "-"
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_from_stdin() -> anyhow::Result<Box<dyn Read>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    Ok(Box::new(Cursor::new(buffer)))
}

pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
