use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cap on the total donation allowance, fixed by the schedule.
pub const DONATION_CAP: Decimal = dec!(100000);

/// Deductible itemized expense category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AllowanceKind {
    Donation,
    KReceipt,
}

/// A single itemized allowance line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AllowanceItem {
    /// Allowance category
    #[serde(rename = "allowanceType")]
    pub kind: AllowanceKind,
    /// Amount claimed, must not be negative
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

impl AllowanceItem {
    pub fn new(kind: AllowanceKind, amount: Decimal) -> Self {
        AllowanceItem { kind, amount }
    }

    pub fn donation(amount: Decimal) -> Self {
        Self::new(AllowanceKind::Donation, amount)
    }

    #[cfg(test)]
    pub fn k_receipt(amount: Decimal) -> Self {
        Self::new(AllowanceKind::KReceipt, amount)
    }
}

/// Sum allowances per category, clamp each category to its cap and return the
/// total of the clamped category sums.
pub fn aggregate_allowances(
    allowances: &[AllowanceItem],
    donation_cap: Decimal,
    k_receipt_cap: Decimal,
) -> Decimal {
    let (donation, k_receipt) = allowances.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(donation, k_receipt), item| match item.kind {
            AllowanceKind::Donation => (donation.saturating_add(item.amount), k_receipt),
            AllowanceKind::KReceipt => (donation, k_receipt.saturating_add(item.amount)),
        },
    );

    let donation = donation.min(donation_cap);
    let k_receipt = k_receipt.min(k_receipt_cap);

    log::debug!(
        "Allowances: donation {} (cap {}), k-receipt {} (cap {})",
        donation,
        donation_cap,
        k_receipt,
        k_receipt_cap
    );

    donation + k_receipt
}
