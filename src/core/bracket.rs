use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// One tier of the progressive schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub label: &'static str,
    /// Exclusive lower bound: income must exceed it to reach the tier
    pub min_income: Decimal,
    pub rate: Decimal,
    /// Cumulative tax owed at `min_income`
    pub base_tax: Decimal,
    /// Cumulative tax once the tier is full
    pub max_tax: Option<Decimal>,
}

impl Bracket {
    pub fn is_reached(&self, net_income: Decimal) -> bool {
        net_income > self.min_income
    }

    /// Cumulative tax for `net_income`, saturating at the tier's tax ceiling
    pub fn cumulative_tax(&self, net_income: Decimal) -> Decimal {
        if !self.is_reached(net_income) {
            return Decimal::ZERO;
        }
        let tax = self.base_tax + (net_income - self.min_income) * self.rate;
        match self.max_tax {
            Some(max) => tax.min(max),
            None => tax,
        }
    }
}

pub const SCHEDULE: [Bracket; 5] = [
    Bracket {
        label: "0-150,000",
        min_income: dec!(0),
        rate: dec!(0),
        base_tax: dec!(0),
        max_tax: Some(dec!(0)),
    },
    Bracket {
        label: "150,001-500,000",
        min_income: dec!(150000),
        rate: dec!(0.10),
        base_tax: dec!(0),
        max_tax: Some(dec!(35000)),
    },
    Bracket {
        label: "500,001-1,000,000",
        min_income: dec!(500000),
        rate: dec!(0.15),
        base_tax: dec!(35000),
        max_tax: Some(dec!(100000)),
    },
    Bracket {
        label: "1,000,001-2,000,000",
        min_income: dec!(1000000),
        rate: dec!(0.20),
        base_tax: dec!(100000),
        max_tax: Some(dec!(300000)),
    },
    Bracket {
        label: "2,000,001 and above",
        min_income: dec!(2000000),
        rate: dec!(0.35),
        base_tax: dec!(300000),
        max_tax: None,
    },
];

/// Tax shown against a single tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResult {
    #[serde(rename = "level")]
    pub label: String,
    pub tax: Decimal,
}

/// Outcome of a single computation.
///
/// `brackets` is the liability before withholding; only `payable_tax` and
/// `refund` carry the withholding offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    #[serde(rename = "tax")]
    pub payable_tax: Decimal,
    #[serde(rename = "taxRefund")]
    pub refund: Decimal,
    #[serde(rename = "taxLevel")]
    pub brackets: Vec<BracketResult>,
}

impl TaxResult {
    /// Liability before withholding, the tax shown against the highest tier
    pub fn liability(&self) -> Decimal {
        self.brackets
            .iter()
            .map(|b| b.tax)
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Tax per tier plus the index of the highest tier reached
pub fn breakdown(net_income: Decimal) -> (Vec<BracketResult>, usize) {
    let mut last_visited = 0;
    let brackets = SCHEDULE
        .iter()
        .enumerate()
        .map(|(i, bracket)| {
            if bracket.is_reached(net_income) {
                last_visited = i;
            }
            BracketResult {
                label: bracket.label.to_string(),
                tax: bracket.cumulative_tax(net_income).normalize(),
            }
        })
        .collect();
    (brackets, last_visited)
}

/// Apply the schedule to `net_income` and offset the result by `withheld`.
pub fn assess(net_income: Decimal, withheld: Decimal) -> TaxResult {
    let (brackets, last_visited) = breakdown(net_income);

    let liability = brackets[last_visited].tax;
    let adjusted = liability - withheld;
    let (payable_tax, refund) = if adjusted < Decimal::ZERO {
        (Decimal::ZERO, -adjusted)
    } else {
        (adjusted, Decimal::ZERO)
    };

    log::debug!(
        "Net income {} reaches '{}': liability {}, withheld {}, payable {}, refund {}",
        net_income,
        brackets[last_visited].label,
        liability,
        withheld,
        payable_tax,
        refund
    );

    TaxResult {
        payable_tax: payable_tax.normalize(),
        refund: refund.normalize(),
        brackets,
    }
}
