use super::allowance::AllowanceItem;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: Decimal },
    #[error("line {line}: {source}")]
    Line {
        line: u64,
        source: Box<InputError>,
    },
    #[error("invalid csv record: {0}")]
    Csv(String),
    #[error("invalid request json: {0}")]
    Json(String),
    #[error("no tax records found")]
    Empty,
}

impl InputError {
    pub fn at_line(self, line: u64) -> Self {
        InputError::Line {
            line,
            source: Box::new(self),
        }
    }
}

/// Input for a single tax computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxRequest {
    /// Gross income for the year
    #[schemars(with = "f64")]
    pub total_income: Decimal,
    /// Tax already withheld at source
    #[serde(default)]
    #[schemars(with = "f64")]
    pub wht: Decimal,
    /// Itemized allowances, several entries per category are summed
    #[serde(default)]
    pub allowances: Vec<AllowanceItem>,
}

impl TaxRequest {
    pub fn new(total_income: Decimal, wht: Decimal, allowances: Vec<AllowanceItem>) -> Self {
        TaxRequest {
            total_income,
            wht,
            allowances,
        }
    }

    /// Reject requests the calculator is not defined for
    pub fn validate(&self) -> Result<(), InputError> {
        non_negative("totalIncome", self.total_income)?;
        non_negative("wht", self.wht)?;
        for (i, allowance) in self.allowances.iter().enumerate() {
            non_negative(&format!("allowances[{i}].amount"), allowance.amount)?;
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: Decimal) -> Result<(), InputError> {
    if value < Decimal::ZERO {
        return Err(InputError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}
