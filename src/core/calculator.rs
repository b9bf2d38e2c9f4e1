use super::allowance::aggregate_allowances;
use super::bracket::{assess, TaxResult};
use super::deduction::{total_deduction, DeductionCaps, DeductionError, DeductionProvider};
use super::income::net_income;
use super::request::TaxRequest;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-record summary of a batch computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub total_income: Decimal,
    #[serde(rename = "tax")]
    pub payable_tax: Decimal,
    #[serde(rename = "taxRefund")]
    pub refund: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub taxes: Vec<BatchEntry>,
}

/// Run the full pipeline for one request against the caps currently held by
/// `provider`. The request is assumed to be validated.
pub fn calculate_tax<P: DeductionProvider + ?Sized>(
    request: &TaxRequest,
    provider: &P,
) -> Result<TaxResult, DeductionError> {
    let caps = DeductionCaps::load(provider)?;

    let allowances = aggregate_allowances(&request.allowances, caps.donation, caps.k_receipt);
    let deduction = total_deduction(caps.personal, allowances);
    let net = net_income(request.total_income, deduction);

    log::debug!(
        "Income {}: personal {} + allowances {} = deduction {}, net income {}",
        request.total_income,
        caps.personal,
        allowances,
        deduction,
        net
    );

    Ok(assess(net, request.wht))
}

/// Calculate every request in order. The first failure aborts the batch and no
/// partial results are returned.
pub fn calculate_batch<P: DeductionProvider + ?Sized>(
    requests: &[TaxRequest],
    provider: &P,
) -> Result<BatchReport, DeductionError> {
    let taxes = requests
        .iter()
        .map(|request| {
            calculate_tax(request, provider).map(|result| BatchEntry {
                total_income: request.total_income.normalize(),
                payable_tax: result.payable_tax,
                refund: result.refund,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Calculated tax for {} records", taxes.len());
    Ok(BatchReport { taxes })
}
